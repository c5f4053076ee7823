use chrono::{DateTime, TimeZone};

pub const TIMESTAMP_PREFIX: &str = "Current date and time: ";
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const LINKS_HEADER: &str = "For the most up-to-date information, you can check these sources:";

pub fn timestamp_line<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("{}{}", TIMESTAMP_PREFIX, now.format(TIMESTAMP_FORMAT))
}

/// General, news and social search links for the raw query.
pub fn search_links(query: &str) -> [String; 3] {
    let q = query.replace(' ', "+");
    [
        format!("- Google Search: https://www.google.com/search?q={}", q),
        format!("- News Search: https://news.google.com/search?q={}", q),
        format!("- Twitter Search: https://twitter.com/search?q={}", q),
    ]
}

/// Assembles the final block: timestamp, body lines, then the link footer.
pub fn render<Tz: TimeZone>(query: &str, now: &DateTime<Tz>, body: Vec<String>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let mut lines = body;
    lines.push(LINKS_HEADER.to_string());
    lines.extend(search_links(query));

    format!("{}\n\n{}", timestamp_line(now), lines.join("\n"))
}
