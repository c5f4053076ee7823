use reqwest::{Client, StatusCode};
use serde_json::Value;

use super::{truncate_for_log, SearchError};
use crate::core::config::{mask_secret, SearchSettings};

const GOOGLE_DOMAIN: &str = "google.com";
const COUNTRY: &str = "us";
const LANGUAGE: &str = "en";

#[derive(Clone)]
pub struct SerpApiClient {
    client: Client,
    base_url: String,
    engine: String,
    api_key: Option<String>,
}

impl SerpApiClient {
    pub fn new(client: Client, settings: &SearchSettings) -> Self {
        Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            engine: settings.engine.clone(),
            api_key: settings.api_key.clone(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Runs one search and returns the raw provider payload.
    pub async fn fetch(&self, query: &str, num_results: usize) -> Result<Value, SearchError> {
        let api_key = self.api_key.as_deref().ok_or(SearchError::NotConfigured)?;

        tracing::info!(
            "Searching for: {} with SerpAPI key: {}",
            query,
            mask_secret(api_key)
        );

        let url = format!(
            "{}?q={}&api_key={}&engine={}&google_domain={}&gl={}&hl={}&num={}",
            self.base_url,
            urlencoding::encode(query),
            urlencoding::encode(api_key),
            urlencoding::encode(&self.engine),
            GOOGLE_DOMAIN,
            COUNTRY,
            LANGUAGE,
            num_results
        );

        // The request URL carries the key; keep it out of error text.
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| SearchError::Transport(err.without_url()))?;
        let status = response.status();
        tracing::info!("SerpAPI response status: {}", status);

        let body = response
            .text()
            .await
            .map_err(|err| SearchError::Transport(err.without_url()))?;

        if status != StatusCode::OK {
            tracing::error!("SerpAPI request failed with status code: {}", status);
            tracing::error!("Response content: {}", truncate_for_log(&body));
            return Err(SearchError::Status { status });
        }

        let payload: Value = serde_json::from_str(&body).map_err(|err| {
            tracing::error!("Error parsing JSON response: {}", err);
            tracing::error!("Response content: {}", truncate_for_log(&body));
            SearchError::Decode(err)
        })?;

        if let Some(map) = payload.as_object() {
            let keys: Vec<&str> = map.keys().map(String::as_str).collect();
            tracing::info!("SerpAPI response keys: {:?}", keys);
        }

        Ok(payload)
    }
}

/// Flattens the knowledge graph, organic results and news, in that order,
/// into display lines. Each section ends with a blank line. Empty when the
/// payload carries none of them.
pub fn extract_sections(data: &Value, num_results: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for section in [
        knowledge_graph_section(data),
        organic_section(data, num_results),
        news_section(data, num_results),
    ]
    .into_iter()
    .flatten()
    {
        lines.extend(section);
        lines.push(String::new());
    }
    lines
}

fn knowledge_graph_section(data: &Value) -> Option<Vec<String>> {
    let kg = data.get("knowledge_graph")?;

    let fields: Vec<String> = [
        ("Title", "title"),
        ("Description", "description"),
        ("Source", "source"),
    ]
    .into_iter()
    .filter_map(|(label, key)| field_text(kg, key).map(|text| format!("{}: {}", label, text)))
    .collect();

    if fields.is_empty() {
        return None;
    }

    let mut lines = vec!["Knowledge Graph Information:".to_string()];
    lines.extend(fields);
    Some(lines)
}

fn organic_section(data: &Value, num_results: usize) -> Option<Vec<String>> {
    let items = data.get("organic_results").and_then(|v| v.as_array())?;
    if items.is_empty() || num_results == 0 {
        return None;
    }

    let mut lines = vec!["Latest Search Results:".to_string()];
    for item in items.iter().take(num_results) {
        let title = field_text(item, "title").unwrap_or_else(|| "No title".to_string());
        let snippet = field_text(item, "snippet").unwrap_or_else(|| "No description".to_string());
        lines.push(format!("- {}: {}", title, snippet));
    }
    Some(lines)
}

fn news_section(data: &Value, num_results: usize) -> Option<Vec<String>> {
    let items = data.get("news_results").and_then(|v| v.as_array())?;
    if items.is_empty() || num_results == 0 {
        return None;
    }

    let mut lines = vec!["Latest News:".to_string()];
    for item in items.iter().take(num_results) {
        let title = field_text(item, "title").unwrap_or_else(|| "No title".to_string());
        let mut line = format!("- {}", title);
        if let Some(source) = news_source(item) {
            line.push_str(&format!(" ({})", source));
        }
        if let Some(date) = field_text(item, "date") {
            line.push_str(&format!(" - {}", date));
        }
        lines.push(line);
    }
    Some(lines)
}

// Google News results carry the source as an object with a `name`.
fn news_source(item: &Value) -> Option<String> {
    field_text(item, "source").or_else(|| {
        item.get("source")
            .and_then(|source| field_text(source, "name"))
    })
}

fn field_text(item: &Value, key: &str) -> Option<String> {
    match item.get(key)? {
        Value::String(text) => {
            let text = text.trim();
            (!text.is_empty()).then(|| text.to_string())
        }
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn knowledge_graph_renders_present_fields_only() {
        let data = json!({ "knowledge_graph": { "title": "X", "description": "Y" } });
        assert_eq!(
            extract_sections(&data, 3),
            vec![
                "Knowledge Graph Information:",
                "Title: X",
                "Description: Y",
                "",
            ]
        );
    }

    #[test]
    fn knowledge_graph_without_known_fields_is_skipped() {
        let data = json!({ "knowledge_graph": { "type": "Programming language" } });
        assert!(extract_sections(&data, 3).is_empty());
    }

    #[test]
    fn organic_results_are_capped_and_defaulted() {
        let data = json!({
            "organic_results": [
                { "title": "Rust", "snippet": "A language" },
                { "title": "Cargo" },
                { "snippet": "orphan snippet" },
                { "title": "Never shown", "snippet": "beyond the cap" }
            ]
        });
        assert_eq!(
            extract_sections(&data, 3),
            vec![
                "Latest Search Results:",
                "- Rust: A language",
                "- Cargo: No description",
                "- No title: orphan snippet",
                "",
            ]
        );
    }

    #[test]
    fn news_omits_missing_source_and_date() {
        let data = json!({
            "news_results": [
                { "title": "Launch", "source": "Wire", "date": "2 hours ago" },
                { "title": "Quiet", "date": "1 day ago" },
                { "title": "Bare" },
                { "title": "Nested", "source": { "name": "Daily" } }
            ]
        });
        assert_eq!(
            extract_sections(&data, 4),
            vec![
                "Latest News:",
                "- Launch (Wire) - 2 hours ago",
                "- Quiet - 1 day ago",
                "- Bare",
                "- Nested (Daily)",
                "",
            ]
        );
    }

    #[test]
    fn sections_follow_fixed_order() {
        let data = json!({
            "news_results": [{ "title": "N" }],
            "organic_results": [{ "title": "O", "snippet": "S" }],
            "knowledge_graph": { "title": "K" }
        });
        let lines = extract_sections(&data, 3);
        let kg = lines.iter().position(|l| l == "Knowledge Graph Information:").unwrap();
        let organic = lines.iter().position(|l| l == "Latest Search Results:").unwrap();
        let news = lines.iter().position(|l| l == "Latest News:").unwrap();
        assert!(kg < organic && organic < news);
    }

    #[test]
    fn empty_arrays_and_unrelated_payloads_yield_nothing() {
        assert!(extract_sections(&json!({ "organic_results": [], "news_results": [] }), 3).is_empty());
        assert!(extract_sections(&json!({ "search_metadata": { "id": "1" } }), 3).is_empty());
        assert!(extract_sections(&json!([1, 2, 3]), 3).is_empty());
    }
}
