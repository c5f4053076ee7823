pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5001;
pub const DEFAULT_STATIC_DIR: &str = "static";
pub const DEFAULT_CONFIG_FILE: &str = "config.yml";

pub const DEFAULT_NUM_RESULTS: usize = 3;
pub const SERPAPI_SEARCH_URL: &str = "https://serpapi.com/search";
pub const SERPAPI_ENGINE: &str = "google";

pub const WIKIPEDIA_REST_BASE_URL: &str = "https://en.wikipedia.org/api/rest_v1";
pub const WIKIPEDIA_ACTION_API_URL: &str = "https://en.wikipedia.org/w/api.php";

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Tried in order at startup; the first one the provider lists wins.
pub const MODEL_PREFERENCES: [&str; 4] = [
    "gemini-1.5-pro",
    "gemini-1.5-flash",
    "gemini-pro",
    "gemini-pro-vision",
];

pub const DEFAULT_TEMPERATURE: f64 = 0.9;
pub const DEFAULT_TOP_P: f64 = 0.95;
pub const DEFAULT_TOP_K: u32 = 40;
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 1024;

pub fn default_model_preferences() -> Vec<String> {
    MODEL_PREFERENCES.iter().map(|name| name.to_string()).collect()
}
