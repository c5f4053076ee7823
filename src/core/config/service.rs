use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use super::defaults::{
    default_model_preferences, DEFAULT_CONFIG_FILE, DEFAULT_HOST, DEFAULT_NUM_RESULTS,
    DEFAULT_PORT, DEFAULT_STATIC_DIR, GEMINI_BASE_URL, SERPAPI_ENGINE, SERPAPI_SEARCH_URL,
    WIKIPEDIA_ACTION_API_URL, WIKIPEDIA_REST_BASE_URL,
};
use super::validation::validate_config;
use super::ConfigError;
use crate::llm::types::GenerationConfig;

pub const LLM_API_KEY_VAR: &str = "GEMINI_API_KEY";
pub const SEARCH_API_KEY_VAR: &str = "SERPAPI_KEY";
pub const CONFIG_PATH_VAR: &str = "RELAY_CONFIG_PATH";

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Empty means any origin.
    pub cors_allowed_origins: Vec<String>,
    pub static_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct SearchSettings {
    pub api_key: Option<String>,
    pub base_url: String,
    pub engine: String,
    pub num_results: usize,
}

#[derive(Debug, Clone)]
pub struct WikipediaSettings {
    pub rest_base_url: String,
    pub action_api_url: String,
}

#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub api_key: String,
    pub base_url: String,
    pub model_preferences: Vec<String>,
    pub generation: GenerationConfig,
}

#[derive(Debug, Clone, Default)]
pub struct LoggingSettings {
    pub dir: Option<PathBuf>,
}

/// Process-wide configuration, resolved once before the server starts.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub search: SearchSettings,
    pub wikipedia: WikipediaSettings,
    pub llm: LlmSettings,
    pub logging: LoggingSettings,
}

impl Settings {
    /// Reads the optional YAML file and the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        let lookup = |key: &str| env_value(env::var(key).ok());
        let config = match config_path(&lookup) {
            Some(path) => load_yaml_file(&path)?,
            None => Value::Object(Map::new()),
        };
        Self::resolve(&config, lookup)
    }

    pub fn resolve(
        config: &Value,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        validate_config(config)?;

        let llm_api_key =
            lookup(LLM_API_KEY_VAR).ok_or(ConfigError::MissingCredential(LLM_API_KEY_VAR))?;

        let port = match lookup("PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|_| ConfigError::Invalid {
                path: "PORT".to_string(),
                reason: format!("'{}' is not a valid port", raw),
            })?,
            None => value_at(config, &["server", "port"])
                .and_then(|v| v.as_u64())
                .map(|v| v as u16)
                .unwrap_or(DEFAULT_PORT),
        };

        let server = ServerSettings {
            host: lookup("HOST")
                .unwrap_or_else(|| string_at(config, &["server", "host"], DEFAULT_HOST)),
            port,
            cors_allowed_origins: string_list_at(config, &["server", "cors_allowed_origins"])
                .unwrap_or_default(),
            static_dir: PathBuf::from(string_at(
                config,
                &["server", "static_dir"],
                DEFAULT_STATIC_DIR,
            )),
        };

        let search = SearchSettings {
            api_key: lookup(SEARCH_API_KEY_VAR),
            base_url: string_at(config, &["search", "base_url"], SERPAPI_SEARCH_URL),
            engine: string_at(config, &["search", "engine"], SERPAPI_ENGINE),
            num_results: value_at(config, &["search", "num_results"])
                .and_then(|v| v.as_u64())
                .map(|v| v as usize)
                .unwrap_or(DEFAULT_NUM_RESULTS),
        };

        let wikipedia = WikipediaSettings {
            rest_base_url: string_at(
                config,
                &["wikipedia", "rest_base_url"],
                WIKIPEDIA_REST_BASE_URL,
            ),
            action_api_url: string_at(
                config,
                &["wikipedia", "action_api_url"],
                WIKIPEDIA_ACTION_API_URL,
            ),
        };

        let llm = LlmSettings {
            api_key: llm_api_key,
            base_url: string_at(config, &["llm", "base_url"], GEMINI_BASE_URL),
            model_preferences: string_list_at(config, &["llm", "model_preferences"])
                .filter(|list| !list.is_empty())
                .unwrap_or_else(default_model_preferences),
            generation: GenerationConfig::default().with_config(config),
        };

        let logging = LoggingSettings {
            dir: value_at(config, &["logging", "dir"])
                .and_then(|v| v.as_str())
                .map(PathBuf::from),
        };

        Ok(Settings {
            server,
            search,
            wikipedia,
            llm,
            logging,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

pub fn config_path(lookup: &impl Fn(&str) -> Option<String>) -> Option<PathBuf> {
    if let Some(path) = lookup(CONFIG_PATH_VAR) {
        return Some(PathBuf::from(path));
    }

    let local = PathBuf::from(DEFAULT_CONFIG_FILE);
    local.exists().then_some(local)
}

pub fn load_yaml_file(path: &Path) -> Result<Value, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    if contents.trim().is_empty() {
        return Ok(Value::Object(Map::new()));
    }
    serde_yaml::from_str::<Value>(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Shows only the first five characters of a credential.
pub fn mask_secret(secret: &str) -> String {
    let prefix: String = secret.chars().take(5).collect();
    format!("{}...", prefix)
}

fn env_value(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn value_at<'a>(config: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(config, |current, key| current.get(*key))
}

fn string_at(config: &Value, path: &[&str], default: &str) -> String {
    value_at(config, path)
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| default.to_string())
}

fn string_list_at(config: &Value, path: &[&str]) -> Option<Vec<String>> {
    value_at(config, path).and_then(|v| v.as_array()).map(|list| {
        list.iter()
            .filter_map(|item| item.as_str())
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(|item| item.to_string())
            .collect()
    })
}
