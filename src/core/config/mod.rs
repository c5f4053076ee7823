use std::path::PathBuf;

use thiserror::Error;

pub mod defaults;
pub mod service;
pub mod validation;

pub use service::{
    mask_secret, LlmSettings, LoggingSettings, SearchSettings, ServerSettings, Settings,
    WikipediaSettings,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid config at '{path}': {reason}")]
    Invalid { path: String, reason: String },

    #[error("No {0} found in environment variables")]
    MissingCredential(&'static str),
}
