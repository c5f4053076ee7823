use thiserror::Error;

use crate::llm::SelectionError;

#[derive(Debug, Error)]
pub enum InitializationError {
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    #[error("Error configuring LLM provider: {0}")]
    ModelSelection(#[from] SelectionError),
}
