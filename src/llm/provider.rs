use async_trait::async_trait;

use super::types::{GenerateRequest, ProviderModel};
use crate::core::errors::ApiError;

#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// return the provider name (e.g. "gemini")
    fn name(&self) -> &str;

    /// list every model the credential can see
    async fn list_models(&self) -> Result<Vec<ProviderModel>, ApiError>;

    /// single-shot text generation (non-streaming)
    async fn generate(&self, request: GenerateRequest) -> Result<String, ApiError>;
}
