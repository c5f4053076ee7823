pub mod gemini;
pub mod provider;
pub mod selector;
pub mod types;


pub use gemini::GeminiProvider;
pub use provider::LlmProvider;
pub use selector::{select_model, ModelSelection, SelectionError};
pub use types::{GenerateRequest, GenerationConfig, ProviderModel};
