use thiserror::Error;

use super::provider::LlmProvider;
use super::types::{default_safety_settings, GenerateRequest, GenerationConfig, SafetySetting};
use crate::core::config::LlmSettings;
use crate::core::errors::ApiError;

#[derive(Debug, Error)]
pub enum SelectionError {
    #[error("Failed to list models from {provider}: {source}")]
    Listing {
        provider: String,
        #[source]
        source: ApiError,
    },
    #[error("No models available from {0}")]
    NoModels(String),
}

/// The model and request parameters every chat request uses. Resolved once
/// at startup and never changed afterwards.
#[derive(Debug, Clone)]
pub struct ModelSelection {
    pub model: String,
    pub generation: GenerationConfig,
    pub safety: Vec<SafetySetting>,
}

impl ModelSelection {
    pub fn new(model: impl Into<String>, generation: GenerationConfig) -> Self {
        Self {
            model: model.into(),
            generation,
            safety: default_safety_settings(),
        }
    }

    pub fn request(&self, prompt: String) -> GenerateRequest {
        GenerateRequest {
            model: self.model.clone(),
            prompt,
            generation: self.generation,
            safety: self.safety.clone(),
        }
    }
}

/// `models/gemini-pro` -> `gemini-pro`
pub fn strip_namespace(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

/// Walks the preferences in order; for each one an exact match beats a
/// substring match. Falls back to the first available model.
pub fn choose_model(available: &[String], preferences: &[String]) -> Option<String> {
    for preferred in preferences {
        if let Some(exact) = available.iter().find(|name| *name == preferred) {
            return Some(exact.clone());
        }
        if let Some(partial) = available
            .iter()
            .find(|name| name.contains(preferred.as_str()))
        {
            return Some(partial.clone());
        }
    }

    available.first().cloned()
}

pub async fn select_model(
    provider: &dyn LlmProvider,
    settings: &LlmSettings,
) -> Result<ModelSelection, SelectionError> {
    tracing::info!("Listing available models...");
    let models = provider
        .list_models()
        .await
        .map_err(|source| SelectionError::Listing {
            provider: provider.name().to_string(),
            source,
        })?;

    let available: Vec<String> = models
        .iter()
        .map(|model| {
            let name = strip_namespace(&model.id);
            tracing::info!("Available model: {} ({})", name, model.display_name);
            name.to_string()
        })
        .collect();

    let model = choose_model(&available, &settings.model_preferences)
        .ok_or_else(|| SelectionError::NoModels(provider.name().to_string()))?;

    if settings.model_preferences.iter().any(|p| model.contains(p.as_str())) {
        tracing::info!("Selected model: {}", model);
    } else {
        tracing::info!("Using first available model: {}", model);
    }

    Ok(ModelSelection::new(model, settings.generation))
}
