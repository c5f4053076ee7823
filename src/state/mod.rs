use std::sync::Arc;

use chrono::{DateTime, Utc};
use reqwest::Client;

use crate::core::config::{mask_secret, Settings};
use crate::llm::{select_model, GeminiProvider, LlmProvider, ModelSelection};
use crate::search::WebSearch;

pub mod error;

use error::InitializationError;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Application state shared read-only across all requests.
///
/// Contains:
/// - Resolved settings
/// - The web search aggregator (search provider + Wikipedia fallback)
/// - The LLM provider and the model selected for it at startup
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub search: WebSearch,
    pub llm: Arc<dyn LlmProvider>,
    pub selection: Arc<ModelSelection>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Initializes the application state.
    ///
    /// This process includes:
    /// 1. Building the shared HTTP client
    /// 2. Connecting the Gemini provider
    /// 3. Selecting the model from the provider's listing (fatal on failure)
    pub async fn initialize(settings: Settings) -> Result<Arc<Self>, InitializationError> {
        let client = build_http_client()?;

        tracing::info!("API Key loaded: {}", mask_secret(&settings.llm.api_key));
        let llm: Arc<dyn LlmProvider> = Arc::new(GeminiProvider::new(
            client.clone(),
            &settings.llm.base_url,
            settings.llm.api_key.clone(),
        ));

        let selection = select_model(llm.as_ref(), &settings.llm).await?;
        tracing::info!(
            "Gemini API configured successfully with model: {}",
            selection.model
        );

        if settings.search.api_key.is_none() {
            tracing::warn!("No SERPAPI_KEY found. Web search functionality is limited.");
        }

        Ok(Self::from_parts(settings, client, llm, selection))
    }

    /// Assembles state from already-resolved parts.
    pub fn from_parts(
        settings: Settings,
        client: Client,
        llm: Arc<dyn LlmProvider>,
        selection: ModelSelection,
    ) -> Arc<Self> {
        let search = WebSearch::new(client, &settings.search, &settings.wikipedia);

        Arc::new(AppState {
            settings: Arc::new(settings),
            search,
            llm,
            selection: Arc::new(selection),
            started_at: Utc::now(),
        })
    }
}

pub fn build_http_client() -> Result<Client, InitializationError> {
    Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .map_err(InitializationError::HttpClient)
}
