//! Web search augmentation.
//!
//! [`WebSearch::search`] never fails: every fault on the way (missing
//! credential, provider status, bad JSON, transport) is turned into a line of
//! explanatory text, so the caller always gets a block that starts with the
//! current timestamp and ends with the search-link footer.

use chrono::Local;
use reqwest::{Client, StatusCode};
use thiserror::Error;

use crate::core::config::{SearchSettings, WikipediaSettings};

pub mod format;
pub mod serpapi;
pub mod wikipedia;

use serpapi::SerpApiClient;
use wikipedia::WikipediaClient;

const LOG_BODY_LIMIT: usize = 500;
const NO_INFORMATION: &str = "I couldn't find specific information about your query.";

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("no search provider credential configured")]
    NotConfigured,
    #[error("search provider returned status {status}")]
    Status { status: StatusCode },
    #[error("failed to parse search response: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
}

impl SearchError {
    /// Text handed to the model in place of search results.
    pub fn explanation(&self) -> String {
        match self {
            SearchError::NotConfigured => "I don't have real-time web search capability at the moment. My knowledge has a cutoff date, so some information might be outdated.".to_string(),
            SearchError::Status { .. } => "I encountered an error while searching for information. Please try again later.".to_string(),
            SearchError::Decode(_) => "I encountered an error processing search results. Please try again with a different query.".to_string(),
            SearchError::Transport(err) => format!("I encountered an error while searching for information: {}", err),
        }
    }
}

#[derive(Clone)]
pub struct WebSearch {
    serpapi: SerpApiClient,
    wikipedia: WikipediaClient,
}

impl WebSearch {
    pub fn new(client: Client, search: &SearchSettings, wikipedia: &WikipediaSettings) -> Self {
        Self {
            serpapi: SerpApiClient::new(client.clone(), search),
            wikipedia: WikipediaClient::new(client, wikipedia),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.serpapi.is_configured()
    }

    /// Builds the "current information" block for `query`.
    pub async fn search(&self, query: &str, num_results: usize) -> String {
        let body = match self.gather(query, num_results).await {
            Ok(lines) => lines,
            Err(err) => {
                match &err {
                    SearchError::NotConfigured => tracing::warn!(
                        "No SERPAPI_KEY found. Web search functionality is limited."
                    ),
                    other => tracing::error!("Error in web search: {}", other),
                }
                vec![err.explanation(), String::new()]
            }
        };

        format::render(query, &Local::now(), body)
    }

    async fn gather(&self, query: &str, num_results: usize) -> Result<Vec<String>, SearchError> {
        let data = self.serpapi.fetch(query, num_results).await?;
        let mut lines = serpapi::extract_sections(&data, num_results);

        if lines.is_empty() {
            let extract = self.wikipedia.lookup(query).await;
            if !extract.is_empty() {
                lines.push("Information from Wikipedia:".to_string());
                lines.push(extract);
                lines.push(String::new());
            }
        }

        if lines.is_empty() {
            lines.push(NO_INFORMATION.to_string());
            lines.push(String::new());
        }

        Ok(lines)
    }
}

pub(crate) fn truncate_for_log(body: &str) -> &str {
    match body.char_indices().nth(LOG_BODY_LIMIT) {
        Some((index, _)) => &body[..index],
        None => body,
    }
}
