use reqwest::{Client, StatusCode};
use serde_json::Value;
use thiserror::Error;

use crate::core::config::WikipediaSettings;

#[derive(Debug, Error)]
pub enum WikipediaError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Summary lookups against Wikipedia, used when the search provider has
/// nothing to say about a query.
#[derive(Clone)]
pub struct WikipediaClient {
    client: Client,
    rest_base_url: String,
    action_api_url: String,
}

impl WikipediaClient {
    pub fn new(client: Client, settings: &WikipediaSettings) -> Self {
        Self {
            client,
            rest_base_url: settings.rest_base_url.trim_end_matches('/').to_string(),
            action_api_url: settings.action_api_url.clone(),
        }
    }

    /// Returns the page extract for `query`, or an empty string.
    pub async fn lookup(&self, query: &str) -> String {
        match self.try_lookup(query).await {
            Ok(Some(extract)) => extract,
            Ok(None) => String::new(),
            Err(err) => {
                tracing::warn!("Error getting Wikipedia info: {}", err);
                String::new()
            }
        }
    }

    async fn try_lookup(&self, query: &str) -> Result<Option<String>, WikipediaError> {
        if let Some(extract) = self.summary(query).await? {
            return Ok(Some(extract));
        }

        let Some(title) = self.top_search_title(query).await? else {
            return Ok(None);
        };
        self.summary(&title).await
    }

    async fn summary(&self, title: &str) -> Result<Option<String>, WikipediaError> {
        let url = format!(
            "{}/page/summary/{}",
            self.rest_base_url,
            urlencoding::encode(&title.replace(' ', "_"))
        );

        let response = self.client.get(url).send().await?;
        if response.status() != StatusCode::OK {
            tracing::debug!(
                "Wikipedia summary for '{}' returned {}",
                title,
                response.status()
            );
            return Ok(None);
        }

        let payload: Value = serde_json::from_str(&response.text().await?)?;
        Ok(payload
            .get("extract")
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(|text| text.to_string()))
    }

    async fn top_search_title(&self, query: &str) -> Result<Option<String>, WikipediaError> {
        let url = format!(
            "{}?action=query&list=search&srsearch={}&format=json",
            self.action_api_url,
            urlencoding::encode(query)
        );

        let response = self.client.get(url).send().await?;
        if response.status() != StatusCode::OK {
            return Ok(None);
        }

        let payload: Value = serde_json::from_str(&response.text().await?)?;
        Ok(payload
            .get("query")
            .and_then(|v| v.get("search"))
            .and_then(|v| v.as_array())
            .and_then(|hits| hits.first())
            .and_then(|hit| hit.get("title"))
            .and_then(|v| v.as_str())
            .filter(|title| !title.is_empty())
            .map(|title| title.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::{Path, Query};
    use axum::http::StatusCode as AxumStatus;
    use axum::response::IntoResponse;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;
    use std::collections::HashMap;
    use std::net::SocketAddr;

    async fn serve(app: Router) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    fn client_for(addr: SocketAddr) -> WikipediaClient {
        WikipediaClient::new(
            Client::new(),
            &WikipediaSettings {
                rest_base_url: format!("http://{addr}/rest_v1"),
                action_api_url: format!("http://{addr}/w/api.php"),
            },
        )
    }

    async fn summary(Path(title): Path<String>) -> axum::response::Response {
        match title.as_str() {
            "Rust_(programming_language)" => {
                Json(json!({ "extract": "Rust is a general-purpose programming language." }))
                    .into_response()
            }
            "Ferris_crab" => Json(json!({ "title": "Ferris crab" })).into_response(),
            _ => (AxumStatus::NOT_FOUND, "not found").into_response(),
        }
    }

    async fn search(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
        let hit = match params.get("srsearch").map(String::as_str) {
            Some("rust lang") => json!([{ "title": "Rust (programming language)" }]),
            _ => json!([]),
        };
        Json(json!({ "query": { "search": hit } }))
    }

    fn wiki_app() -> Router {
        Router::new()
            .route("/rest_v1/page/summary/:title", get(summary))
            .route("/w/api.php", get(search))
    }

    #[tokio::test]
    async fn direct_title_lookup_returns_extract() {
        let addr = serve(wiki_app()).await;
        let wiki = client_for(addr);
        assert_eq!(
            wiki.lookup("Rust (programming language)").await,
            "Rust is a general-purpose programming language."
        );
    }

    #[tokio::test]
    async fn falls_back_to_search_when_title_misses() {
        let addr = serve(wiki_app()).await;
        let wiki = client_for(addr);
        assert_eq!(
            wiki.lookup("rust lang").await,
            "Rust is a general-purpose programming language."
        );
    }

    #[tokio::test]
    async fn missing_extract_and_no_hits_yield_empty() {
        let addr = serve(wiki_app()).await;
        let wiki = client_for(addr);
        assert_eq!(wiki.lookup("Ferris crab").await, "");
        assert_eq!(wiki.lookup("zzqx nothing").await, "");
    }

    #[tokio::test]
    async fn malformed_json_is_swallowed() {
        let app = Router::new().route(
            "/rest_v1/page/summary/:title",
            get(|| async { "{not json" }),
        );
        let addr = serve(app).await;
        assert_eq!(client_for(addr).lookup("anything").await, "");
    }

    #[tokio::test]
    async fn unreachable_host_is_swallowed() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        assert_eq!(client_for(addr).lookup("anything").await, "");
    }
}
