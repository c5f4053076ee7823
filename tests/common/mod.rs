#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use search_relay::core::config::Settings;
use search_relay::core::errors::ApiError;
use search_relay::llm::{GenerateRequest, LlmProvider, ProviderModel};

pub const TEST_LLM_KEY: &str = "test-gemini-key";
pub const TEST_SEARCH_KEY: &str = "test-serpapi-key";

pub async fn serve(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// An address nothing listens on.
pub async fn dead_addr() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// Settings pointing every outbound integration at local addresses.
pub fn settings(search: SocketAddr, wikipedia: SocketAddr, search_key: Option<&str>) -> Settings {
    let config = json!({
        "search": { "base_url": format!("http://{search}/search") },
        "wikipedia": {
            "rest_base_url": format!("http://{wikipedia}/rest_v1"),
            "action_api_url": format!("http://{wikipedia}/w/api.php")
        }
    });
    let mut env = HashMap::from([("GEMINI_API_KEY".to_string(), TEST_LLM_KEY.to_string())]);
    if let Some(key) = search_key {
        env.insert("SERPAPI_KEY".to_string(), key.to_string());
    }
    Settings::resolve(&config, move |key| env.get(key).cloned()).unwrap()
}

#[derive(Clone, Default)]
pub struct Recorded {
    pub hits: Arc<AtomicUsize>,
    pub last_params: Arc<Mutex<Option<HashMap<String, String>>>>,
}

impl Recorded {
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn last_params(&self) -> HashMap<String, String> {
        self.last_params.lock().unwrap().clone().unwrap_or_default()
    }
}

/// A search provider answering every query with `payload` and `status`.
pub fn search_provider(status: u16, payload: String) -> (Router, Recorded) {
    let recorded = Recorded::default();
    let app = Router::new()
        .route(
            "/search",
            get(
                move |State(recorded): State<Recorded>,
                      Query(params): Query<HashMap<String, String>>| {
                    let payload = payload.clone();
                    async move {
                        recorded.hits.fetch_add(1, Ordering::SeqCst);
                        *recorded.last_params.lock().unwrap() = Some(params);
                        (
                            axum::http::StatusCode::from_u16(status).unwrap(),
                            [(axum::http::header::CONTENT_TYPE, "application/json")],
                            payload,
                        )
                    }
                },
            ),
        )
        .with_state(recorded.clone());
    (app, recorded)
}

/// A Wikipedia stand-in that knows a single page.
pub fn wikipedia(page_title: &'static str, extract: &'static str) -> Router {
    Router::new()
        .route(
            "/rest_v1/page/summary/:title",
            get(move |axum::extract::Path(title): axum::extract::Path<String>| async move {
                if title == page_title.replace(' ', "_") {
                    (axum::http::StatusCode::OK, Json(json!({ "extract": extract })))
                } else {
                    (axum::http::StatusCode::NOT_FOUND, Json(json!({ "type": "not_found" })))
                }
            }),
        )
        .route(
            "/w/api.php",
            get(move |Query(params): Query<HashMap<String, String>>| async move {
                let hits = if params.contains_key("srsearch") {
                    json!([{ "title": page_title }])
                } else {
                    json!([])
                };
                Json(json!({ "query": { "search": hits } }))
            }),
        )
}

/// LLM provider double that records the prompt it was given.
pub struct StubLlm {
    reply: Result<String, String>,
    pub prompts: Mutex<Vec<String>>,
}

impl StubLlm {
    pub fn answering(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(text.to_string()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(message.to_string()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn last_prompt(&self) -> String {
        self.prompts.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

#[async_trait]
impl LlmProvider for StubLlm {
    fn name(&self) -> &str {
        "stub"
    }

    async fn list_models(&self) -> Result<Vec<ProviderModel>, ApiError> {
        Ok(vec![ProviderModel {
            id: "models/stub-model".to_string(),
            display_name: "Stub".to_string(),
        }])
    }

    async fn generate(&self, request: GenerateRequest) -> Result<String, ApiError> {
        self.prompts.lock().unwrap().push(request.prompt);
        self.reply.clone().map_err(ApiError::Internal)
    }
}
