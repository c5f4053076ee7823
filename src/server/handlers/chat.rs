use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Serialize;
use serde_json::Value;

use crate::core::errors::ApiError;
use crate::prompt;
use crate::state::AppState;

pub const NO_MESSAGE: &str = "No message provided";

#[derive(Debug, Serialize)]
pub struct ChatReply {
    pub response: String,
}

/// `POST /api/chat`: search, compose, generate. Every message is searched.
pub async fn chat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ChatReply>, ApiError> {
    let payload = match payload {
        Ok(Json(value)) => value,
        Err(rejection) => {
            tracing::warn!("Unreadable chat request body: {}", rejection);
            Value::Null
        }
    };

    let message = payload
        .get("message")
        .and_then(|v| v.as_str())
        .unwrap_or_default();
    tracing::info!("Received message: {}", message);

    if message.is_empty() {
        return Err(ApiError::BadRequest(NO_MESSAGE.to_string()));
    }

    tracing::info!("Performing web search for up-to-date information");
    let web_info = state
        .search
        .search(message, state.settings.search.num_results)
        .await;

    let prompt = prompt::compose(message, &web_info);

    tracing::info!(
        "Sending request to {} with model {}",
        state.llm.name(),
        state.selection.model
    );
    let response = state
        .llm
        .generate(state.selection.request(prompt))
        .await
        .map_err(|err| {
            tracing::error!("Error generating response: {}", err);
            ApiError::Internal(err.message().to_string())
        })?;
    tracing::info!("Received response from {}", state.llm.name());

    Ok(Json(ChatReply { response }))
}
