use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::provider::LlmProvider;
use super::types::{GenerateRequest, GenerationConfig, ProviderModel, SafetySetting};
use crate::core::errors::ApiError;

const API_KEY_HEADER: &str = "x-goog-api-key";
const PAGE_SIZE: u32 = 100;

/// Google Generative Language API (`v1beta`).
#[derive(Clone)]
pub struct GeminiProvider {
    base_url: String,
    api_key: String,
    client: Client,
}

impl GeminiProvider {
    pub fn new(client: Client, base_url: &str, api_key: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            client,
        }
    }

    fn model_path(model: &str) -> String {
        if model.starts_with("models/") || model.starts_with("tunedModels/") {
            model.to_string()
        } else {
            format!("models/{}", model)
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelsPage {
    #[serde(default)]
    models: Vec<GeminiModelInfo>,
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiModelInfo {
    name: String,
    #[serde(default)]
    display_name: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentBody<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
    safety_settings: &'a [SafetySetting],
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn list_models(&self) -> Result<Vec<ProviderModel>, ApiError> {
        let mut models = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = format!("{}/v1beta/models?pageSize={}", self.base_url, PAGE_SIZE);
            if let Some(token) = &page_token {
                url.push_str(&format!("&pageToken={}", urlencoding::encode(token)));
            }

            let res = self
                .client
                .get(&url)
                .header(API_KEY_HEADER, &self.api_key)
                .send()
                .await
                .map_err(ApiError::internal)?;

            if !res.status().is_success() {
                let status = res.status();
                let text = res.text().await.unwrap_or_default();
                return Err(ApiError::Internal(format!(
                    "Failed to list models: {}",
                    provider_error_message(status, &text)
                )));
            }

            let page: ModelsPage = res.json().await.map_err(ApiError::internal)?;
            models.extend(page.models.into_iter().map(|m| ProviderModel {
                display_name: if m.display_name.is_empty() {
                    m.name.clone()
                } else {
                    m.display_name
                },
                id: m.name,
            }));

            match page.next_page_token.filter(|token| !token.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(models)
    }

    async fn generate(&self, request: GenerateRequest) -> Result<String, ApiError> {
        let url = format!(
            "{}/v1beta/{}:generateContent",
            self.base_url,
            Self::model_path(&request.model)
        );

        let body = GenerateContentBody {
            contents: vec![Content {
                role: "user",
                parts: vec![Part {
                    text: &request.prompt,
                }],
            }],
            generation_config: request.generation,
            safety_settings: &request.safety,
        };

        let res = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(ApiError::internal)?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(ApiError::Internal(provider_error_message(status, &text)));
        }

        let payload: Value = res.json().await.map_err(ApiError::internal)?;
        extract_text(&payload)
    }
}

/// Concatenates the text parts of the first candidate.
pub fn extract_text(payload: &Value) -> Result<String, ApiError> {
    let text: String = payload
        .get("candidates")
        .and_then(|v| v.get(0))
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.as_array())
        .map(|parts| {
            parts
                .iter()
                .filter_map(|part| part.get("text").and_then(|t| t.as_str()))
                .collect::<String>()
        })
        .unwrap_or_default();

    if text.is_empty() {
        return Err(ApiError::Internal(format!(
            "The model returned no text ({})",
            diagnose_empty_response(payload)
        )));
    }

    Ok(text)
}

fn diagnose_empty_response(payload: &Value) -> String {
    let mut diag = Vec::new();

    if let Some(reason) = payload
        .get("promptFeedback")
        .and_then(|f| f.get("blockReason"))
        .and_then(|v| v.as_str())
    {
        diag.push(format!("prompt blocked: {}", reason));
    }

    match payload.get("candidates").and_then(|v| v.as_array()) {
        Some(candidates) if candidates.is_empty() => diag.push("no candidates".to_string()),
        Some(candidates) => {
            if let Some(reason) = candidates[0].get("finishReason").and_then(|v| v.as_str()) {
                diag.push(format!("finish reason: {}", reason));
            }
        }
        None => diag.push("no candidates".to_string()),
    }

    diag.join(", ")
}

fn provider_error_message(status: StatusCode, body: &str) -> String {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(|m| m.to_string())
        })
        .unwrap_or_else(|| crate::search::truncate_for_log(body).to_string());

    if message.is_empty() {
        format!("Gemini API error ({})", status)
    } else {
        format!("Gemini API error ({}): {}", status, message)
    }
}
