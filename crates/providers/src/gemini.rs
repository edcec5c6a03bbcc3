//! Google Gemini provider (`generateContent` REST endpoint).
//!
//! The whole assembled prompt goes out as one user turn; generation
//! settings travel in `generationConfig`.

use crate::openai_compat::{http_client, status_error, transport_error};
use async_trait::async_trait;
use carebot_core::error::ProviderError;
use carebot_core::provider::*;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

pub struct GeminiProvider {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl GeminiProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            api_key: api_key.into(),
            client: http_client(),
        }
    }

    /// Point at a different endpoint (proxies, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn request_body(request: &ProviderRequest) -> serde_json::Value {
        let mut generation_config = json!({ "temperature": request.temperature });
        if let Some(max_tokens) = request.max_tokens {
            generation_config["maxOutputTokens"] = json!(max_tokens);
        }

        json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": request.prompt }],
            }],
            "generationConfig": generation_config,
        })
    }

    fn parse_response(
        api_response: GenerateContentResponse,
        requested_model: &str,
    ) -> Result<ProviderResponse, ProviderError> {
        let Some(candidate) = api_response.candidates.into_iter().next() else {
            let reason = api_response
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .map(|r| format!("Prompt blocked: {r}"))
                .unwrap_or_else(|| "No candidates in response".into());
            return Err(ProviderError::ApiError {
                status_code: 200,
                message: reason,
            });
        };

        // Thinking models emit thought parts; only the answer text is kept.
        let text: String = candidate
            .content
            .map(|c| c.parts)
            .unwrap_or_default()
            .into_iter()
            .filter(|p| !p.thought)
            .filter_map(|p| p.text)
            .collect();

        if text.is_empty() {
            let reason = candidate.finish_reason.unwrap_or_else(|| "UNKNOWN".into());
            return Err(ProviderError::ApiError {
                status_code: 200,
                message: format!("Empty response (finish reason: {reason})"),
            });
        }

        let usage = api_response.usage_metadata.map(|u| Usage {
            prompt_tokens: u.prompt_token_count,
            completion_tokens: u.candidates_token_count,
            total_tokens: u.total_token_count,
        });

        Ok(ProviderResponse {
            text,
            usage,
            model: api_response
                .model_version
                .unwrap_or_else(|| requested_model.to_string()),
        })
    }
}

#[async_trait]
impl carebot_core::Provider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn complete(
        &self,
        request: ProviderRequest,
    ) -> std::result::Result<ProviderResponse, ProviderError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, request.model);
        let body = Self::request_body(&request);

        debug!(
            model = %request.model,
            prompt_chars = request.prompt.len(),
            "Sending Gemini generateContent request"
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status().as_u16();
        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Gemini returned error");
            return Err(gemini_status_error(status, error_body, &request.model));
        }

        let api_response: GenerateContentResponse =
            response.json().await.map_err(|e| ProviderError::ApiError {
                status_code: 200,
                message: format!("Failed to parse response: {e}"),
            })?;

        Self::parse_response(api_response, &request.model)
    }

    async fn health_check(&self) -> std::result::Result<bool, ProviderError> {
        let url = format!("{}/models", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await
            .map_err(transport_error)?;

        Ok(response.status().is_success())
    }
}

/// Like [`status_error`], except an unknown model is reported as such.
fn gemini_status_error(status: u16, body: String, model: &str) -> ProviderError {
    if status == 404 {
        return ProviderError::ModelNotFound(model.to_string());
    }
    status_error(status, body)
}

// --- Gemini API types (internal) ---

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
    #[serde(default)]
    model_version: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    thought: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use carebot_core::Provider;

    fn parse(data: &str) -> Result<ProviderResponse, ProviderError> {
        let api: GenerateContentResponse = serde_json::from_str(data).unwrap();
        GeminiProvider::parse_response(api, DEFAULT_MODEL)
    }

    #[test]
    fn body_uses_generation_config() {
        let body = GeminiProvider::request_body(&ProviderRequest {
            model: DEFAULT_MODEL.into(),
            prompt: "Halo".into(),
            temperature: 0.7,
            max_tokens: Some(1000),
        });
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "Halo");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 1000);
        assert!(body["generationConfig"]["temperature"].as_f64().is_some());
    }

    #[test]
    fn parse_joins_text_parts_and_skips_thoughts() {
        let resp = parse(
            r#"{
                "candidates": [{
                    "content": {"role": "model", "parts": [
                        {"text": "menimbang...", "thought": true},
                        {"text": "Halo, "},
                        {"text": "ada yang bisa dibantu?"}
                    ]},
                    "finishReason": "STOP"
                }],
                "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 6, "totalTokenCount": 18},
                "modelVersion": "gemini-2.0-flash-001"
            }"#,
        )
        .unwrap();
        assert_eq!(resp.text, "Halo, ada yang bisa dibantu?");
        assert_eq!(resp.model, "gemini-2.0-flash-001");
        assert_eq!(resp.usage.unwrap().total_tokens, 18);
    }

    #[test]
    fn blocked_prompt_is_api_error() {
        let err = parse(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#).unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
    }

    #[test]
    fn empty_candidate_reports_finish_reason() {
        let err = parse(r#"{"candidates": [{"finishReason": "MAX_TOKENS"}]}"#).unwrap_err();
        assert!(err.to_string().contains("MAX_TOKENS"));
    }

    #[test]
    fn model_falls_back_to_requested() {
        let resp = parse(r#"{"candidates": [{"content": {"parts": [{"text": "ok"}]}}]}"#).unwrap();
        assert_eq!(resp.model, DEFAULT_MODEL);
        assert!(resp.usage.is_none());
    }

    #[test]
    fn unknown_model_status_names_the_model() {
        assert!(matches!(
            gemini_status_error(404, String::new(), "gemini-9"),
            ProviderError::ModelNotFound(m) if m == "gemini-9"
        ));
        assert!(matches!(
            gemini_status_error(403, String::new(), DEFAULT_MODEL),
            ProviderError::AuthenticationFailed(_)
        ));
        assert!(matches!(
            gemini_status_error(429, String::new(), DEFAULT_MODEL),
            ProviderError::RateLimited { .. }
        ));
        assert!(matches!(
            gemini_status_error(503, "overloaded".into(), DEFAULT_MODEL),
            ProviderError::ApiError { status_code: 503, .. }
        ));
    }

    #[test]
    fn constructor_defaults() {
        let provider = GeminiProvider::new("key").with_base_url("http://proxy.local/v1beta/");
        assert_eq!(provider.name(), "gemini");
        assert_eq!(provider.base_url, "http://proxy.local/v1beta");
    }
}
