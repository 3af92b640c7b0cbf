//! Google Gemini `generateContent` client.
//!
//! Differences from OpenAI-style chat APIs worth knowing:
//! - the system prompt is a top-level `systemInstruction`, not a message
//! - roles are `"user"` / `"model"`
//! - a blocked reply is a 200 with no text; the cause sits in the candidate's
//!   `finishReason` or in `promptFeedback.blockReason`

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ChatModel, ModelError, ModelReply, Turn};

/// The default Google Gemini API base URL.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Connection settings for [`GeminiClient`].
#[derive(Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    /// Whole-request timeout, including reading the body.
    pub timeout: Duration,
}

impl GeminiConfig {
    /// Settings for `api_key` with the default model, endpoint, and timeout.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_owned(),
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout: Duration::from_secs(120),
        }
    }
}

impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// [`ChatModel`] backed by the Gemini REST API.
#[derive(Debug)]
pub struct GeminiClient {
    client: Client,
    config: GeminiConfig,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    /// Set on "thinking" parts, which are not part of the answer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    thought: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    system_instruction: Content,
    contents: Vec<Content>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
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
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    message: String,
}

impl GeminiClient {
    /// Build a client; fails only if the HTTP client cannot be constructed.
    pub fn new(config: GeminiConfig) -> Result<Self, ModelError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("disha/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn endpoint_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    fn build_request_body(system_instruction: &str, turns: &[Turn]) -> GenerateContentRequest {
        GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![text_part(system_instruction)],
            },
            contents: turns
                .iter()
                .map(|turn| Content {
                    role: Some(turn.role.as_ref().to_owned()),
                    parts: vec![text_part(&turn.text)],
                })
                .collect(),
        }
    }

    fn parse_response(response: GenerateContentResponse) -> ModelReply {
        let GenerateContentResponse {
            candidates,
            prompt_feedback,
        } = response;

        let Some(candidate) = candidates.into_iter().next() else {
            return ModelReply {
                text: String::new(),
                finish_reason: prompt_feedback.and_then(|f| f.block_reason),
            };
        };

        let text = candidate
            .content
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter(|part| part.thought != Some(true))
                    .filter_map(|part| part.text)
                    .collect::<String>()
            })
            .unwrap_or_default();

        ModelReply {
            text,
            finish_reason: candidate
                .finish_reason
                .or_else(|| prompt_feedback.and_then(|f| f.block_reason)),
        }
    }

    /// Map a non-success response to [`ModelError::Api`], preferring the
    /// API's own error message over the raw body.
    fn api_error(status: reqwest::StatusCode, body: &str) -> ModelError {
        let message = serde_json::from_str::<ApiErrorBody>(body)
            .map(|b| b.error.message)
            .ok()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| body.trim().to_owned());
        ModelError::Api {
            status: status.as_u16(),
            message,
        }
    }
}

fn text_part(text: &str) -> Part {
    Part {
        text: Some(text.to_owned()),
        thought: None,
    }
}

#[async_trait]
impl ChatModel for GeminiClient {
    async fn generate(
        &self,
        system_instruction: &str,
        turns: &[Turn],
    ) -> Result<ModelReply, ModelError> {
        let body = Self::build_request_body(system_instruction, turns);
        debug!(model = %self.config.model, turns = turns.len(), "sending Gemini generateContent request");

        let response = self
            .client
            .post(self.endpoint_url())
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let body_text = response.text().await?;
        if !status.is_success() {
            return Err(Self::api_error(status, &body_text));
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body_text)
            .map_err(|e| ModelError::InvalidResponse(e.to_string()))?;
        Ok(Self::parse_response(parsed))
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn parse(value: serde_json::Value) -> ModelReply {
        GeminiClient::parse_response(serde_json::from_value(value).unwrap())
    }

    fn client_for(server: &MockServer) -> GeminiClient {
        let mut config = GeminiConfig::new("test-key");
        config.base_url = server.uri();
        GeminiClient::new(config).unwrap()
    }

    #[test]
    fn request_body_uses_gemini_shape() {
        let turns = vec![Turn::user("hi"), Turn::model("hello"), Turn::user("fever")];
        let body = serde_json::to_value(GeminiClient::build_request_body("be kind", &turns)).unwrap();

        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "be kind");
        assert!(body["systemInstruction"].get("role").is_none());
        assert_eq!(body["contents"][1]["role"], "model");
        assert_eq!(body["contents"][2]["parts"][0]["text"], "fever");
        assert!(body["contents"][0]["parts"][0].get("thought").is_none());
    }

    #[test]
    fn parse_joins_text_parts_and_skips_thoughts() {
        let reply = parse(json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        {"text": "planning...", "thought": true},
                        {"text": "Drink water. "},
                        {"text": "Rest well."}
                    ]
                },
                "finishReason": "STOP"
            }]
        }));
        assert_eq!(reply.text, "Drink water. Rest well.");
        assert_eq!(reply.finish_reason.as_deref(), Some("STOP"));
    }

    #[test]
    fn parse_blocked_candidate_has_empty_text() {
        let reply = parse(json!({
            "candidates": [{ "finishReason": "SAFETY" }]
        }));
        assert_eq!(reply.text, "");
        assert_eq!(reply.finish_reason.as_deref(), Some("SAFETY"));
    }

    #[test]
    fn parse_blocked_prompt_uses_block_reason() {
        let reply = parse(json!({
            "promptFeedback": { "blockReason": "PROHIBITED_CONTENT" }
        }));
        assert_eq!(reply.text, "");
        assert_eq!(reply.finish_reason.as_deref(), Some("PROHIBITED_CONTENT"));
    }

    #[test]
    fn api_error_prefers_structured_message() {
        let err = GeminiClient::api_error(
            reqwest::StatusCode::BAD_REQUEST,
            r#"{"error":{"code":400,"message":"API key not valid","status":"INVALID_ARGUMENT"}}"#,
        );
        assert_eq!(err.to_string(), "Gemini API returned HTTP 400: API key not valid");

        let err = GeminiClient::api_error(reqwest::StatusCode::BAD_GATEWAY, "upstream down\n");
        assert_eq!(err.to_string(), "Gemini API returned HTTP 502: upstream down");
    }

    #[test]
    fn debug_redacts_api_key() {
        let rendered = format!("{:?}", GeminiConfig::new("super-secret"));
        assert!(!rendered.contains("super-secret"));
    }

    #[tokio::test]
    async fn generate_posts_to_model_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-2.5-flash:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": { "role": "model", "parts": [{ "text": "Hello!" }] },
                    "finishReason": "STOP"
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let reply = client_for(&server)
            .generate("system", &[Turn::user("hi")])
            .await
            .unwrap();
        assert_eq!(reply.text, "Hello!");
    }

    #[tokio::test]
    async fn generate_maps_rate_limit_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "error": { "code": 429, "message": "Quota exceeded", "status": "RESOURCE_EXHAUSTED" }
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .generate("system", &[Turn::user("hi")])
            .await
            .unwrap_err();
        assert!(matches!(err, ModelError::Api { status: 429, .. }));
        assert!(err.to_string().contains("429"));
    }

    #[tokio::test]
    async fn generate_rejects_non_json_success_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .generate("system", &[Turn::user("hi")])
            .await
            .unwrap_err();
        assert!(matches!(err, ModelError::InvalidResponse(_)));
    }
}
