/// LLM Client — the single point of entry for all Gemini API calls.
///
/// No other module talks to the generative-language API directly; handlers
/// depend on the [`Analyzer`] trait, which `GeminiClient` implements.
///
/// Model: gemini-1.5-pro (hardcoded, the prompt wording is tuned for it)
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error};

/// The model used for every analysis call.
pub const MODEL: &str = "gemini-1.5-pro";

/// Returned to the caller in place of the model output whenever the call fails.
pub const FALLBACK_RESPONSE: &str = "Error processing the resume. Please try again.";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<CandidateContent>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
pub struct CandidatePart {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u32,
    #[serde(default)]
    pub candidates_token_count: u32,
}

impl GenerateContentResponse {
    /// Joins the text parts of the first candidate, or `None` if it has none.
    pub fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

/// Turns a generated prompt into the free-text analysis shown to the user.
///
/// Implementations never fail: any upstream problem is logged and replaced by
/// [`FALLBACK_RESPONSE`].
#[async_trait]
pub trait Analyzer: Send + Sync {
    async fn analyze(&self, prompt: &str) -> String;
}

/// Thin wrapper over the Gemini `generateContent` endpoint.
/// Single request/response exchange: no retries, no streaming.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    api_base: String,
}

impl GeminiClient {
    pub fn new(api_key: String, api_base: String, timeout: Duration) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key,
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{MODEL}:generateContent", self.api_base)
    }

    /// Makes one call to Gemini and returns the generated text.
    pub async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let request_body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: api_error_message(body),
            });
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body)?;

        if let Some(usage) = &parsed.usage_metadata {
            debug!(
                "Gemini call succeeded: prompt_tokens={}, candidate_tokens={}, finish_reason={:?}",
                usage.prompt_token_count,
                usage.candidates_token_count,
                parsed.candidates.first().and_then(|c| c.finish_reason.as_deref())
            );
        }

        parsed.text().ok_or(LlmError::EmptyContent)
    }
}

#[async_trait]
impl Analyzer for GeminiClient {
    async fn analyze(&self, prompt: &str) -> String {
        match self.generate(prompt).await {
            Ok(text) => text,
            Err(e) => {
                error!("Error fetching AI response: {e}");
                FALLBACK_RESPONSE.to_string()
            }
        }
    }
}

/// Pulls `error.message` out of a Gemini error body, falling back to the raw body.
fn api_error_message(body: String) -> String {
    serde_json::from_str::<GeminiError>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};

    /// Serves `reply` for every generateContent call on an ephemeral port.
    async fn spawn_gemini(status: StatusCode, reply: Value) -> String {
        let app = Router::new().route(
            "/models/{call}",
            post(move || {
                let reply = reply.clone();
                async move { (status, Json(reply)) }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn client(base: String) -> GeminiClient {
        GeminiClient::new("test-key".to_string(), base, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_text_joins_parts_of_first_candidate() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [
                {"content": {"parts": [{"text": "Matching keywords: Go"}, {"text": "\nATS Score: 80%"}]}},
                {"content": {"parts": [{"text": "ignored"}]}}
            ]
        }))
        .unwrap();
        assert_eq!(
            response.text().as_deref(),
            Some("Matching keywords: Go\nATS Score: 80%")
        );
    }

    #[test]
    fn test_text_is_none_without_candidates() {
        let response: GenerateContentResponse =
            serde_json::from_value(json!({"promptFeedback": {"blockReason": "SAFETY"}})).unwrap();
        assert!(response.text().is_none());
    }

    #[test]
    fn test_api_error_message_prefers_structured_body() {
        let body = json!({"error": {"code": 429, "message": "Quota exceeded", "status": "RESOURCE_EXHAUSTED"}});
        assert_eq!(api_error_message(body.to_string()), "Quota exceeded");
        assert_eq!(api_error_message("bad gateway".to_string()), "bad gateway");
    }

    #[test]
    fn test_endpoint_uses_fixed_model() {
        let c = client("https://example.test/v1beta/".to_string());
        assert_eq!(
            c.endpoint(),
            "https://example.test/v1beta/models/gemini-1.5-pro:generateContent"
        );
    }

    #[tokio::test]
    async fn test_analyze_returns_model_text() {
        let base = spawn_gemini(
            StatusCode::OK,
            json!({"candidates": [{"content": {"parts": [{"text": "ATS Score: 72%"}]}, "finishReason": "STOP"}]}),
        )
        .await;
        assert_eq!(client(base).analyze("prompt").await, "ATS Score: 72%");
    }

    #[tokio::test]
    async fn test_analyze_falls_back_on_api_error() {
        let base = spawn_gemini(
            StatusCode::TOO_MANY_REQUESTS,
            json!({"error": {"code": 429, "message": "Quota exceeded"}}),
        )
        .await;
        let c = client(base);
        assert!(matches!(
            c.generate("prompt").await,
            Err(LlmError::Api { status: 429, .. })
        ));
        assert_eq!(c.analyze("prompt").await, FALLBACK_RESPONSE);
    }

    #[tokio::test]
    async fn test_analyze_falls_back_on_empty_candidates() {
        let base = spawn_gemini(StatusCode::OK, json!({"candidates": []})).await;
        assert_eq!(client(base).analyze("prompt").await, FALLBACK_RESPONSE);
    }

    #[tokio::test]
    async fn test_analyze_falls_back_when_unreachable() {
        // Nothing listens on the discard port.
        let c = client("http://127.0.0.1:9".to_string());
        assert_eq!(c.analyze("prompt").await, FALLBACK_RESPONSE);
    }
}
