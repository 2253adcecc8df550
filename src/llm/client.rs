//! Completion API client
//!
//! A blocking HTTP client for an OpenAI-style `/v1/completions` endpoint.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default completions endpoint
pub const DEFAULT_API_URL: &str = "https://api.together.xyz/v1/completions";
/// Default model name
pub const DEFAULT_MODEL: &str = "mistralai/Mistral-7B-Instruct-v0.2";

/// Completion service error types
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Completion service not configured")]
    NotConfigured,

    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Completion service returned status {0}")]
    Status(u16),

    #[error("Malformed completion response: {0}")]
    MalformedResponse(String),

    #[error("No JSON object found in completion text")]
    NoJsonObject,

    #[error("Invalid JSON in completion text: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Value out of range: {0}")]
    OutOfRange(String),
}

/// Result type for completion calls
pub type LlmResult<T> = Result<T, LlmError>;

/// Sampling parameters and prompt for one completion call
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
}

/// A text-completion backend
pub trait CompletionClient: Send + Sync {
    /// Send one prompt and return the generated text
    fn complete(&self, request: &CompletionRequest) -> LlmResult<String>;
}

#[derive(Debug, Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    choices: Vec<ApiChoice>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    text: String,
}

/// Timeout for one completion request
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Completion client for the Together API (or any compatible endpoint).
///
/// The blocking HTTP client is built per request so that it is created and
/// dropped on the calling thread, never on an async runtime worker.
pub struct TogetherClient {
    api_url: String,
    api_key: String,
    model: String,
}

impl TogetherClient {
    pub fn new(api_url: impl Into<String>, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }
}

impl CompletionClient for TogetherClient {
    fn complete(&self, request: &CompletionRequest) -> LlmResult<String> {
        let body = ApiRequest {
            model: &self.model,
            prompt: &request.prompt,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            top_p: request.top_p,
        };

        let http = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        let response = http
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(LlmError::Status(status.as_u16()));
        }

        let raw = response.text()?;
        parse_completion_body(&raw)
    }
}

/// Pull `choices[0].text` out of a completion response body
fn parse_completion_body(raw: &str) -> LlmResult<String> {
    let parsed: ApiResponse = serde_json::from_str(raw)
        .map_err(|e| LlmError::MalformedResponse(e.to_string()))?;

    parsed
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.text.trim().to_string())
        .ok_or_else(|| LlmError::MalformedResponse("no choices in response".to_string()))
}

/// Completion service settings, read from the environment
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub api_url: String,
    pub model: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: DEFAULT_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

impl LlmConfig {
    /// Read `TOGETHER_API_KEY`, `MACROLOG_LLM_URL` and `MACROLOG_LLM_MODEL`.
    /// A blank key means no service is configured.
    pub fn from_env() -> Self {
        let api_key = std::env::var("TOGETHER_API_KEY")
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());

        let api_url = std::env::var("MACROLOG_LLM_URL")
            .ok()
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let model = std::env::var("MACROLOG_LLM_MODEL")
            .ok()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        Self {
            api_key,
            api_url,
            model,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Build a client, or `None` when no API key is set
    pub fn client(&self) -> Option<Arc<dyn CompletionClient>> {
        let key = self.api_key.as_ref()?;
        Some(Arc::new(TogetherClient::new(&self.api_url, key, &self.model)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_completion_body() {
        let raw = r#"{"id":"x","choices":[{"text":"  {\"calories\": 10}\n"}]}"#;
        assert_eq!(parse_completion_body(raw).unwrap(), r#"{"calories": 10}"#);
    }

    #[test]
    fn test_parse_completion_body_without_choices() {
        assert!(matches!(
            parse_completion_body(r#"{"choices":[]}"#),
            Err(LlmError::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_completion_body(r#"{"error":"rate limited"}"#),
            Err(LlmError::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_completion_body("<html>bad gateway</html>"),
            Err(LlmError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_request_body_shape() {
        let body = ApiRequest {
            model: DEFAULT_MODEL,
            prompt: "hi",
            max_tokens: 150,
            temperature: 0.5,
            top_p: 0.5,
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["model"], DEFAULT_MODEL);
        assert_eq!(value["prompt"], "hi");
        assert_eq!(value["max_tokens"], 150);
        assert_eq!(value["temperature"], 0.5);
        assert_eq!(value["top_p"], 0.5);
    }

    #[test]
    fn test_unconfigured_has_no_client() {
        let config = LlmConfig::default();
        assert!(!config.is_configured());
        assert!(config.client().is_none());

        let config = LlmConfig {
            api_key: Some("key".to_string()),
            ..LlmConfig::default()
        };
        assert!(config.client().is_some());
    }
}
