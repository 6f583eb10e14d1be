//! HTTP client for hosted Claude models.
//!
//! Supports AWS Bedrock (`invoke` with a Bedrock API key) and the Anthropic
//! Messages API. Both speak the same message format; only the URL, auth
//! headers and the placement of the version and model fields differ.

mod config;
mod prompts;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub use config::{LlmConfig, LlmProvider};
pub use prompts::{build_extraction_prompt, AGENDA_EXTRACTION_PROMPT};

use super::ModelInvoker;

/// Version string sent in the Bedrock request body.
pub const BEDROCK_ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";

/// Version header for the Anthropic Messages API.
pub const ANTHROPIC_API_VERSION: &str = "2023-06-01";

/// Errors that can occur during LLM operations.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Model returned no text content")]
    EmptyResponse,

    #[error("No API key configured (set {0} or LLM_API_KEY)")]
    MissingCredentials(&'static str),
}

/// Message in a chat-style request.
#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

/// Request body for both providers.
#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    anthropic_version: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
}

/// Response body for both providers.
#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    text: Option<String>,
}

impl MessagesResponse {
    /// First text segment of the reply.
    fn first_text(self) -> Option<String> {
        self.content
            .into_iter()
            .find(|block| {
                block.text.is_some() && block.kind.as_deref().map_or(true, |k| k == "text")
            })
            .and_then(|block| block.text)
    }
}

/// LLM client for a hosted model endpoint.
pub struct LlmClient {
    config: LlmConfig,
    client: Client,
}

impl LlmClient {
    /// Create a new LLM client with the given configuration.
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        // No timeout: a long agenda can take minutes to structure
        let client = Client::builder()
            .build()
            .map_err(|e| LlmError::Connection(e.to_string()))?;

        Ok(Self { config, client })
    }

    /// Get the config.
    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    fn request_body<'a>(&'a self, prompt: &'a str) -> MessagesRequest<'a> {
        let (anthropic_version, model) = match self.config.provider {
            LlmProvider::Bedrock => (Some(BEDROCK_ANTHROPIC_VERSION), None),
            LlmProvider::Anthropic => (None, Some(self.config.model_id())),
        };
        MessagesRequest {
            anthropic_version,
            model,
            max_tokens: self.config.max_tokens,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        }
    }

    /// Send one user message and return the first text segment of the reply.
    pub async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(LlmError::MissingCredentials(self.config.provider.key_env_var()))?;

        let url = self.config.invoke_url();
        debug!(
            "Invoking {} model {} ({} byte prompt)",
            self.config.provider,
            self.config.model_id(),
            prompt.len()
        );

        let request = self.client.post(&url).json(&self.request_body(prompt));
        let request = match self.config.provider {
            LlmProvider::Bedrock => request
                .bearer_auth(api_key)
                .header("accept", "application/json"),
            LlmProvider::Anthropic => request
                .header("x-api-key", api_key)
                .header("anthropic-version", ANTHROPIC_API_VERSION),
        };

        let resp = request
            .send()
            .await
            .map_err(|e| LlmError::Connection(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(LlmError::Api(format!("HTTP {}: {}", status, body)));
        }

        let response: MessagesResponse = resp
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        if response.stop_reason.as_deref() == Some("max_tokens") {
            warn!(
                "Model reply hit the {} token limit and is likely truncated",
                self.config.max_tokens
            );
        }

        response.first_text().ok_or(LlmError::EmptyResponse)
    }
}

#[async_trait]
impl ModelInvoker for LlmClient {
    async fn invoke(&self, prompt: &str) -> Result<String, LlmError> {
        self.complete(prompt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(provider: LlmProvider) -> LlmClient {
        LlmClient::new(LlmConfig::default().with_provider(provider)).unwrap()
    }

    #[test]
    fn test_bedrock_body() {
        let client = client(LlmProvider::Bedrock);
        let body = serde_json::to_value(client.request_body("hello")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "anthropic_version": "bedrock-2023-05-31",
                "max_tokens": 8192,
                "messages": [{"role": "user", "content": "hello"}]
            })
        );
    }

    #[test]
    fn test_anthropic_body_carries_model() {
        let client = client(LlmProvider::Anthropic);
        let body = serde_json::to_value(client.request_body("hello")).unwrap();
        assert_eq!(body["model"], "claude-3-5-sonnet-20241022");
        assert!(body.get("anthropic_version").is_none());
        assert_eq!(body["messages"][0]["role"], "user");
    }

    #[test]
    fn test_first_text_segment() {
        let response: MessagesResponse = serde_json::from_str(
            r#"{"content":[{"type":"text","text":"{\"a\":1}"},{"type":"text","text":"second"}],"stop_reason":"end_turn"}"#,
        )
        .unwrap();
        assert_eq!(response.first_text().as_deref(), Some("{\"a\":1}"));
    }

    #[test]
    fn test_first_text_skips_non_text_blocks() {
        let response: MessagesResponse = serde_json::from_str(
            r#"{"content":[{"type":"thinking","thinking":"..."},{"type":"text","text":"answer"}]}"#,
        )
        .unwrap();
        assert_eq!(response.first_text().as_deref(), Some("answer"));
    }

    #[test]
    fn test_empty_content() {
        let response: MessagesResponse = serde_json::from_str(r#"{"content":[]}"#).unwrap();
        assert!(response.first_text().is_none());
    }

    #[tokio::test]
    async fn test_missing_credentials() {
        let client = client(LlmProvider::Anthropic);
        let err = client.complete("prompt").await.unwrap_err();
        assert!(matches!(err, LlmError::MissingCredentials("ANTHROPIC_API_KEY")));
    }
}
