//! LLM client configuration.

use serde::{Deserialize, Serialize};

/// Hosted model provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// AWS Bedrock runtime (default)
    #[default]
    Bedrock,
    /// Anthropic Messages API
    Anthropic,
}

impl LlmProvider {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "bedrock" | "aws" => Some(Self::Bedrock),
            "anthropic" => Some(Self::Anthropic),
            _ => None,
        }
    }

    /// Provider-specific environment variable holding the credential.
    pub fn key_env_var(&self) -> &'static str {
        match self {
            Self::Bedrock => "AWS_BEARER_TOKEN_BEDROCK",
            Self::Anthropic => "ANTHROPIC_API_KEY",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Self::Bedrock => "anthropic.claude-3-5-sonnet-20241022-v2:0",
            Self::Anthropic => "claude-3-5-sonnet-20241022",
        }
    }
}

impl std::fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bedrock => write!(f, "bedrock"),
            Self::Anthropic => write!(f, "anthropic"),
        }
    }
}

/// Configuration for the LLM client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Hosted model provider
    #[serde(default)]
    pub provider: LlmProvider,
    /// API endpoint; derived from provider and region when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// AWS region for Bedrock
    #[serde(default = "default_region")]
    pub region: String,
    /// Bedrock API key or Anthropic API key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Model identifier; provider default when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Maximum tokens in response
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Truncate document text to this many bytes (UTF-8 safe). Unset sends everything.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_content_bytes: Option<usize>,
    /// Warn when document text exceeds this many characters
    #[serde(default = "default_warn_content_chars")]
    pub warn_content_chars: usize,
}

fn default_region() -> String {
    "us-west-2".to_string()
}

fn default_max_tokens() -> u32 {
    8192
}

fn default_warn_content_chars() -> usize {
    400_000
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::default(),
            endpoint: None,
            region: default_region(),
            api_key: None,
            model: None,
            max_tokens: default_max_tokens(),
            max_content_bytes: None,
            warn_content_chars: default_warn_content_chars(),
        }
    }
}

impl LlmConfig {
    /// Apply environment variable overrides from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_env_lookup(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup.
    ///
    /// Supported variables:
    /// - `LLM_PROVIDER`: "bedrock" or "anthropic"
    /// - `LLM_ENDPOINT`: API endpoint
    /// - `LLM_API_KEY`: API key for either provider
    /// - `LLM_MODEL`: Model identifier
    /// - `LLM_MAX_TOKENS`: Maximum tokens in response
    /// - `LLM_MAX_CONTENT_BYTES`: Truncate document text to this many bytes
    /// - `AWS_REGION` / `AWS_DEFAULT_REGION`: Bedrock region
    /// - `AWS_BEARER_TOKEN_BEDROCK` / `ANTHROPIC_API_KEY`: provider key, used
    ///   when no key is configured
    pub fn with_env_lookup<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(provider) = lookup("LLM_PROVIDER").and_then(|v| LlmProvider::from_str(&v)) {
            self.provider = provider;
        }
        if let Some(endpoint) = lookup("LLM_ENDPOINT") {
            self.endpoint = Some(endpoint);
        }
        if let Some(region) = lookup("AWS_REGION").or_else(|| lookup("AWS_DEFAULT_REGION")) {
            self.region = region;
        }

        // Explicit key wins, then config file, then the provider's own variable
        if let Some(key) = lookup("LLM_API_KEY") {
            self.api_key = Some(key);
        } else if self.api_key.is_none() {
            self.api_key = lookup(self.provider.key_env_var());
        }

        if let Some(model) = lookup("LLM_MODEL") {
            self.model = Some(model);
        }
        if let Some(n) = lookup("LLM_MAX_TOKENS").and_then(|v| v.parse().ok()) {
            self.max_tokens = n;
        }
        if let Some(n) = lookup("LLM_MAX_CONTENT_BYTES").and_then(|v| v.parse().ok()) {
            self.max_content_bytes = Some(n);
        }
        self
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = Some(endpoint.to_string());
        self
    }

    pub fn with_api_key(mut self, api_key: &str) -> Self {
        self.api_key = Some(api_key.to_string());
        self
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = Some(model.to_string());
        self
    }

    pub fn with_provider(mut self, provider: LlmProvider) -> Self {
        self.provider = provider;
        self
    }

    /// Model identifier in effect.
    pub fn model_id(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.provider.default_model())
    }

    /// Base URL in effect, without trailing slash.
    pub fn base_url(&self) -> String {
        let base = match (&self.endpoint, self.provider) {
            (Some(endpoint), _) => endpoint.clone(),
            (None, LlmProvider::Bedrock) => {
                format!("https://bedrock-runtime.{}.amazonaws.com", self.region)
            }
            (None, LlmProvider::Anthropic) => "https://api.anthropic.com".to_string(),
        };
        base.trim_end_matches('/').to_string()
    }

    /// Full URL of the model invocation endpoint.
    pub fn invoke_url(&self) -> String {
        match self.provider {
            LlmProvider::Bedrock => format!(
                "{}/model/{}/invoke",
                self.base_url(),
                urlencoding::encode(self.model_id())
            ),
            LlmProvider::Anthropic => format!("{}/v1/messages", self.base_url()),
        }
    }
}
