//! LLM-backed structuring of agenda text.

mod client;
mod structuring;

use async_trait::async_trait;

pub use client::{
    build_extraction_prompt, LlmClient, LlmConfig, LlmError, LlmProvider,
    AGENDA_EXTRACTION_PROMPT, ANTHROPIC_API_VERSION, BEDROCK_ANTHROPIC_VERSION,
};
pub use structuring::StructuringClient;

/// Capability to send one prompt to a model and get its text reply back.
#[async_trait]
pub trait ModelInvoker: Send + Sync {
    async fn invoke(&self, prompt: &str) -> Result<String, LlmError>;
}
