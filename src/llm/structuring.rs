//! Prompt, invoke, parse-or-degrade.

use tracing::{debug, info, warn};

use super::{build_extraction_prompt, LlmClient, LlmConfig, LlmError, ModelInvoker};
use crate::record::StructuredRecord;

/// Turns extracted agenda text into a [`StructuredRecord`].
pub struct StructuringClient<I = LlmClient> {
    invoker: I,
    max_content_bytes: Option<usize>,
    warn_content_chars: usize,
}

impl StructuringClient<LlmClient> {
    /// Build an HTTP-backed client from explicit configuration.
    pub fn from_config(config: LlmConfig) -> Result<Self, LlmError> {
        let max_content_bytes = config.max_content_bytes;
        let warn_content_chars = config.warn_content_chars;
        let mut structurer = Self::new(LlmClient::new(config)?);
        structurer.max_content_bytes = max_content_bytes;
        structurer.warn_content_chars = warn_content_chars;
        Ok(structurer)
    }
}

impl<I: ModelInvoker> StructuringClient<I> {
    pub fn new(invoker: I) -> Self {
        let defaults = LlmConfig::default();
        Self {
            invoker,
            max_content_bytes: defaults.max_content_bytes,
            warn_content_chars: defaults.warn_content_chars,
        }
    }

    /// Truncate document text to this many bytes before prompting.
    pub fn with_max_content_bytes(mut self, max: Option<usize>) -> Self {
        self.max_content_bytes = max;
        self
    }

    pub fn invoker(&self) -> &I {
        &self.invoker
    }

    /// Ask the model to structure `text`.
    ///
    /// A reply that is not valid JSON is kept as a degraded record rather than
    /// discarded. Errors from the model call itself are returned unchanged.
    pub async fn structure(&self, text: &str) -> Result<StructuredRecord, LlmError> {
        let content = self.prepare_content(text);
        let prompt = build_extraction_prompt(content);

        let reply = self.invoker.invoke(&prompt).await?;
        debug!("Model replied with {} bytes", reply.len());

        let record = StructuredRecord::from_model_reply(&reply);
        if record.is_degraded() {
            warn!("Model reply was not valid JSON; keeping raw response");
        } else {
            info!("Model reply parsed as structured record");
        }
        Ok(record)
    }

    fn prepare_content<'a>(&self, text: &'a str) -> &'a str {
        let chars = text.chars().count();
        if chars > self.warn_content_chars {
            warn!(
                "Document text is {} characters; the model may reject or truncate it",
                chars
            );
        }
        match self.max_content_bytes {
            Some(max) if text.len() > max => {
                warn!("Truncating document text from {} to {} bytes", text.len(), max);
                truncate_content(text, max)
            }
            _ => text,
        }
    }
}

/// Truncate to at most `max` bytes on a UTF-8 boundary.
fn truncate_content(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Replies with a canned string and remembers the prompt.
    struct Canned {
        reply: Result<String, String>,
        prompts: Mutex<Vec<String>>,
    }

    impl Canned {
        fn ok(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn failing(msg: &str) -> Self {
            Self {
                reply: Err(msg.to_string()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn last_prompt(&self) -> String {
            self.prompts.lock().unwrap().last().cloned().unwrap_or_default()
        }
    }

    #[async_trait]
    impl ModelInvoker for Canned {
        async fn invoke(&self, prompt: &str) -> Result<String, LlmError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply.clone().map_err(LlmError::Api)
        }
    }

    #[tokio::test]
    async fn test_json_reply_is_structured() {
        let structurer = StructuringClient::new(Canned::ok(
            r#"{"meeting_title":"Board of Supervisors","date":"2024-01-05"}"#,
        ));
        let record = structurer.structure("Board Meeting\n").await.unwrap();
        assert!(!record.is_degraded());
        assert_eq!(record.meeting_title(), Some("Board of Supervisors"));
    }

    #[tokio::test]
    async fn test_non_json_reply_degrades() {
        let reply = "Sorry, I can't process this.";
        let structurer = StructuringClient::new(Canned::ok(reply));
        let record = structurer.structure("text").await.unwrap();
        assert_eq!(record, StructuredRecord::Raw(reply.to_string()));
    }

    #[tokio::test]
    async fn test_invoke_error_propagates() {
        let structurer = StructuringClient::new(Canned::failing("HTTP 403: forbidden"));
        let err = structurer.structure("text").await.unwrap_err();
        assert!(err.to_string().contains("403"));
    }

    #[tokio::test]
    async fn test_text_sent_verbatim_by_default() {
        let text = "x".repeat(50_000);
        let structurer = StructuringClient::new(Canned::ok("{}"));
        structurer.structure(&text).await.unwrap();
        assert!(structurer.invoker().last_prompt().contains(&text));
    }

    #[tokio::test]
    async fn test_opt_in_truncation() {
        let structurer =
            StructuringClient::new(Canned::ok("{}")).with_max_content_bytes(Some(5));
        structurer.structure("abcdefghij").await.unwrap();
        let prompt = structurer.invoker().last_prompt();
        assert!(prompt.contains("Document text:\nabcde\n"));
        assert!(!prompt.contains("abcdef"));
    }

    #[tokio::test]
    async fn test_truncation_limit_counts_bytes() {
        // "é" is two bytes, so a 4-byte limit keeps two characters
        let structurer =
            StructuringClient::new(Canned::ok("{}")).with_max_content_bytes(Some(4));
        structurer.structure("éété").await.unwrap();
        let prompt = structurer.invoker().last_prompt();
        assert!(prompt.ends_with("Document text:\néé\n"));
    }

    #[test]
    fn test_truncate_content_utf8_boundary() {
        assert_eq!(truncate_content("héllo", 2), "h");
        assert_eq!(truncate_content("héllo", 3), "hé");
        assert_eq!(truncate_content("short", 100), "short");
    }
}
