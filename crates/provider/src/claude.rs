use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use skillgap_intelligence::{ProviderError, TextProvider};

use crate::config::ProviderConfig;
use crate::{error_message, send_json};

pub(crate) const DEFAULT_BASE: &str = "https://api.anthropic.com/v1/";
pub(crate) const DEFAULT_MODEL: &str = "claude-3-5-haiku-latest";
const DEFAULT_TIMEOUT_MS: u64 = 30_000;
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic Messages API.
#[derive(Debug, Clone)]
pub struct ClaudeProvider {
    config: ProviderConfig,
    client: reqwest::Client,
}

impl ClaudeProvider {
    /// Configure from `SKILLGAP_CLAUDE_*`.
    pub fn from_env() -> Result<Self> {
        let config =
            ProviderConfig::from_env("CLAUDE", DEFAULT_MODEL, DEFAULT_BASE, DEFAULT_TIMEOUT_MS)?;
        Self::with_config(config)
    }

    pub fn with_config(config: ProviderConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { config, client })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct MessagesBody<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
}

/// Concatenate the text blocks of a Messages response.
fn extract_text(val: &Value) -> Option<String> {
    let text: String = val
        .get("content")?
        .as_array()?
        .iter()
        .filter_map(|item| item.get("text").and_then(Value::as_str))
        .collect();
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

#[async_trait]
impl TextProvider for ClaudeProvider {
    fn name(&self) -> &str {
        "claude"
    }

    async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String, ProviderError> {
        let body = MessagesBody {
            model: &self.config.model,
            max_tokens,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };
        let request = self
            .client
            .post(self.config.endpoint("messages"))
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body);

        let (status, parsed) = send_json(request).await?;
        if !status.is_success() {
            return Err(ProviderError::Request(error_message(
                &parsed,
                status,
                "claude call failed",
            )));
        }
        debug!(model = %self.config.model, "Claude response received");
        extract_text(&parsed)
            .ok_or_else(|| ProviderError::Unparseable("no text content in response".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_blocks_are_concatenated() {
        let val = json!({
            "content": [
                {"type": "text", "text": "Insights:\n- a\n"},
                {"type": "tool_use", "id": "x"},
                {"type": "text", "text": "Recommendations:\n- b"}
            ]
        });
        assert_eq!(
            extract_text(&val).as_deref(),
            Some("Insights:\n- a\nRecommendations:\n- b")
        );
    }

    #[test]
    fn empty_content_has_no_text() {
        assert!(extract_text(&json!({"content": []})).is_none());
        assert!(extract_text(&json!({"raw": "oops"})).is_none());
    }
}
