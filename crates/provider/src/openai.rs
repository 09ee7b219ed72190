use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use skillgap_intelligence::{ProviderError, TextProvider};

use crate::config::ProviderConfig;
use crate::{error_message, send_json};

pub(crate) const DEFAULT_BASE: &str = "https://api.openai.com/v1/";
pub(crate) const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_TIMEOUT_MS: u64 = 30_000;
const SYSTEM_PROMPT: &str =
    "You are a workforce planning analyst. Answer concisely in the requested format.";

/// OpenAI-compatible chat completions API.
#[derive(Debug, Clone)]
pub struct OpenAiProvider {
    config: ProviderConfig,
    client: reqwest::Client,
}

impl OpenAiProvider {
    /// Configure from `SKILLGAP_OPENAI_*`.
    pub fn from_env() -> Result<Self> {
        let config =
            ProviderConfig::from_env("OPENAI", DEFAULT_MODEL, DEFAULT_BASE, DEFAULT_TIMEOUT_MS)?;
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
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatBody<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

fn extract_text(val: &Value) -> Option<String> {
    val.get("choices")?
        .as_array()?
        .first()?
        .get("message")?
        .get("content")?
        .as_str()
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}

#[async_trait]
impl TextProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String, ProviderError> {
        let body = ChatBody {
            model: &self.config.model,
            max_tokens,
            temperature: 0.3,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
        };
        let request = self
            .client
            .post(self.config.endpoint("chat/completions"))
            .bearer_auth(&self.config.api_key)
            .json(&body);

        let (status, parsed) = send_json(request).await?;
        if !status.is_success() {
            return Err(ProviderError::Request(error_message(
                &parsed,
                status,
                "openai call failed",
            )));
        }
        debug!(model = %self.config.model, "OpenAI response received");
        extract_text(&parsed)
            .ok_or_else(|| ProviderError::Unparseable("no message content in response".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn first_choice_content_is_used() {
        let val = json!({
            "choices": [
                {"message": {"role": "assistant", "content": "Insights:\n- a"}},
                {"message": {"role": "assistant", "content": "ignored"}}
            ]
        });
        assert_eq!(extract_text(&val).as_deref(), Some("Insights:\n- a"));
    }

    #[test]
    fn missing_or_blank_choice_has_no_text() {
        assert!(extract_text(&json!({"choices": []})).is_none());
        assert!(extract_text(&json!({"choices": [{"message": {"content": "  "}}]})).is_none());
    }
}
