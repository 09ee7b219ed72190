//! Generative-text providers for the insight narrator.
//!
//! Each provider implements [`TextProvider`] over one HTTP API. Which one is
//! used, if any, is decided by [`provider_from_env`].

pub mod claude;
pub mod config;
pub mod openai;

use std::str::FromStr;
use std::sync::Arc;

use anyhow::{bail, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};
use tracing::{debug, info};

use skillgap_intelligence::{ProviderError, TextProvider};

pub use claude::ClaudeProvider;
pub use config::ProviderConfig;
pub use openai::OpenAiProvider;

/// Selects the provider; unset means "whichever has an API key".
pub const PROVIDER_ENV: &str = "SKILLGAP_PROVIDER";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Claude,
    OpenAi,
    None,
}

impl FromStr for ProviderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "claude" | "anthropic" => Ok(Self::Claude),
            "openai" | "gpt" => Ok(Self::OpenAi),
            "none" | "off" | "" => Ok(Self::None),
            other => {
                bail!("unknown {PROVIDER_ENV} value: {other} (expected claude, openai or none)")
            }
        }
    }
}

fn has_key(prefix: &str) -> bool {
    std::env::var(format!("SKILLGAP_{prefix}_API_KEY"))
        .map(|k| !k.trim().is_empty())
        .unwrap_or(false)
}

/// Build the configured provider.
///
/// Returns `Ok(None)` when nothing is configured or the provider is set to
/// `none`. An explicitly selected provider without credentials is an error.
pub fn provider_from_env() -> Result<Option<Arc<dyn TextProvider>>> {
    let kind = match std::env::var(PROVIDER_ENV) {
        Ok(value) => value.parse()?,
        Err(_) if has_key("CLAUDE") => ProviderKind::Claude,
        Err(_) if has_key("OPENAI") => ProviderKind::OpenAi,
        Err(_) => ProviderKind::None,
    };

    let provider: Arc<dyn TextProvider> = match kind {
        ProviderKind::None => {
            debug!("No text provider configured; narration is rule-based");
            return Ok(None);
        }
        ProviderKind::Claude => Arc::new(ClaudeProvider::from_env()?),
        ProviderKind::OpenAi => Arc::new(OpenAiProvider::from_env()?),
    };
    info!(provider = provider.name(), "Text provider configured");
    Ok(Some(provider))
}

/// Send a request and decode the body as JSON, keeping non-JSON bodies as
/// `{"raw": text}`.
pub(crate) async fn send_json(
    request: reqwest::RequestBuilder,
) -> Result<(StatusCode, Value), ProviderError> {
    let resp = request
        .send()
        .await
        .map_err(|e| ProviderError::Request(e.to_string()))?;
    let status = resp.status();
    let text = resp
        .text()
        .await
        .map_err(|e| ProviderError::Request(e.to_string()))?;
    let parsed = serde_json::from_str(&text).unwrap_or_else(|_| json!({ "raw": text }));
    Ok((status, parsed))
}

/// Best error message from an API error body.
pub(crate) fn error_message(parsed: &Value, status: StatusCode, fallback: &str) -> String {
    let detail = parsed
        .get("error")
        .and_then(|e| e.get("message").or(Some(e)))
        .and_then(Value::as_str)
        .unwrap_or(fallback);
    format!("{status}: {detail}")
}
