use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Url;

/// Connection settings for one provider, read from `SKILLGAP_<PREFIX>_*`.
#[derive(Clone)]
pub struct ProviderConfig {
    pub api_key: String,
    pub base_url: Url,
    pub model: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url.as_str())
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ProviderConfig {
    pub fn from_env(
        prefix: &str,
        default_model: &str,
        default_base: &str,
        default_timeout_ms: u64,
    ) -> Result<Self> {
        let key_var = format!("SKILLGAP_{}_API_KEY", prefix);
        let api_key = std::env::var(&key_var)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .with_context(|| format!("{key_var} must be set to use this provider"))?;

        let base_var = format!("SKILLGAP_{}_BASE_URL", prefix);
        let base_url = std::env::var(&base_var).unwrap_or_else(|_| default_base.to_string());
        let base_url = parse_base(&base_url)
            .with_context(|| format!("invalid {base_var} url: {base_url}"))?;

        let model_var = format!("SKILLGAP_{}_MODEL", prefix);
        let model = std::env::var(&model_var).unwrap_or_else(|_| default_model.to_string());

        let timeout_var = format!("SKILLGAP_{}_TIMEOUT_MS", prefix);
        let timeout_ms = std::env::var(&timeout_var)
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(default_timeout_ms);

        Ok(Self {
            api_key,
            base_url,
            model,
            timeout: Duration::from_millis(timeout_ms),
        })
    }

    /// Endpoint below the base url.
    pub(crate) fn endpoint(&self, path: &str) -> Url {
        self.base_url
            .join(path)
            .unwrap_or_else(|_| self.base_url.clone())
    }
}

/// Parse a base url, adding the trailing slash `Url::join` needs to keep the
/// last path segment.
pub(crate) fn parse_base(raw: &str) -> Result<Url> {
    let url = if raw.ends_with('/') {
        Url::parse(raw)?
    } else {
        Url::parse(&format!("{raw}/"))?
    };
    Ok(url)
}
