use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use skillgap_intelligence::GapThresholds;

pub const DATABASE_ENV: &str = "SKILLGAP_DATABASE";
pub const THRESHOLDS_ENV: &str = "SKILLGAP_THRESHOLDS";
pub const PROVIDER_TIMEOUT_ENV: &str = "SKILLGAP_PROVIDER_TIMEOUT_MS";
pub const DISABLE_AI_ENV: &str = "SKILLGAP_DISABLE_AI";

const DATA_DIR: &str = ".skillgap";
const DEFAULT_PROVIDER_TIMEOUT_MS: u64 = 30_000;

/// Returns the user's home directory.
pub fn home_dir() -> Result<PathBuf> {
    #[cfg(unix)]
    if let Ok(home) = std::env::var("HOME") {
        return Ok(PathBuf::from(home));
    }
    dirs::home_dir().ok_or_else(|| anyhow::anyhow!("home directory not found"))
}

/// `~/.skillgap`
pub fn data_dir() -> Result<PathBuf> {
    Ok(home_dir()?.join(DATA_DIR))
}

/// SQLite database path from `SKILLGAP_DATABASE`, else `~/.skillgap/skillgap.db`.
pub fn database_path() -> Result<PathBuf> {
    if let Some(custom) = non_empty_var(DATABASE_ENV) {
        return Ok(PathBuf::from(custom));
    }
    Ok(data_dir()?.join("skillgap.db"))
}

/// Thresholds file from `SKILLGAP_THRESHOLDS`, else `~/.skillgap/thresholds.toml`.
pub fn thresholds_path() -> Result<PathBuf> {
    if let Some(custom) = non_empty_var(THRESHOLDS_ENV) {
        return Ok(PathBuf::from(custom));
    }
    Ok(data_dir()?.join("thresholds.toml"))
}

/// Checks if `SKILLGAP_DISABLE_AI` is set to true.
pub fn env_disable_ai() -> bool {
    std::env::var(DISABLE_AI_ENV)
        .map(|s| s == "1" || s.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// Narrator timeout from `SKILLGAP_PROVIDER_TIMEOUT_MS` (default 30s).
///
/// Unparseable or zero values fall back to the default.
pub fn env_provider_timeout() -> Duration {
    let ms = std::env::var(PROVIDER_TIMEOUT_ENV)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|ms| *ms > 0)
        .unwrap_or(DEFAULT_PROVIDER_TIMEOUT_MS);
    Duration::from_millis(ms)
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Load thresholds from a TOML file. A missing file yields the defaults;
/// keys absent from the file keep their default values.
pub fn load_thresholds(path: &Path) -> Result<GapThresholds> {
    if !path.exists() {
        debug!(path = %path.display(), "No thresholds file; using defaults");
        return Ok(GapThresholds::default());
    }
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading thresholds file {}", path.display()))?;
    let thresholds: GapThresholds = toml::from_str(&text)
        .with_context(|| format!("parsing thresholds file {}", path.display()))?;
    validate_thresholds(&thresholds)
        .with_context(|| format!("invalid thresholds in {}", path.display()))?;
    Ok(thresholds)
}

fn validate_thresholds(t: &GapThresholds) -> Result<()> {
    if t.demand_weight < 0.0 || t.proficiency_weight < 0.0 {
        bail!("score weights must not be negative");
    }
    if t.demand_weight + t.proficiency_weight <= 0.0 {
        bail!("demand_weight and proficiency_weight must not both be zero");
    }
    if t.trend_window == 0 {
        bail!("trend_window must be at least 1");
    }
    Ok(())
}

/// Everything the front end needs to build an analyzer.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzerSettings {
    pub database_path: PathBuf,
    pub thresholds_path: PathBuf,
    pub thresholds: GapThresholds,
    pub provider_timeout: Duration,
    pub disable_ai: bool,
}

impl AnalyzerSettings {
    /// Resolve settings from `SKILLGAP_*` variables and the thresholds file.
    pub fn from_env() -> Result<Self> {
        let database_path = database_path()?;
        let thresholds_path = thresholds_path()?;
        let thresholds = load_thresholds(&thresholds_path)?;
        Ok(Self {
            database_path,
            thresholds_path,
            thresholds,
            provider_timeout: env_provider_timeout(),
            disable_ai: env_disable_ai(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use skillgap_test_utils::{set_env_var, TestFixture};

    #[test]
    fn missing_file_gives_defaults() {
        let fixture = TestFixture::new().unwrap();
        let path = fixture.data_dir.join("absent.toml");
        assert_eq!(load_thresholds(&path).unwrap(), GapThresholds::default());
    }

    #[test]
    fn partial_file_overrides_named_keys() {
        let fixture = TestFixture::new().unwrap();
        let path = fixture
            .write_thresholds("low_coverage_max = 25.0\ntrend_window = 5\n")
            .unwrap();
        let t = load_thresholds(&path).unwrap();
        assert_eq!(t.low_coverage_max, 25.0);
        assert_eq!(t.trend_window, 5);
        assert_eq!(t.oversupply_high_coverage, 60.0);
    }

    #[test]
    fn malformed_file_names_the_path() {
        let fixture = TestFixture::new().unwrap();
        let path = fixture.write_thresholds("low_coverage_max = \"lots\"").unwrap();
        let err = format!("{:#}", load_thresholds(&path).unwrap_err());
        assert!(err.contains("thresholds.toml"));
    }

    #[test]
    fn zero_weights_are_rejected() {
        let fixture = TestFixture::new().unwrap();
        let path = fixture
            .write_thresholds("demand_weight = 0.0\nproficiency_weight = 0.0\n")
            .unwrap();
        let err = format!("{:#}", load_thresholds(&path).unwrap_err());
        assert!(err.contains("both be zero"));
    }

    #[test]
    #[serial]
    fn disable_ai_accepts_one_and_true() {
        for (value, expected) in [("1", true), ("TRUE", true), ("0", false), ("yes", false)] {
            let _g = set_env_var(DISABLE_AI_ENV, Some(value));
            assert_eq!(env_disable_ai(), expected, "value {value}");
        }
        let _g = set_env_var(DISABLE_AI_ENV, None);
        assert!(!env_disable_ai());
    }

    #[test]
    #[serial]
    fn provider_timeout_ignores_garbage_and_zero() {
        let _g = set_env_var(PROVIDER_TIMEOUT_ENV, Some("1500"));
        assert_eq!(env_provider_timeout(), Duration::from_millis(1500));
        let _g = set_env_var(PROVIDER_TIMEOUT_ENV, Some("soon"));
        assert_eq!(env_provider_timeout(), Duration::from_secs(30));
        let _g = set_env_var(PROVIDER_TIMEOUT_ENV, Some("0"));
        assert_eq!(env_provider_timeout(), Duration::from_secs(30));
    }
}
