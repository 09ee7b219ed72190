//! Configuration for the skills-gap engine.
//!
//! This crate resolves:
//! - The SQLite database location.
//! - Gap thresholds from an optional TOML file.
//! - Narration settings (provider timeout, AI kill switch).

pub mod env;

pub use env::{
    data_dir, database_path, env_disable_ai, env_provider_timeout, home_dir, load_thresholds,
    thresholds_path, AnalyzerSettings, DATABASE_ENV, DISABLE_AI_ENV, PROVIDER_TIMEOUT_ENV,
    THRESHOLDS_ENV,
};
