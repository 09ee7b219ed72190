//! Error taxonomy for the analysis engine.
//!
//! Only [`AnalysisError::InvalidArgument`] and [`AnalysisError::Unreachable`]
//! escape the public entry points; every other failure degrades to the
//! fallback envelope or the rule-based narration.

use std::time::Duration;
use thiserror::Error;

/// Errors reported by a [`SkillsRepository`](crate::SkillsRepository).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum RepositoryError {
    /// Required tables or columns are absent, or hold no rows.
    #[error("data unavailable: {0}")]
    DataUnavailable(String),

    /// The store answered but the query failed.
    #[error("storage error: {0}")]
    Storage(String),

    /// The store could not be reached at all.
    #[error("storage unreachable: {0}")]
    Unreachable(String),
}

/// Errors reported by a [`TextProvider`](crate::TextProvider).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ProviderError {
    /// No provider is configured; the narrator uses its rules.
    #[error("no text provider configured")]
    NotConfigured,

    /// The call did not finish within the narrator's budget.
    #[error("text provider timed out after {0:?}")]
    Timeout(Duration),

    /// Transport or API failure.
    #[error("text provider request failed: {0}")]
    Request(String),

    /// The provider answered with nothing usable.
    #[error("text provider returned an unparseable response: {0}")]
    Unparseable(String),
}

/// Errors surfaced by the analysis engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum AnalysisError {
    /// The caller passed an empty or unknown identifier.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("data unavailable: {0}")]
    DataUnavailable(String),

    #[error("storage error: {0}")]
    Storage(String),

    /// The store could not be reached at all.
    #[error("storage unreachable: {0}")]
    Unreachable(String),
}

impl From<RepositoryError> for AnalysisError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::DataUnavailable(msg) => Self::DataUnavailable(msg),
            RepositoryError::Storage(msg) => Self::Storage(msg),
            RepositoryError::Unreachable(msg) => Self::Unreachable(msg),
        }
    }
}

impl AnalysisError {
    /// Whether this failure should be replaced by the fallback envelope.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::DataUnavailable(_) | Self::Storage(_))
    }
}
