//! Narrative insights over a gap analysis.
//!
//! The [`Narrator`] optionally asks a [`TextProvider`] to explain the
//! analysis. Any provider failure is logged and replaced by the rule-based
//! narration, so callers always receive insights and recommendations.

pub mod parse;
mod prompt;
mod rules;

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ProviderError;
use crate::repository::ResourceProfile;
use crate::resource::ResourceGapAnalysis;
use crate::thresholds::GapThresholds;
use crate::types::{
    GapAnalysis, MarketTrend, Recommendation, RecommendationKind, SkillCoverage, SkillDemand,
};

pub use parse::{parse_response, ParsedResponse};

/// Default budget for a single provider call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default completion size requested from the provider.
pub const DEFAULT_MAX_TOKENS: u32 = 1500;

/// A generative-text backend.
#[async_trait]
pub trait TextProvider: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Generate a completion for `prompt`.
    async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String, ProviderError>;
}

/// Where a narration's insights came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NarrationSource {
    Provider,
    RuleBased,
}

/// Insights and recommendations produced by the [`Narrator`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Narration {
    pub insights: Vec<String>,
    pub recommendations: Vec<Recommendation>,
    pub source: NarrationSource,
}

/// Produces narrative insights, with or without a text provider.
#[derive(Clone)]
pub struct Narrator {
    provider: Option<Arc<dyn TextProvider>>,
    timeout: Duration,
    max_tokens: u32,
    thresholds: GapThresholds,
}

impl fmt::Debug for Narrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Narrator")
            .field("provider", &self.provider.as_ref().map(|p| p.name().to_string()))
            .field("timeout", &self.timeout)
            .field("max_tokens", &self.max_tokens)
            .finish_non_exhaustive()
    }
}

impl Default for Narrator {
    fn default() -> Self {
        Self::rule_based()
    }
}

impl Narrator {
    /// Create a narrator around an optional provider.
    pub fn new(provider: Option<Arc<dyn TextProvider>>) -> Self {
        Self {
            provider,
            timeout: DEFAULT_TIMEOUT,
            max_tokens: DEFAULT_MAX_TOKENS,
            thresholds: GapThresholds::default(),
        }
    }

    /// Create a narrator that never calls a provider.
    pub fn rule_based() -> Self {
        Self::new(None)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_thresholds(mut self, thresholds: GapThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Whether a provider is configured.
    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    /// Narrate an organization or department analysis.
    ///
    /// Uses the provider only when `use_provider` is set and one is
    /// configured. Never fails.
    pub async fn narrate(
        &self,
        coverage: &[SkillCoverage],
        demand: &[SkillDemand],
        trends: &[MarketTrend],
        analysis: &GapAnalysis,
        use_provider: bool,
    ) -> Narration {
        if use_provider {
            let build = || prompt::organization_prompt(coverage, demand, trends, analysis);
            match self.invoke(build).await {
                Ok(parsed) => return provider_narration(parsed),
                Err(ProviderError::NotConfigured) => {
                    debug!("No text provider configured; using rule-based insights")
                }
                Err(err) => warn!(
                    provider = self.provider_name(),
                    error = %err,
                    "Text provider failed; using rule-based insights"
                ),
            }
        }
        self.narrate_rules(analysis)
    }

    /// Rule-based narration of an organization or department analysis.
    pub fn narrate_rules(&self, analysis: &GapAnalysis) -> Narration {
        Narration {
            insights: rules::organization_insights(analysis, &self.thresholds),
            recommendations: rules::organization_recommendations(analysis),
            source: NarrationSource::RuleBased,
        }
    }

    /// Narrate a single resource's analysis. Never fails.
    pub async fn narrate_resource(
        &self,
        profile: &ResourceProfile,
        analysis: &ResourceGapAnalysis,
        use_provider: bool,
    ) -> Narration {
        if use_provider {
            let build = || prompt::resource_prompt(profile, analysis);
            match self.invoke(build).await {
                Ok(parsed) => return provider_narration(parsed),
                Err(ProviderError::NotConfigured) => {
                    debug!(resource_id = %profile.id, "No text provider configured")
                }
                Err(err) => warn!(
                    provider = self.provider_name(),
                    resource_id = %profile.id,
                    error = %err,
                    "Text provider failed; using rule-based resource insights"
                ),
            }
        }
        self.narrate_resource_rules(profile, analysis)
    }

    /// Rule-based narration of a single resource's analysis.
    pub fn narrate_resource_rules(
        &self,
        profile: &ResourceProfile,
        analysis: &ResourceGapAnalysis,
    ) -> Narration {
        Narration {
            insights: rules::resource_insights(profile, analysis),
            recommendations: rules::resource_recommendations(analysis),
            source: NarrationSource::RuleBased,
        }
    }

    fn provider_name(&self) -> &str {
        self.provider.as_ref().map_or("none", |p| p.name())
    }

    /// One bounded attempt; no retries. The prompt is only built when a
    /// provider is configured.
    async fn invoke(
        &self,
        prompt: impl FnOnce() -> String,
    ) -> Result<ParsedResponse, ProviderError> {
        let provider = self.provider.as_ref().ok_or(ProviderError::NotConfigured)?;
        let prompt = prompt();
        debug!(
            provider = provider.name(),
            prompt_len = prompt.len(),
            "Requesting narrative insights"
        );
        let reply = provider.generate(&prompt, self.max_tokens);
        let text = tokio::time::timeout(self.timeout, reply)
            .await
            .map_err(|_| ProviderError::Timeout(self.timeout))??;
        parse_response(&text)
    }
}

/// Combine the generator's recommendations with a narration's.
///
/// Provider items follow the generated list. Rule-based items repeat the
/// generator's summaries, so only kinds the generator did not emit are kept.
pub(crate) fn merge_recommendations(
    mut generated: Vec<Recommendation>,
    narration: Vec<Recommendation>,
    source: NarrationSource,
) -> Vec<Recommendation> {
    match source {
        NarrationSource::Provider => generated.extend(narration),
        NarrationSource::RuleBased => {
            let emitted: HashSet<RecommendationKind> =
                generated.iter().map(|r| r.kind).collect();
            generated.extend(narration.into_iter().filter(|r| !emitted.contains(&r.kind)));
        }
    }
    generated
}

/// A response with only one of the two sections still counts as usable.
fn provider_narration(parsed: ParsedResponse) -> Narration {
    Narration {
        insights: parsed.insights,
        recommendations: parsed.recommendations,
        source: NarrationSource::Provider,
    }
}
