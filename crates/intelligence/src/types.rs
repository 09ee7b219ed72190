//! Data model shared by the calculator, recommender, and narrator.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Percentage helper that yields 0 instead of dividing by zero.
pub(crate) fn percentage(part: u32, whole: u32) -> f64 {
    if whole == 0 {
        0.0
    } else {
        f64::from(part) / f64::from(whole) * 100.0
    }
}

/// How widely a skill is held across the organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillCoverage {
    pub skill_id: i64,
    pub name: String,
    pub category: String,
    /// Number of resources holding this skill.
    pub resource_count: u32,
    /// `resource_count / total_resources * 100`.
    pub coverage_percentage: f64,
    /// Mean proficiency (0-5) among holders, 0 if nobody holds it.
    pub avg_proficiency: f64,
    /// Holders at the top proficiency tier.
    pub certified_count: u32,
    pub certification_percentage: f64,
}

impl SkillCoverage {
    /// Build a coverage row from raw counts, guarding every division.
    pub fn from_counts(
        skill_id: i64,
        name: impl Into<String>,
        category: impl Into<String>,
        resource_count: u32,
        total_resources: u32,
        avg_proficiency: Option<f64>,
        certified_count: u32,
    ) -> Self {
        let avg_proficiency = if resource_count == 0 {
            0.0
        } else {
            avg_proficiency.unwrap_or(0.0)
        };
        Self {
            skill_id,
            name: name.into(),
            category: category.into(),
            resource_count,
            coverage_percentage: percentage(resource_count, total_resources),
            avg_proficiency,
            certified_count,
            certification_percentage: percentage(certified_count, resource_count),
        }
    }
}

/// How often in-scope projects require a skill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillDemand {
    pub skill_id: i64,
    pub skill_name: String,
    pub category: String,
    pub project_count: u32,
    /// `project_count / total_projects * 100`.
    pub demand_percentage: f64,
    /// Mean stated importance (0-5) across requiring projects.
    pub avg_importance: f64,
}

impl SkillDemand {
    /// Build a demand row from raw counts, guarding every division.
    pub fn from_counts(
        skill_id: i64,
        skill_name: impl Into<String>,
        category: impl Into<String>,
        project_count: u32,
        total_projects: u32,
        avg_importance: Option<f64>,
    ) -> Self {
        Self {
            skill_id,
            skill_name: skill_name.into(),
            category: category.into(),
            project_count,
            demand_percentage: percentage(project_count, total_projects),
            avg_importance: avg_importance.unwrap_or(0.0),
        }
    }
}

/// Externally tracked market demand for a skill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketTrend {
    pub skill_name: String,
    pub category: String,
    /// Demand score (0-10).
    pub demand_score: f64,
    /// Year-over-year growth in percent.
    pub growth_rate: i32,
}

/// Qualitative tier of a gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GapSeverity {
    Critical,
    High,
    Medium,
}

impl std::fmt::Display for GapSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Critical => write!(f, "critical"),
            Self::High => write!(f, "high"),
            Self::Medium => write!(f, "medium"),
        }
    }
}

/// The mismatch pattern behind a gap entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapType {
    Missing,
    LowCoverage,
    LowProficiency,
    MarketTrend,
    LowCoverageTrend,
    Oversupply,
}

impl GapType {
    /// Get a short label for this gap type.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Missing => "missing",
            Self::LowCoverage => "low_coverage",
            Self::LowProficiency => "low_proficiency",
            Self::MarketTrend => "market_trend",
            Self::LowCoverageTrend => "low_coverage_trend",
            Self::Oversupply => "oversupply",
        }
    }
}

/// A classified mismatch between coverage and demand.
///
/// Only the metrics relevant to the gap type are populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GapEntry {
    pub skill_name: String,
    pub category: String,
    pub gap_severity: GapSeverity,
    pub gap_type: GapType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demand_percentage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coverage_percentage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_importance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_proficiency: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demand_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub growth_rate: Option<i32>,
}

impl GapEntry {
    /// Create an entry with no metrics attached.
    pub fn new(
        skill_name: impl Into<String>,
        category: impl Into<String>,
        gap_severity: GapSeverity,
        gap_type: GapType,
    ) -> Self {
        Self {
            skill_name: skill_name.into(),
            category: category.into(),
            gap_severity,
            gap_type,
            demand_percentage: None,
            coverage_percentage: None,
            avg_importance: None,
            avg_proficiency: None,
            demand_score: None,
            growth_rate: None,
        }
    }

    /// Attach the metrics of a demand row.
    pub fn with_demand(mut self, demand: &SkillDemand) -> Self {
        self.demand_percentage = Some(demand.demand_percentage);
        self.avg_importance = Some(demand.avg_importance);
        self
    }

    /// Attach the metrics of a coverage row.
    pub fn with_coverage(mut self, coverage: &SkillCoverage) -> Self {
        self.coverage_percentage = Some(coverage.coverage_percentage);
        self.avg_proficiency = Some(coverage.avg_proficiency);
        self
    }

    /// Attach the metrics of a market trend.
    pub fn with_trend(mut self, trend: &MarketTrend) -> Self {
        self.demand_score = Some(trend.demand_score);
        self.growth_rate = Some(trend.growth_rate);
        self
    }
}

/// Gap score aggregated at the category level.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryGapScore {
    /// Normalized mismatch in [0.0, 1.0].
    pub gap_score: f64,
    /// Distinct skills in demand for this category.
    pub required_skills: usize,
    /// Distinct skills held in this category.
    pub available_skills: usize,
    /// Demand exists but nobody covers the category.
    pub missing_category: bool,
    /// Coverage exists but no project asks for the category.
    pub oversupply: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_demand: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_coverage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_importance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_proficiency: Option<f64>,
}

/// Output of the gap calculator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GapAnalysis {
    pub immediate_gaps: Vec<GapEntry>,
    pub emerging_gaps: Vec<GapEntry>,
    pub oversupply: Vec<GapEntry>,
    pub category_gap_scores: BTreeMap<String, CategoryGapScore>,
    /// Mean of non-oversupplied category scores, in [0.0, 1.0].
    pub overall_gap_score: f64,
}

impl GapAnalysis {
    /// Immediate gaps with the given severity.
    pub fn immediate_with(&self, severity: GapSeverity) -> impl Iterator<Item = &GapEntry> {
        self.immediate_gaps
            .iter()
            .filter(move |g| g.gap_severity == severity)
    }

    /// Number of critical immediate gaps.
    pub fn critical_count(&self) -> usize {
        self.immediate_with(GapSeverity::Critical).count()
    }
}

/// Recommendation priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

/// What a recommendation is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    CriticalGaps,
    SkillAcquisition,
    CoverageExpansion,
    MarketTrend,
    Reallocation,
    CategoryFocus,
    Upskilling,
    SkillDevelopment,
    Mentoring,
    Review,
    AiGenerated,
}

/// Actionable advice derived from a gap analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub kind: RecommendationKind,
    pub priority: Priority,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skills: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
}

impl Recommendation {
    /// Create a recommendation without details or references.
    pub fn new(
        kind: RecommendationKind,
        priority: Priority,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            priority,
            title: title.into(),
            description: description.into(),
            details: Vec::new(),
            skills: Vec::new(),
            categories: Vec::new(),
        }
    }

    /// Set action items.
    pub fn with_details(mut self, details: Vec<String>) -> Self {
        self.details = details;
        self
    }

    /// Set referenced skills.
    pub fn with_skills(mut self, skills: Vec<String>) -> Self {
        self.skills = skills;
        self
    }

    /// Set referenced categories.
    pub fn with_categories(mut self, categories: Vec<String>) -> Self {
        self.categories = categories;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coverage_from_counts_guards_zero_totals() {
        let c = SkillCoverage::from_counts(1, "Rust", "Technical", 0, 0, None, 0);
        assert_eq!(c.coverage_percentage, 0.0);
        assert_eq!(c.certification_percentage, 0.0);
        assert_eq!(c.avg_proficiency, 0.0);
    }

    #[test]
    fn coverage_from_counts_computes_percentages() {
        let c = SkillCoverage::from_counts(1, "Rust", "Technical", 5, 20, Some(3.4), 1);
        assert_eq!(c.coverage_percentage, 25.0);
        assert_eq!(c.certification_percentage, 20.0);
        assert_eq!(c.avg_proficiency, 3.4);
    }

    #[test]
    fn demand_from_counts_guards_zero_projects() {
        let d = SkillDemand::from_counts(2, "Go", "Technical", 3, 0, Some(4.0));
        assert_eq!(d.demand_percentage, 0.0);
        assert_eq!(d.avg_importance, 4.0);
    }

    #[test]
    fn gap_entry_serializes_only_present_metrics() {
        let entry = GapEntry::new("Rust", "Technical", GapSeverity::Critical, GapType::Missing);
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["gap_severity"], "critical");
        assert_eq!(json["gap_type"], "missing");
        assert!(json.get("coverage_percentage").is_none());
    }

    #[test]
    fn severity_orders_critical_first() {
        let mut tiers = vec![GapSeverity::Medium, GapSeverity::Critical, GapSeverity::High];
        tiers.sort();
        assert_eq!(
            tiers,
            vec![GapSeverity::Critical, GapSeverity::High, GapSeverity::Medium]
        );
    }
}
