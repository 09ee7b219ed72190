//! Result envelopes returned by the analyzer.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::narrator::NarrationSource;
use crate::repository::{ResourceProfile, ResourceSkill, TimeRange};
use crate::resource::ResourceGapAnalysis;
use crate::types::{GapAnalysis, MarketTrend, Recommendation, SkillCoverage, SkillDemand};

/// Rows kept in the top-N lists of an envelope.
pub const TOP_N: usize = 10;

/// Per-category rollup of organization skills.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryCoverageSummary {
    pub skill_count: usize,
    pub avg_coverage: f64,
    pub avg_proficiency: f64,
}

/// What the organization has.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrganizationSkillsSummary {
    pub total_skills: usize,
    pub categories: BTreeMap<String, CategoryCoverageSummary>,
    /// Most widely held skills.
    pub top_skills: Vec<SkillCoverage>,
}

impl OrganizationSkillsSummary {
    pub fn from_coverage(coverage: &[SkillCoverage]) -> Self {
        let mut sums: BTreeMap<String, (usize, f64, f64)> = BTreeMap::new();
        for c in coverage {
            let entry = sums.entry(c.category.clone()).or_default();
            entry.0 += 1;
            entry.1 += c.coverage_percentage;
            entry.2 += c.avg_proficiency;
        }
        let categories = sums
            .into_iter()
            .map(|(category, (count, coverage, proficiency))| {
                let n = count as f64;
                (
                    category,
                    CategoryCoverageSummary {
                        skill_count: count,
                        avg_coverage: coverage / n,
                        avg_proficiency: proficiency / n,
                    },
                )
            })
            .collect();

        let mut top_skills = coverage.to_vec();
        top_skills.sort_by(|a, b| b.coverage_percentage.total_cmp(&a.coverage_percentage));
        top_skills.truncate(TOP_N);

        Self {
            total_skills: coverage.len(),
            categories,
            top_skills,
        }
    }
}

/// Per-category rollup of project demand.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryDemandSummary {
    pub skill_count: usize,
    pub avg_demand: f64,
    pub avg_importance: f64,
}

/// What in-scope projects ask for.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectRequirementsSummary {
    pub total_skills_required: usize,
    pub categories: BTreeMap<String, CategoryDemandSummary>,
    /// Most frequently required skills.
    pub top_requirements: Vec<SkillDemand>,
}

impl ProjectRequirementsSummary {
    pub fn from_demand(demand: &[SkillDemand]) -> Self {
        let mut sums: BTreeMap<String, (usize, f64, f64)> = BTreeMap::new();
        for d in demand {
            let entry = sums.entry(d.category.clone()).or_default();
            entry.0 += 1;
            entry.1 += d.demand_percentage;
            entry.2 += d.avg_importance;
        }
        let categories = sums
            .into_iter()
            .map(|(category, (count, demand, importance))| {
                let n = count as f64;
                (
                    category,
                    CategoryDemandSummary {
                        skill_count: count,
                        avg_demand: demand / n,
                        avg_importance: importance / n,
                    },
                )
            })
            .collect();

        let mut top_requirements = demand.to_vec();
        top_requirements.sort_by(|a, b| b.demand_percentage.total_cmp(&a.demand_percentage));
        top_requirements.truncate(TOP_N);

        Self {
            total_skills_required: demand.len(),
            categories,
            top_requirements,
        }
    }
}

/// Complete result of an organization or department analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisEnvelope {
    pub analysis_id: Uuid,
    pub organization_skills: OrganizationSkillsSummary,
    pub project_requirements: ProjectRequirementsSummary,
    pub gap_analysis: GapAnalysis,
    pub recommendations: Vec<Recommendation>,
    /// `None` when insights were not requested.
    pub ai_insights: Option<Vec<String>>,
    pub insight_source: Option<NarrationSource>,
    pub market_trends: Vec<MarketTrend>,
    #[serde(with = "time::serde::rfc3339")]
    pub analyzed_at: OffsetDateTime,
    pub using_fallback_data: bool,
    pub department_id: Option<String>,
    pub time_range: TimeRange,
}

/// Inputs gathered for one analysis run.
pub(crate) struct EnvelopeParts<'a> {
    pub analysis_id: Uuid,
    pub coverage: &'a [SkillCoverage],
    pub demand: &'a [SkillDemand],
    pub trends: &'a [MarketTrend],
    pub gap_analysis: GapAnalysis,
    pub recommendations: Vec<Recommendation>,
    pub ai_insights: Option<Vec<String>>,
    pub insight_source: Option<NarrationSource>,
    pub using_fallback_data: bool,
    pub department_id: Option<String>,
    pub time_range: TimeRange,
}

impl AnalysisEnvelope {
    pub(crate) fn assemble(parts: EnvelopeParts<'_>) -> Self {
        Self {
            analysis_id: parts.analysis_id,
            organization_skills: OrganizationSkillsSummary::from_coverage(parts.coverage),
            project_requirements: ProjectRequirementsSummary::from_demand(parts.demand),
            gap_analysis: parts.gap_analysis,
            recommendations: parts.recommendations,
            ai_insights: parts.ai_insights,
            insight_source: parts.insight_source,
            market_trends: parts.trends.iter().take(TOP_N).cloned().collect(),
            analyzed_at: OffsetDateTime::now_utc(),
            using_fallback_data: parts.using_fallback_data,
            department_id: parts.department_id,
            time_range: parts.time_range,
        }
    }
}

/// Complete result of a single-resource analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceAnalysisEnvelope {
    pub resource: ResourceProfile,
    pub skills: Vec<ResourceSkill>,
    pub analysis: ResourceGapAnalysis,
    pub recommendations: Vec<Recommendation>,
    pub ai_insights: Option<Vec<String>>,
    pub insight_source: Option<NarrationSource>,
    #[serde(with = "time::serde::rfc3339")]
    pub analyzed_at: OffsetDateTime,
    pub using_fallback_data: bool,
}

/// One row of the department ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepartmentGapSummary {
    pub department_id: String,
    pub name: String,
    /// `None` when the department could not be analyzed.
    pub overall_gap_score: Option<f64>,
    pub critical_gaps: usize,
    pub immediate_gaps: usize,
    pub emerging_gaps: usize,
    /// Categories with the largest gap scores, worst first.
    pub top_gap_categories: Vec<String>,
    pub using_fallback_data: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DepartmentGapSummary {
    /// Rows most worth attention per department.
    const TOP_CATEGORIES: usize = 3;

    pub(crate) fn from_analysis(
        id: impl Into<String>,
        name: impl Into<String>,
        analysis: &GapAnalysis,
        using_fallback_data: bool,
    ) -> Self {
        let mut categories: Vec<(&String, f64)> = analysis
            .category_gap_scores
            .iter()
            .filter(|(_, s)| !s.oversupply && s.gap_score > 0.0)
            .map(|(category, s)| (category, s.gap_score))
            .collect();
        categories.sort_by(|a, b| b.1.total_cmp(&a.1));

        Self {
            department_id: id.into(),
            name: name.into(),
            overall_gap_score: Some(analysis.overall_gap_score),
            critical_gaps: analysis.critical_count(),
            immediate_gaps: analysis.immediate_gaps.len(),
            emerging_gaps: analysis.emerging_gaps.len(),
            top_gap_categories: categories
                .into_iter()
                .take(Self::TOP_CATEGORIES)
                .map(|(category, _)| category.clone())
                .collect(),
            using_fallback_data,
            error: None,
        }
    }

    pub(crate) fn failed(id: impl Into<String>, name: impl Into<String>, error: String) -> Self {
        Self {
            department_id: id.into(),
            name: name.into(),
            overall_gap_score: None,
            critical_gaps: 0,
            immediate_gaps: 0,
            emerging_gaps: 0,
            top_gap_categories: Vec::new(),
            using_fallback_data: false,
            error: Some(error),
        }
    }
}

/// Highest score first; failed rows last, each group ordered by name.
pub(crate) fn rank_departments(summaries: &mut [DepartmentGapSummary]) {
    summaries.sort_by(|a, b| match (a.overall_gap_score, b.overall_gap_score) {
        (Some(x), Some(y)) => y.total_cmp(&x).then_with(|| a.name.cmp(&b.name)),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.name.cmp(&b.name),
    });
}
