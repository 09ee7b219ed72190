//! Tunable classification thresholds and score weights.
//!
//! Defaults reproduce the historical hard-coded values. Every field is
//! optional when deserializing so a partial TOML file only overrides what
//! it names.

use serde::{Deserialize, Serialize};

/// Thresholds used by the gap calculator, recommender, and narrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GapThresholds {
    /// Coverage (%) below which a demanded skill is under-covered.
    pub low_coverage_max: f64,
    /// Demand (%) above which under-coverage matters.
    pub low_coverage_min_demand: f64,
    /// Mean proficiency below which holders are considered weak.
    pub low_proficiency_max: f64,
    /// Mean importance above which weak proficiency matters.
    pub low_proficiency_min_importance: f64,

    /// How many of the strongest market trends are inspected.
    pub trend_window: usize,
    /// Demand score above which an uncovered trend is an emerging gap.
    pub trend_missing_min_score: f64,
    /// Demand score above which an uncovered trend is high severity.
    pub trend_high_score: f64,
    /// Coverage (%) below which a covered trend is still a gap.
    pub trend_low_coverage_max: f64,
    /// Demand score above which low trend coverage matters.
    pub trend_low_coverage_min_score: f64,

    /// Coverage (%) above which an undemanded skill is oversupplied.
    pub oversupply_min_coverage: f64,
    /// Coverage (%) above which undemanded oversupply is high severity.
    pub oversupply_high_coverage: f64,
    /// Coverage (%) above which a lightly demanded skill is oversupplied.
    pub oversupply_saturated_coverage: f64,
    /// Demand (%) below which a saturated skill is oversupplied.
    pub oversupply_max_demand: f64,

    /// Weight of the demand/coverage term in a category score.
    pub demand_weight: f64,
    /// Weight of the importance/proficiency term in a category score.
    pub proficiency_weight: f64,

    /// Category score above which a focus recommendation is emitted.
    pub category_focus_score: f64,
    /// Overall score above which the narrative calls the gap significant.
    pub narrative_overall_score: f64,
    /// Category score above which the narrative mentions the category.
    pub narrative_category_score: f64,

    /// Proficiency a resource needs to satisfy a project requirement.
    pub project_min_proficiency: f64,
    /// Importance at or above which a missing personal skill is critical.
    pub resource_critical_importance: f64,
    /// Proficiency at or above which a skill counts as a strength.
    pub strength_min_proficiency: f64,
}

impl Default for GapThresholds {
    fn default() -> Self {
        Self {
            low_coverage_max: 20.0,
            low_coverage_min_demand: 30.0,
            low_proficiency_max: 3.0,
            low_proficiency_min_importance: 3.5,
            trend_window: 10,
            trend_missing_min_score: 7.5,
            trend_high_score: 8.5,
            trend_low_coverage_max: 15.0,
            trend_low_coverage_min_score: 8.0,
            oversupply_min_coverage: 30.0,
            oversupply_high_coverage: 60.0,
            oversupply_saturated_coverage: 70.0,
            oversupply_max_demand: 20.0,
            demand_weight: 0.7,
            proficiency_weight: 0.3,
            category_focus_score: 0.5,
            narrative_overall_score: 0.3,
            narrative_category_score: 0.4,
            project_min_proficiency: 3.0,
            resource_critical_importance: 4.0,
            strength_min_proficiency: 4.0,
        }
    }
}
