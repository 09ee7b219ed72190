//! Skills-gap analysis engine.
//!
//! This crate provides:
//! - Coverage/demand gap classification and category scoring
//! - Rule-based recommendations for organizations and individual resources
//! - Optional narrated insights from a pluggable text provider, with a
//!   deterministic rule-based fallback
//! - An orchestrator that degrades to synthetic fallback data when storage
//!   cannot answer

pub mod analyzer;
pub mod envelope;
pub mod error;
pub mod fallback;
pub mod gaps;
pub mod memory;
pub mod narrator;
pub mod recommend;
pub mod repository;
pub mod resource;
pub mod thresholds;
pub mod types;

pub use analyzer::{AnalysisOptions, SkillsGapAnalyzer};
pub use envelope::{
    AnalysisEnvelope, CategoryCoverageSummary, CategoryDemandSummary, DepartmentGapSummary,
    OrganizationSkillsSummary, ProjectRequirementsSummary, ResourceAnalysisEnvelope,
};
pub use error::{AnalysisError, ProviderError, RepositoryError};
pub use fallback::{
    fallback_coverage, fallback_demand, fallback_department_summaries, fallback_envelope,
    fallback_resource_envelope, fallback_trends,
};
pub use gaps::{compute_gaps, compute_gaps_with};
pub use memory::MemSkillsRepository;
pub use narrator::{parse_response, Narration, NarrationSource, Narrator, TextProvider};
pub use recommend::{build_recommendations, build_recommendations_with};
pub use repository::{
    iso_date, Department, ResourceProfile, ResourceSkill, SchemaStatus, SkillRequirement,
    SkillsRepository, TimeRange, TimeWindow,
};
pub use resource::{
    build_resource_recommendations, compute_resource_gaps, DevelopmentNeed, ResourceGap,
    ResourceGapAnalysis, ResourceStrength,
};
pub use thresholds::GapThresholds;
pub use types::{
    CategoryGapScore, GapAnalysis, GapEntry, GapSeverity, GapType, MarketTrend, Priority,
    Recommendation, RecommendationKind, SkillCoverage, SkillDemand,
};
