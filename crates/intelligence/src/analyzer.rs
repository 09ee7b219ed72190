//! Analysis orchestrator.
//!
//! Sequence per call: probe the schema, fetch the three datasets, compute
//! gaps, then advise through the recommender and (optionally) the narrator.
//! Recoverable storage failures are replaced by the fallback envelope.

use std::sync::Arc;

use time::OffsetDateTime;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::envelope::{
    rank_departments, AnalysisEnvelope, DepartmentGapSummary, EnvelopeParts,
    ResourceAnalysisEnvelope,
};
use crate::error::{AnalysisError, RepositoryError};
use crate::fallback::{fallback_department_summaries, fallback_envelope, fallback_resource_envelope};
use crate::gaps::compute_gaps_with;
use crate::narrator::{merge_recommendations, Narrator};
use crate::recommend::build_recommendations_with;
use crate::repository::{SkillsRepository, TimeRange};
use crate::resource::compute_resource_gaps;
use crate::thresholds::GapThresholds;
use crate::types::{GapAnalysis, MarketTrend, SkillCoverage, SkillDemand};

/// Options for a single analysis call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisOptions {
    pub department_id: Option<String>,
    pub include_ai_insights: bool,
    pub time_range: TimeRange,
    /// Empty means every category.
    pub skill_categories: Vec<String>,
    pub force_fallback: bool,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            department_id: None,
            include_ai_insights: true,
            time_range: TimeRange::default(),
            skill_categories: Vec::new(),
            force_fallback: false,
        }
    }
}

/// Datasets and gaps from one completed run.
struct Computed {
    coverage: Vec<SkillCoverage>,
    demand: Vec<SkillDemand>,
    trends: Vec<MarketTrend>,
    analysis: GapAnalysis,
}

/// Entry point for skills-gap analysis.
#[derive(Clone)]
pub struct SkillsGapAnalyzer {
    repository: Arc<dyn SkillsRepository>,
    narrator: Narrator,
    thresholds: GapThresholds,
}

impl std::fmt::Debug for SkillsGapAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SkillsGapAnalyzer")
            .field("narrator", &self.narrator)
            .field("thresholds", &self.thresholds)
            .finish_non_exhaustive()
    }
}

impl SkillsGapAnalyzer {
    /// Analyzer with rule-based narration and default thresholds.
    pub fn new(repository: Arc<dyn SkillsRepository>) -> Self {
        Self {
            repository,
            narrator: Narrator::rule_based(),
            thresholds: GapThresholds::default(),
        }
    }

    pub fn with_narrator(mut self, narrator: Narrator) -> Self {
        self.narrator = narrator;
        self
    }

    /// Thresholds for the calculator; also handed to the narrator.
    pub fn with_thresholds(mut self, thresholds: GapThresholds) -> Self {
        self.narrator = self.narrator.with_thresholds(thresholds.clone());
        self.thresholds = thresholds;
        self
    }

    pub fn thresholds(&self) -> &GapThresholds {
        &self.thresholds
    }

    /// Analyze the organization, or one department when the options name it.
    ///
    /// Only [`AnalysisError::Unreachable`] escapes; missing data and storage
    /// errors produce the fallback envelope.
    pub async fn analyze(
        &self,
        options: &AnalysisOptions,
    ) -> Result<AnalysisEnvelope, AnalysisError> {
        let analysis_id = Uuid::new_v4();
        if options.force_fallback {
            info!(%analysis_id, "Fallback requested; skipping storage");
            return Ok(self.fallback(options));
        }

        match self.run_analysis(analysis_id, options).await {
            Ok(computed) => Ok(self.advise(analysis_id, options, computed).await),
            Err(err) if err.is_recoverable() => {
                warn!(
                    %analysis_id,
                    department_id = ?options.department_id,
                    error = %err,
                    "Analysis failed; returning fallback data"
                );
                Ok(self.fallback(options))
            }
            Err(err) => Err(err),
        }
    }

    /// Analyze one department by id.
    pub async fn analyze_department(
        &self,
        department_id: &str,
        options: &AnalysisOptions,
    ) -> Result<AnalysisEnvelope, AnalysisError> {
        let department_id = department_id.trim();
        if department_id.is_empty() {
            return Err(AnalysisError::InvalidArgument(
                "department id must not be empty".into(),
            ));
        }
        match self.repository.find_department(department_id).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                return Err(AnalysisError::InvalidArgument(format!(
                    "unknown department: {}",
                    department_id
                )))
            }
            Err(err) => debug!(department_id, error = %err, "Department lookup failed"),
        }
        let options = AnalysisOptions {
            department_id: Some(department_id.to_string()),
            ..options.clone()
        };
        self.analyze(&options).await
    }

    /// Analyze one person against their role and current assignments.
    pub async fn analyze_resource(
        &self,
        resource_id: &str,
        options: &AnalysisOptions,
    ) -> Result<ResourceAnalysisEnvelope, AnalysisError> {
        let resource_id = resource_id.trim();
        if resource_id.is_empty() {
            return Err(AnalysisError::InvalidArgument(
                "resource id must not be empty".into(),
            ));
        }
        if options.force_fallback {
            return Ok(self.resource_fallback(resource_id, options));
        }

        match self.run_resource_analysis(resource_id, options).await {
            Ok(envelope) => Ok(envelope),
            Err(err) if err.is_recoverable() => {
                warn!(
                    resource_id,
                    error = %err,
                    "Resource analysis failed; returning fallback data"
                );
                Ok(self.resource_fallback(resource_id, options))
            }
            Err(err) => Err(err),
        }
    }

    /// Rank every department by overall gap score, worst first.
    ///
    /// Departments that fail keep their row with `error` set and sort last.
    pub async fn list_departments_with_gap_summary(
        &self,
    ) -> Result<Vec<DepartmentGapSummary>, AnalysisError> {
        let departments = match self.repository.list_departments().await {
            Ok(departments) => departments,
            Err(RepositoryError::Unreachable(msg)) => return Err(AnalysisError::Unreachable(msg)),
            Err(err) => {
                warn!(error = %err, "Department list unavailable; returning fallback data");
                return Ok(fallback_department_summaries(&self.thresholds));
            }
        };

        let mut summaries = Vec::with_capacity(departments.len());
        for department in departments {
            let options = AnalysisOptions {
                department_id: Some(department.id.clone()),
                include_ai_insights: false,
                ..AnalysisOptions::default()
            };
            let analysis_id = Uuid::new_v4();
            let summary = match self.run_analysis(analysis_id, &options).await {
                Ok(computed) => DepartmentGapSummary::from_analysis(
                    &department.id,
                    &department.name,
                    &computed.analysis,
                    false,
                ),
                Err(AnalysisError::Unreachable(msg)) => {
                    return Err(AnalysisError::Unreachable(msg))
                }
                Err(err) => {
                    debug!(
                        department_id = %department.id,
                        error = %err,
                        "Department analysis failed"
                    );
                    DepartmentGapSummary::failed(&department.id, &department.name, err.to_string())
                }
            };
            summaries.push(summary);
        }
        rank_departments(&mut summaries);
        Ok(summaries)
    }

    async fn run_analysis(
        &self,
        analysis_id: Uuid,
        options: &AnalysisOptions,
    ) -> Result<Computed, AnalysisError> {
        let status = self.repository.probe_schema().await?;
        if !status.is_ready() {
            return Err(AnalysisError::DataUnavailable(status.describe()));
        }

        let department_id = options.department_id.as_deref();
        let categories = &options.skill_categories;
        let window = options.time_range.window();

        let coverage = self
            .repository
            .fetch_coverage(department_id, categories)
            .await?;
        let mut demand = self.repository.fetch_demand(&window, department_id).await?;
        let mut trends = self.repository.fetch_market_trends().await?;
        if !categories.is_empty() {
            demand.retain(|d| categories.contains(&d.category));
            trends.retain(|t| categories.contains(&t.category));
        }

        if coverage.is_empty() && demand.is_empty() {
            return Err(AnalysisError::DataUnavailable(
                "no coverage or demand rows in scope".into(),
            ));
        }

        debug!(
            %analysis_id,
            department_id = ?department_id,
            coverage = coverage.len(),
            demand = demand.len(),
            trends = trends.len(),
            "Fetched analysis inputs"
        );
        let analysis = compute_gaps_with(&coverage, &demand, &trends, &self.thresholds);
        Ok(Computed {
            coverage,
            demand,
            trends,
            analysis,
        })
    }

    async fn advise(
        &self,
        analysis_id: Uuid,
        options: &AnalysisOptions,
        computed: Computed,
    ) -> AnalysisEnvelope {
        let Computed {
            coverage,
            demand,
            trends,
            analysis,
        } = computed;
        let generated = build_recommendations_with(&analysis, &self.thresholds);

        let (recommendations, ai_insights, insight_source) = if options.include_ai_insights {
            let narration = self
                .narrator
                .narrate(&coverage, &demand, &trends, &analysis, true)
                .await;
            let merged =
                merge_recommendations(generated, narration.recommendations, narration.source);
            (merged, Some(narration.insights), Some(narration.source))
        } else {
            (generated, None, None)
        };

        info!(
            %analysis_id,
            department_id = ?options.department_id,
            overall_gap_score = analysis.overall_gap_score,
            immediate_gaps = analysis.immediate_gaps.len(),
            "Skills gap analysis complete"
        );

        AnalysisEnvelope::assemble(EnvelopeParts {
            analysis_id,
            coverage: &coverage,
            demand: &demand,
            trends: &trends,
            gap_analysis: analysis,
            recommendations,
            ai_insights,
            insight_source,
            using_fallback_data: false,
            department_id: options.department_id.clone(),
            time_range: options.time_range,
        })
    }

    async fn run_resource_analysis(
        &self,
        resource_id: &str,
        options: &AnalysisOptions,
    ) -> Result<ResourceAnalysisEnvelope, AnalysisError> {
        let status = self.repository.probe_schema().await?;
        if !status.is_ready() {
            return Err(AnalysisError::DataUnavailable(status.describe()));
        }

        let Some(resource) = self.repository.find_resource(resource_id).await? else {
            return Err(AnalysisError::InvalidArgument(format!(
                "unknown resource: {}",
                resource_id
            )));
        };
        let skills = self.repository.fetch_resource_skills(resource_id).await?;
        let role_requirements = match resource.role.as_deref() {
            Some(role) => self.repository.fetch_role_requirements(role).await?,
            None => Vec::new(),
        };
        let today = OffsetDateTime::now_utc().date();
        let project_requirements = self
            .repository
            .fetch_assignment_requirements(resource_id, today)
            .await?;

        let analysis = compute_resource_gaps(
            &skills,
            &role_requirements,
            &project_requirements,
            &self.thresholds,
        );
        let narration = if options.include_ai_insights {
            self.narrator.narrate_resource(&resource, &analysis, true).await
        } else {
            self.narrator.narrate_resource_rules(&resource, &analysis)
        };
        let (ai_insights, insight_source) = if options.include_ai_insights {
            (Some(narration.insights), Some(narration.source))
        } else {
            (None, None)
        };

        info!(
            resource_id,
            readiness_score = analysis.readiness_score,
            development_needs = analysis.development_needs.len(),
            "Resource analysis complete"
        );

        Ok(ResourceAnalysisEnvelope {
            resource,
            skills,
            analysis,
            recommendations: narration.recommendations,
            ai_insights,
            insight_source,
            analyzed_at: OffsetDateTime::now_utc(),
            using_fallback_data: false,
        })
    }

    fn fallback(&self, options: &AnalysisOptions) -> AnalysisEnvelope {
        fallback_envelope(
            options.department_id.clone(),
            options.time_range,
            options.include_ai_insights,
            &self.thresholds,
        )
    }

    fn resource_fallback(
        &self,
        resource_id: &str,
        options: &AnalysisOptions,
    ) -> ResourceAnalysisEnvelope {
        fallback_resource_envelope(resource_id, options.include_ai_insights, &self.thresholds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemSkillsRepository;
    use crate::narrator::NarrationSource;
    use crate::types::RecommendationKind;
    use crate::repository::Department;

    fn demand(id: i64, name: &str, category: &str) -> SkillDemand {
        SkillDemand::from_counts(id, name, category, 5, 10, Some(4.0))
    }

    fn coverage(id: i64, name: &str, category: &str, holders: u32) -> SkillCoverage {
        SkillCoverage::from_counts(id, name, category, holders, 10, Some(3.5), 0)
    }

    fn analyzer(repo: MemSkillsRepository) -> SkillsGapAnalyzer {
        SkillsGapAnalyzer::new(Arc::new(repo))
    }

    #[tokio::test]
    async fn real_data_is_not_tagged_fallback() {
        let repo = MemSkillsRepository::new().with_dataset(
            vec![coverage(1, "SQL", "Data", 8)],
            vec![demand(2, "Rust", "Technical")],
            Vec::new(),
        );
        let envelope = analyzer(repo).analyze(&AnalysisOptions::default()).await.unwrap();
        assert!(!envelope.using_fallback_data);
        assert_eq!(envelope.gap_analysis.immediate_gaps[0].skill_name, "Rust");
        assert_eq!(envelope.insight_source, Some(NarrationSource::RuleBased));
    }

    #[tokio::test]
    async fn recommendations_merge_generator_then_narration() {
        let coverage = vec![coverage(3, "Cobol", "Legacy", 9)];
        let demand = vec![demand(2, "Rust", "Technical")];
        let repo = MemSkillsRepository::new().with_dataset(
            coverage.clone(),
            demand.clone(),
            Vec::new(),
        );
        let analyzer = analyzer(repo);
        let analysis = compute_gaps_with(&coverage, &demand, &[], analyzer.thresholds());
        let generator = build_recommendations_with(&analysis, analyzer.thresholds());

        let envelope = analyzer.analyze(&AnalysisOptions::default()).await.unwrap();

        assert_eq!(envelope.recommendations[..generator.len()], generator[..]);
        let per_item = [RecommendationKind::SkillAcquisition, RecommendationKind::CategoryFocus];
        let mut summaries: Vec<RecommendationKind> = envelope
            .recommendations
            .iter()
            .map(|r| r.kind)
            .filter(|kind| !per_item.contains(kind))
            .collect();
        let emitted = summaries.len();
        summaries.sort_by_key(|kind| format!("{kind:?}"));
        summaries.dedup();
        assert_eq!(summaries.len(), emitted, "{:#?}", envelope.recommendations);
        assert!(summaries.contains(&RecommendationKind::CriticalGaps));
        assert!(summaries.contains(&RecommendationKind::Reallocation));
        assert!(summaries.contains(&RecommendationKind::Review));
    }

    #[tokio::test]
    async fn categories_scope_every_dataset() {
        let repo = MemSkillsRepository::new().with_dataset(
            vec![coverage(1, "SQL", "Data", 8), coverage(3, "Go", "Backend", 1)],
            vec![demand(2, "Rust", "Backend"), demand(4, "Spark", "Data")],
            Vec::new(),
        );
        let options = AnalysisOptions {
            skill_categories: vec!["Data".into()],
            include_ai_insights: false,
            ..AnalysisOptions::default()
        };
        let envelope = analyzer(repo).analyze(&options).await.unwrap();
        let names: Vec<&str> = envelope
            .gap_analysis
            .immediate_gaps
            .iter()
            .map(|g| g.skill_name.as_str())
            .collect();
        assert_eq!(names, vec!["Spark"]);
        assert!(envelope.ai_insights.is_none());
        assert_eq!(envelope.organization_skills.total_skills, 1);
    }

    #[tokio::test]
    async fn force_fallback_skips_storage() {
        let repo = Arc::new(MemSkillsRepository::new());
        let analyzer = SkillsGapAnalyzer::new(repo.clone());
        let options = AnalysisOptions {
            force_fallback: true,
            ..AnalysisOptions::default()
        };
        let envelope = analyzer.analyze(&options).await.unwrap();
        assert!(envelope.using_fallback_data);
        assert_eq!(repo.query_count(), 0);
    }

    #[tokio::test]
    async fn storage_error_degrades_to_fallback() {
        let repo = MemSkillsRepository::new()
            .with_dataset(vec![coverage(1, "SQL", "Data", 8)], Vec::new(), Vec::new())
            .with_fetch_error(RepositoryError::Storage("disk I/O error".into()));
        let envelope = analyzer(repo).analyze(&AnalysisOptions::default()).await.unwrap();
        assert!(envelope.using_fallback_data);
    }

    #[tokio::test]
    async fn unreachable_store_surfaces() {
        let repo = MemSkillsRepository::new()
            .with_probe_error(RepositoryError::Unreachable("unable to open".into()));
        let err = analyzer(repo)
            .analyze(&AnalysisOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Unreachable(_)));
    }

    #[tokio::test]
    async fn department_lookup_failure_still_analyzes() {
        let repo = MemSkillsRepository::new()
            .with_departments_error(RepositoryError::Storage("locked".into()));
        let envelope = analyzer(repo)
            .analyze_department("eng", &AnalysisOptions::default())
            .await
            .unwrap();
        assert!(envelope.using_fallback_data);
        assert_eq!(envelope.department_id.as_deref(), Some("eng"));
    }

    #[tokio::test]
    async fn known_department_scopes_analysis() {
        let repo = MemSkillsRepository::new()
            .with_dataset(vec![coverage(1, "SQL", "Data", 8)], Vec::new(), Vec::new())
            .with_department(
                Department {
                    id: "eng".into(),
                    name: "Engineering".into(),
                },
                Vec::new(),
                vec![demand(2, "Rust", "Technical")],
            );
        let envelope = analyzer(repo)
            .analyze_department(" eng ", &AnalysisOptions::default())
            .await
            .unwrap();
        assert!(!envelope.using_fallback_data);
        assert_eq!(envelope.gap_analysis.immediate_gaps.len(), 1);
        assert!(envelope.organization_skills.top_skills.is_empty());
    }
}
