//! Synthetic results returned when real data cannot be analyzed.
//!
//! The dataset below is fixed; gaps, recommendations, and insights are
//! computed from it with the normal calculator, so fallback output is
//! internally consistent and identical across calls. Every result is
//! tagged `using_fallback_data`.

use uuid::Uuid;

use crate::envelope::{
    rank_departments, AnalysisEnvelope, DepartmentGapSummary, EnvelopeParts,
    ResourceAnalysisEnvelope,
};
use crate::gaps::compute_gaps_with;
use crate::narrator::{merge_recommendations, Narrator};
use crate::recommend::build_recommendations_with;
use crate::repository::{ResourceProfile, ResourceSkill, SkillRequirement, TimeRange};
use crate::resource::compute_resource_gaps;
use crate::thresholds::GapThresholds;
use crate::types::{MarketTrend, SkillCoverage, SkillDemand};

const TOTAL_RESOURCES: u32 = 40;
const TOTAL_PROJECTS: u32 = 20;

/// (id, name, category, holders, avg proficiency, certified)
const COVERAGE: &[(i64, &str, &str, u32, f64, u32)] = &[
    (1, "React", "Frontend", 18, 3.8, 4),
    (2, "TypeScript", "Frontend", 16, 3.5, 3),
    (3, "Python", "Data", 14, 3.6, 3),
    (4, "SQL", "Data", 24, 3.9, 5),
    (5, "AWS", "Cloud", 6, 2.8, 1),
    (6, "Java", "Backend", 30, 4.1, 8),
    (7, "jQuery", "Frontend", 26, 3.2, 2),
    (8, "Security Auditing", "Security", 3, 2.5, 0),
    (9, "Go", "Backend", 4, 3.1, 0),
];

/// (id, name, category, projects, avg importance)
const DEMAND: &[(i64, &str, &str, u32, f64)] = &[
    (1, "React", "Frontend", 9, 4.0),
    (2, "TypeScript", "Frontend", 8, 3.8),
    (3, "Python", "Data", 8, 4.2),
    (5, "AWS", "Cloud", 10, 4.5),
    (10, "Kubernetes", "Cloud", 7, 4.3),
    (11, "Machine Learning", "Data", 5, 4.0),
    (8, "Security Auditing", "Security", 4, 4.2),
    (6, "Java", "Backend", 2, 3.0),
];

/// (name, category, demand score, growth)
const TRENDS: &[(&str, &str, f64, i32)] = &[
    ("Machine Learning", "Data", 9.2, 35),
    ("Python", "Data", 8.9, 20),
    ("Kubernetes", "Cloud", 8.8, 28),
    ("Cybersecurity", "Security", 8.7, 25),
    ("AWS", "Cloud", 8.6, 15),
    ("Go", "Backend", 8.3, 18),
    ("Rust", "Backend", 8.0, 22),
    ("React", "Frontend", 7.9, 10),
    ("jQuery", "Frontend", 3.1, -20),
];

/// (id, name, categories)
const DEPARTMENTS: &[(&str, &str, &[&str])] = &[
    ("engineering", "Engineering", &["Backend", "Cloud", "Security"]),
    ("data", "Data & Analytics", &["Data"]),
    ("product", "Product Design", &["Frontend"]),
];

pub fn fallback_coverage() -> Vec<SkillCoverage> {
    COVERAGE
        .iter()
        .map(|&(id, name, category, holders, proficiency, certified)| {
            SkillCoverage::from_counts(
                id,
                name,
                category,
                holders,
                TOTAL_RESOURCES,
                Some(proficiency),
                certified,
            )
        })
        .collect()
}

pub fn fallback_demand() -> Vec<SkillDemand> {
    DEMAND
        .iter()
        .map(|&(id, name, category, projects, importance)| {
            SkillDemand::from_counts(id, name, category, projects, TOTAL_PROJECTS, Some(importance))
        })
        .collect()
}

pub fn fallback_trends() -> Vec<MarketTrend> {
    TRENDS
        .iter()
        .map(|&(name, category, demand_score, growth_rate)| MarketTrend {
            skill_name: name.to_string(),
            category: category.to_string(),
            demand_score,
            growth_rate,
        })
        .collect()
}

/// Organization-level fallback envelope.
pub fn fallback_envelope(
    department_id: Option<String>,
    time_range: TimeRange,
    include_insights: bool,
    thresholds: &GapThresholds,
) -> AnalysisEnvelope {
    let coverage = fallback_coverage();
    let demand = fallback_demand();
    let trends = fallback_trends();
    let gap_analysis = compute_gaps_with(&coverage, &demand, &trends, thresholds);
    let generated = build_recommendations_with(&gap_analysis, thresholds);

    let (recommendations, ai_insights, insight_source) = if include_insights {
        let narration = Narrator::rule_based()
            .with_thresholds(thresholds.clone())
            .narrate_rules(&gap_analysis);
        let merged = merge_recommendations(generated, narration.recommendations, narration.source);
        (merged, Some(narration.insights), Some(narration.source))
    } else {
        (generated, None, None)
    };

    AnalysisEnvelope::assemble(EnvelopeParts {
        analysis_id: Uuid::new_v4(),
        coverage: &coverage,
        demand: &demand,
        trends: &trends,
        gap_analysis,
        recommendations,
        ai_insights,
        insight_source,
        using_fallback_data: true,
        department_id,
        time_range,
    })
}

/// Resource-level fallback envelope for `resource_id`.
pub fn fallback_resource_envelope(
    resource_id: &str,
    include_insights: bool,
    thresholds: &GapThresholds,
) -> ResourceAnalysisEnvelope {
    let resource = ResourceProfile {
        id: resource_id.to_string(),
        name: "Sample Engineer".to_string(),
        role: Some("Software Engineer".to_string()),
        department_id: Some("engineering".to_string()),
    };
    let skills = vec![
        held(6, "Java", "Backend", 4.5),
        held(4, "SQL", "Data", 3.5),
        held(5, "AWS", "Cloud", 2.0),
    ];
    let role_requirements = vec![
        required(6, "Java", "Backend", 4.0, Some(3.0), "Software Engineer"),
        required(5, "AWS", "Cloud", 3.5, Some(3.0), "Software Engineer"),
    ];
    let project_requirements = vec![
        required(10, "Kubernetes", "Cloud", 4.5, None, "Platform Migration"),
        required(4, "SQL", "Data", 3.0, None, "Reporting Revamp"),
    ];

    let analysis =
        compute_resource_gaps(&skills, &role_requirements, &project_requirements, thresholds);
    let narration = Narrator::rule_based()
        .with_thresholds(thresholds.clone())
        .narrate_resource_rules(&resource, &analysis);
    let (ai_insights, insight_source) = if include_insights {
        (Some(narration.insights), Some(narration.source))
    } else {
        (None, None)
    };

    ResourceAnalysisEnvelope {
        resource,
        skills,
        analysis,
        recommendations: narration.recommendations,
        ai_insights,
        insight_source,
        analyzed_at: time::OffsetDateTime::now_utc(),
        using_fallback_data: true,
    }
}

/// Department ranking built from the fallback dataset.
pub fn fallback_department_summaries(thresholds: &GapThresholds) -> Vec<DepartmentGapSummary> {
    let coverage = fallback_coverage();
    let demand = fallback_demand();
    let trends = fallback_trends();

    let mut summaries: Vec<DepartmentGapSummary> = DEPARTMENTS
        .iter()
        .map(|&(id, name, categories)| {
            let in_scope = |category: &str| categories.contains(&category);
            let coverage: Vec<SkillCoverage> = coverage
                .iter()
                .filter(|c| in_scope(c.category.as_str()))
                .cloned()
                .collect();
            let demand: Vec<SkillDemand> = demand
                .iter()
                .filter(|d| in_scope(d.category.as_str()))
                .cloned()
                .collect();
            let trends: Vec<MarketTrend> = trends
                .iter()
                .filter(|t| in_scope(t.category.as_str()))
                .cloned()
                .collect();
            let analysis = compute_gaps_with(&coverage, &demand, &trends, thresholds);
            DepartmentGapSummary::from_analysis(id, name, &analysis, true)
        })
        .collect();
    rank_departments(&mut summaries);
    summaries
}

fn held(id: i64, name: &str, category: &str, proficiency: f64) -> ResourceSkill {
    ResourceSkill {
        skill_id: id,
        skill_name: name.to_string(),
        category: category.to_string(),
        proficiency,
    }
}

fn required(
    id: i64,
    name: &str,
    category: &str,
    importance: f64,
    min_proficiency: Option<f64>,
    source: &str,
) -> SkillRequirement {
    SkillRequirement {
        skill_id: id,
        skill_name: name.to_string(),
        category: category.to_string(),
        importance,
        min_proficiency,
        source: source.to_string(),
    }
}
