//! Per-resource gap analysis.
//!
//! Compares one person's skills against what their role expects and what
//! their current project assignments require.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::repository::{ResourceSkill, SkillRequirement};
use crate::thresholds::GapThresholds;
use crate::types::{GapSeverity, GapType, Priority, Recommendation, RecommendationKind};

/// A gap between a resource's skills and one requirement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceGap {
    pub skill_name: String,
    pub category: String,
    pub gap_severity: GapSeverity,
    pub gap_type: GapType,
    pub current_proficiency: f64,
    pub required_proficiency: f64,
    pub importance: f64,
    /// Role or project names that state the requirement.
    pub sources: Vec<String>,
}

/// A skill the resource holds at a high level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceStrength {
    pub skill_name: String,
    pub category: String,
    pub proficiency: f64,
    /// Required by the role or an assigned project.
    pub in_demand: bool,
}

/// A skill the resource should develop, merged across gap sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DevelopmentNeed {
    pub skill_name: String,
    pub category: String,
    pub priority: Priority,
    pub current_proficiency: f64,
    pub target_proficiency: f64,
    pub reasons: Vec<String>,
}

/// Output of [`compute_resource_gaps`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceGapAnalysis {
    pub role_gaps: Vec<ResourceGap>,
    pub project_gaps: Vec<ResourceGap>,
    pub strengths: Vec<ResourceStrength>,
    pub development_needs: Vec<DevelopmentNeed>,
    /// Share of distinct required skills with no gap, in [0.0, 1.0].
    pub readiness_score: f64,
}

/// Classify one resource's skills against role and project requirements.
pub fn compute_resource_gaps(
    skills: &[ResourceSkill],
    role_requirements: &[SkillRequirement],
    project_requirements: &[SkillRequirement],
    thresholds: &GapThresholds,
) -> ResourceGapAnalysis {
    let held: HashMap<i64, &ResourceSkill> = skills.iter().map(|s| (s.skill_id, s)).collect();
    let projects = merge_by_skill(project_requirements);

    let role_gaps: Vec<ResourceGap> = role_requirements
        .iter()
        .filter_map(|req| {
            let current = held.get(&req.skill_id).map(|s| s.proficiency);
            let required = req
                .min_proficiency
                .unwrap_or(thresholds.project_min_proficiency);
            match current {
                None => Some(missing_gap(req, required, thresholds)),
                Some(level) if level < required => Some(ResourceGap {
                    gap_severity: GapSeverity::Medium,
                    gap_type: GapType::LowProficiency,
                    current_proficiency: level,
                    ..missing_gap(req, required, thresholds)
                }),
                Some(_) => None,
            }
        })
        .collect();

    let project_gaps: Vec<ResourceGap> = projects
        .iter()
        .filter_map(|req| {
            let required = req
                .min_proficiency
                .unwrap_or(thresholds.project_min_proficiency);
            match held.get(&req.skill_id).map(|s| s.proficiency) {
                None => Some(missing_gap(req, required, thresholds)),
                Some(level)
                    if level < required
                        && req.importance > thresholds.low_proficiency_min_importance =>
                {
                    Some(ResourceGap {
                        gap_severity: GapSeverity::Medium,
                        gap_type: GapType::LowProficiency,
                        current_proficiency: level,
                        ..missing_gap(req, required, thresholds)
                    })
                }
                Some(_) => None,
            }
        })
        .collect();

    let required_ids: Vec<i64> = role_requirements
        .iter()
        .chain(projects.iter())
        .map(|r| r.skill_id)
        .collect();

    let mut strengths: Vec<ResourceStrength> = skills
        .iter()
        .filter(|s| s.proficiency >= thresholds.strength_min_proficiency)
        .map(|s| ResourceStrength {
            skill_name: s.skill_name.clone(),
            category: s.category.clone(),
            proficiency: s.proficiency,
            in_demand: required_ids.contains(&s.skill_id),
        })
        .collect();
    strengths.sort_by(|a, b| {
        b.proficiency
            .total_cmp(&a.proficiency)
            .then_with(|| a.skill_name.cmp(&b.skill_name))
    });

    let development_needs = development_needs(&role_gaps, &project_gaps);

    let mut distinct = required_ids;
    distinct.sort_unstable();
    distinct.dedup();
    let readiness_score = if distinct.is_empty() {
        1.0
    } else {
        let unmet = development_needs.len().min(distinct.len());
        (distinct.len() - unmet) as f64 / distinct.len() as f64
    };

    ResourceGapAnalysis {
        role_gaps,
        project_gaps,
        strengths,
        development_needs,
        readiness_score,
    }
}

/// Collapse duplicate project requirements; highest importance wins.
fn merge_by_skill(requirements: &[SkillRequirement]) -> Vec<SkillRequirement> {
    let mut merged: BTreeMap<i64, SkillRequirement> = BTreeMap::new();
    for req in requirements {
        match merged.get_mut(&req.skill_id) {
            Some(existing) => {
                if req.importance > existing.importance {
                    existing.importance = req.importance;
                }
                if !existing.source.split(", ").any(|s| s == req.source) {
                    existing.source = format!("{}, {}", existing.source, req.source);
                }
            }
            None => {
                merged.insert(req.skill_id, req.clone());
            }
        }
    }
    merged.into_values().collect()
}

fn missing_gap(req: &SkillRequirement, required: f64, t: &GapThresholds) -> ResourceGap {
    let gap_severity = if req.importance >= t.resource_critical_importance {
        GapSeverity::Critical
    } else {
        GapSeverity::High
    };
    ResourceGap {
        skill_name: req.skill_name.clone(),
        category: req.category.clone(),
        gap_severity,
        gap_type: GapType::Missing,
        current_proficiency: 0.0,
        required_proficiency: required,
        importance: req.importance,
        sources: req.source.split(", ").map(str::to_string).collect(),
    }
}

#[derive(Default)]
struct MergedGaps<'a> {
    gaps: Vec<&'a ResourceGap>,
    from_role: bool,
    projects: Vec<String>,
}

fn development_needs(
    role_gaps: &[ResourceGap],
    project_gaps: &[ResourceGap],
) -> Vec<DevelopmentNeed> {
    let mut by_skill: BTreeMap<&str, MergedGaps<'_>> = BTreeMap::new();
    for gap in role_gaps {
        let merged = by_skill.entry(gap.skill_name.as_str()).or_default();
        merged.gaps.push(gap);
        merged.from_role = true;
    }
    for gap in project_gaps {
        let merged = by_skill.entry(gap.skill_name.as_str()).or_default();
        merged.gaps.push(gap);
        merged.projects.extend(gap.sources.iter().cloned());
    }

    let mut needs: Vec<DevelopmentNeed> = by_skill
        .into_values()
        .filter_map(|merged| {
            let first = merged.gaps.first()?;
            let worst = merged.gaps.iter().map(|g| g.gap_severity).min()?;
            let from_project = !merged.projects.is_empty();
            let priority =
                if worst == GapSeverity::Critical || (merged.from_role && from_project) {
                    Priority::High
                } else if worst == GapSeverity::High {
                    Priority::Medium
                } else {
                    Priority::Low
                };
            let target_proficiency = merged
                .gaps
                .iter()
                .map(|g| g.required_proficiency)
                .fold(0.0, f64::max);
            let mut reasons = Vec::new();
            if merged.from_role {
                reasons.push("Expected by current role".to_string());
            }
            if from_project {
                reasons.push(format!("Required by {}", merged.projects.join(", ")));
            }
            Some(DevelopmentNeed {
                skill_name: first.skill_name.clone(),
                category: first.category.clone(),
                priority,
                current_proficiency: first.current_proficiency,
                target_proficiency,
                reasons,
            })
        })
        .collect();
    needs.sort_by(|a, b| {
        a.priority
            .cmp(&b.priority)
            .then_with(|| a.skill_name.cmp(&b.skill_name))
    });
    needs
}

/// Turn a resource analysis into development advice.
///
/// Always returns at least one recommendation.
pub fn build_resource_recommendations(analysis: &ResourceGapAnalysis) -> Vec<Recommendation> {
    let mut recommendations: Vec<Recommendation> = analysis
        .development_needs
        .iter()
        .take(5)
        .map(|need| {
            Recommendation::new(
                RecommendationKind::SkillDevelopment,
                need.priority,
                format!("Develop {}", need.skill_name),
                format!(
                    "Raise {} from level {:.1} to {:.1}. {}.",
                    need.skill_name,
                    need.current_proficiency,
                    need.target_proficiency,
                    need.reasons.join("; ")
                ),
            )
            .with_skills(vec![need.skill_name.clone()])
            .with_categories(vec![need.category.clone()])
        })
        .collect();

    let mentoring: Vec<String> = analysis
        .strengths
        .iter()
        .filter(|s| s.in_demand)
        .map(|s| s.skill_name.clone())
        .collect();
    if !mentoring.is_empty() {
        recommendations.push(
            Recommendation::new(
                RecommendationKind::Mentoring,
                Priority::Low,
                "Share in-demand expertise",
                format!("Consider mentoring colleagues in {}.", mentoring.join(", ")),
            )
            .with_skills(mentoring),
        );
    }

    if recommendations.is_empty() {
        recommendations.push(Recommendation::new(
            RecommendationKind::Review,
            Priority::Low,
            "Maintain current skill profile",
            "All role and project requirements are met; revisit when assignments change.",
        ));
    }
    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;

    fn held(id: i64, name: &str, level: f64) -> ResourceSkill {
        ResourceSkill {
            skill_id: id,
            skill_name: name.into(),
            category: "Technical".into(),
            proficiency: level,
        }
    }

    fn req(
        id: i64,
        name: &str,
        importance: f64,
        min: Option<f64>,
        source: &str,
    ) -> SkillRequirement {
        SkillRequirement {
            skill_id: id,
            skill_name: name.into(),
            category: "Technical".into(),
            importance,
            min_proficiency: min,
            source: source.into(),
        }
    }

    #[test]
    fn missing_role_skill_severity_follows_importance() {
        let analysis = compute_resource_gaps(
            &[],
            &[
                req(1, "Rust", 4.5, Some(3.0), "Engineer"),
                req(2, "Docs", 2.0, Some(2.0), "Engineer"),
            ],
            &[],
            &GapThresholds::default(),
        );
        assert_eq!(analysis.role_gaps.len(), 2);
        assert_eq!(analysis.role_gaps[0].gap_severity, GapSeverity::Critical);
        assert_eq!(analysis.role_gaps[1].gap_severity, GapSeverity::High);
        assert_eq!(analysis.readiness_score, 0.0);
    }

    #[test]
    fn below_role_minimum_is_low_proficiency() {
        let analysis = compute_resource_gaps(
            &[held(1, "Rust", 2.0)],
            &[req(1, "Rust", 3.0, Some(4.0), "Senior Engineer")],
            &[],
            &GapThresholds::default(),
        );
        let gap = &analysis.role_gaps[0];
        assert_eq!(gap.gap_type, GapType::LowProficiency);
        assert_eq!(gap.gap_severity, GapSeverity::Medium);
        assert_eq!(gap.current_proficiency, 2.0);
        assert_eq!(gap.required_proficiency, 4.0);
    }

    #[test]
    fn duplicate_project_requirements_merge() {
        let analysis = compute_resource_gaps(
            &[],
            &[],
            &[
                req(7, "Kafka", 3.0, None, "Billing"),
                req(7, "Kafka", 4.0, None, "Ledger"),
            ],
            &GapThresholds::default(),
        );
        assert_eq!(analysis.project_gaps.len(), 1);
        let gap = &analysis.project_gaps[0];
        assert_eq!(gap.importance, 4.0);
        assert_eq!(gap.gap_severity, GapSeverity::Critical);
        assert_eq!(gap.sources, vec!["Billing", "Ledger"]);
    }

    #[test]
    fn weak_project_skill_only_counts_when_important() {
        let skills = [held(1, "SQL", 2.0)];
        let minor = compute_resource_gaps(
            &skills,
            &[],
            &[req(1, "SQL", 3.0, None, "Reports")],
            &GapThresholds::default(),
        );
        assert!(minor.project_gaps.is_empty());
        assert_eq!(minor.readiness_score, 1.0);

        let major = compute_resource_gaps(
            &skills,
            &[],
            &[req(1, "SQL", 4.0, None, "Reports")],
            &GapThresholds::default(),
        );
        assert_eq!(major.project_gaps[0].gap_type, GapType::LowProficiency);
    }

    #[test]
    fn strengths_flag_demand_and_sort_by_level() {
        let analysis = compute_resource_gaps(
            &[held(1, "Go", 4.0), held(2, "Rust", 5.0), held(3, "Excel", 2.0)],
            &[req(1, "Go", 3.0, Some(3.0), "Engineer")],
            &[],
            &GapThresholds::default(),
        );
        assert_eq!(analysis.strengths.len(), 2);
        assert_eq!(analysis.strengths[0].skill_name, "Rust");
        assert!(!analysis.strengths[0].in_demand);
        assert!(analysis.strengths[1].in_demand);
        assert_eq!(analysis.readiness_score, 1.0);
    }

    #[test]
    fn skill_missing_for_role_and_project_is_high_priority() {
        let analysis = compute_resource_gaps(
            &[],
            &[req(1, "Terraform", 3.0, Some(3.0), "Platform Engineer")],
            &[req(1, "Terraform", 3.0, None, "Migration")],
            &GapThresholds::default(),
        );
        assert_eq!(analysis.development_needs.len(), 1);
        let need = &analysis.development_needs[0];
        assert_eq!(need.priority, Priority::High);
        assert_eq!(need.reasons.len(), 2);
        assert_eq!(need.reasons[1], "Required by Migration");
    }

    #[test]
    fn recommendations_never_empty() {
        let recs = build_resource_recommendations(&ResourceGapAnalysis::default());
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].kind, RecommendationKind::Review);
    }

    #[test]
    fn recommendations_cover_needs_and_mentoring() {
        let analysis = compute_resource_gaps(
            &[held(1, "Go", 5.0)],
            &[req(1, "Go", 3.0, Some(3.0), "Engineer")],
            &[req(2, "Rust", 4.0, None, "Ledger")],
            &GapThresholds::default(),
        );
        let recs = build_resource_recommendations(&analysis);
        assert_eq!(recs[0].kind, RecommendationKind::SkillDevelopment);
        assert_eq!(recs[0].skills, vec!["Rust"]);
        assert_eq!(recs.last().unwrap().kind, RecommendationKind::Mentoring);
    }
}
