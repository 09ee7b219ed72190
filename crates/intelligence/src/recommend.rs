//! Rule-based recommendations derived from a gap analysis.

use crate::thresholds::GapThresholds;
use crate::types::{
    GapAnalysis, GapEntry, GapSeverity, Priority, Recommendation, RecommendationKind,
};

/// Build recommendations with the default thresholds.
pub fn build_recommendations(analysis: &GapAnalysis) -> Vec<Recommendation> {
    build_recommendations_with(analysis, &GapThresholds::default())
}

/// Build prioritized recommendations, in a fixed emission order.
pub fn build_recommendations_with(
    analysis: &GapAnalysis,
    thresholds: &GapThresholds,
) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    let critical: Vec<&GapEntry> = analysis.immediate_with(GapSeverity::Critical).collect();
    if !critical.is_empty() {
        recommendations.push(
            Recommendation::new(
                RecommendationKind::CriticalGaps,
                Priority::High,
                "Address critical skill gaps",
                format!(
                    "{} skill(s) required by active projects are not held by anyone in the organization.",
                    critical.len()
                ),
            )
            .with_details(vec![
                "Prioritize hiring or contracting for these skills".to_string(),
                "Identify adjacent skills that make internal training feasible".to_string(),
            ])
            .with_skills(names(&critical)),
        );

        for gap in &critical {
            let demand = gap.demand_percentage.unwrap_or(0.0);
            let importance = gap.avg_importance.unwrap_or(0.0);
            recommendations.push(
                Recommendation::new(
                    RecommendationKind::SkillAcquisition,
                    Priority::High,
                    format!("Acquire {} capability", gap.skill_name),
                    format!(
                        "{} is required by {:.0}% of in-scope projects (importance {:.1}/5) with no coverage.",
                        gap.skill_name, demand, importance
                    ),
                )
                .with_details(vec![
                    format!("Hire or contract a {} specialist", gap.skill_name),
                    format!(
                        "Start a training track for existing {} staff",
                        gap.category
                    ),
                ])
                .with_skills(vec![gap.skill_name.clone()])
                .with_categories(vec![gap.category.clone()]),
            );
        }
    }

    let high: Vec<&GapEntry> = analysis.immediate_with(GapSeverity::High).collect();
    if !high.is_empty() {
        recommendations.push(
            Recommendation::new(
                RecommendationKind::CoverageExpansion,
                Priority::Medium,
                "Expand coverage of in-demand skills",
                format!(
                    "{} skill(s) are held by too few people for current project demand.",
                    high.len()
                ),
            )
            .with_details(vec![
                "Cross-train resources from related skill areas".to_string(),
                "Pair junior staff with existing holders on active projects".to_string(),
            ])
            .with_skills(names(&high)),
        );
    }

    let emerging: Vec<&GapEntry> = analysis
        .emerging_gaps
        .iter()
        .filter(|g| g.gap_severity == GapSeverity::High)
        .collect();
    if !emerging.is_empty() {
        recommendations.push(
            Recommendation::new(
                RecommendationKind::MarketTrend,
                Priority::Medium,
                "Prepare for emerging market demand",
                format!(
                    "{} fast-growing market skill(s) have no internal coverage.",
                    emerging.len()
                ),
            )
            .with_details(vec![
                "Fund exploratory training or certifications".to_string(),
                "Consider these skills in upcoming hiring plans".to_string(),
            ])
            .with_skills(names(&emerging)),
        );
    }

    let surplus: Vec<&GapEntry> = analysis
        .oversupply
        .iter()
        .filter(|g| g.gap_severity == GapSeverity::High)
        .collect();
    if !surplus.is_empty() {
        recommendations.push(
            Recommendation::new(
                RecommendationKind::Reallocation,
                Priority::Low,
                "Redeploy surplus capability",
                format!(
                    "{} skill(s) are widely held but not required by current projects.",
                    surplus.len()
                ),
            )
            .with_details(vec![
                "Offer reskilling paths toward gap areas".to_string(),
                "Look for new project work that uses these skills".to_string(),
            ])
            .with_skills(names(&surplus)),
        );
    }

    let mut focus: Vec<(&String, f64)> = analysis
        .category_gap_scores
        .iter()
        .filter(|(_, s)| !s.oversupply && s.gap_score > thresholds.category_focus_score)
        .map(|(category, s)| (category, s.gap_score))
        .collect();
    focus.sort_by(|a, b| b.1.total_cmp(&a.1));
    for (category, score) in focus {
        recommendations.push(
            Recommendation::new(
                RecommendationKind::CategoryFocus,
                Priority::High,
                format!("Focus investment on {}", category),
                format!(
                    "The {} category has a gap score of {:.0}%.",
                    category,
                    score * 100.0
                ),
            )
            .with_categories(vec![category.clone()]),
        );
    }

    recommendations
}

fn names(gaps: &[&GapEntry]) -> Vec<String> {
    gaps.iter().map(|g| g.skill_name.clone()).collect()
}
