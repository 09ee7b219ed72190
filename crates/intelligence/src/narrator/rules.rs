//! Deterministic narration used when no provider is available or it fails.

use crate::repository::ResourceProfile;
use crate::resource::{build_resource_recommendations, ResourceGapAnalysis};
use crate::thresholds::GapThresholds;
use crate::types::{
    GapAnalysis, GapEntry, GapSeverity, Priority, Recommendation, RecommendationKind,
};

/// Most skill names quoted inline in a single insight.
const MAX_NAMED_SKILLS: usize = 5;

/// Narrative insights for an organization or department analysis.
///
/// Always yields at least the overall assessment.
pub(crate) fn organization_insights(
    analysis: &GapAnalysis,
    thresholds: &GapThresholds,
) -> Vec<String> {
    let mut insights = Vec::new();
    let overall = analysis.overall_gap_score * 100.0;

    if analysis.overall_gap_score > thresholds.narrative_overall_score {
        insights.push(format!(
            "The organization shows a significant misalignment between available skills and \
             project demand, with an overall gap score of {:.0}%.",
            overall
        ));
    } else {
        insights.push(format!(
            "Available skills are broadly aligned with project demand, with an overall gap \
             score of {:.0}%.",
            overall
        ));
    }

    let mut notable: Vec<(&String, f64, bool)> = analysis
        .category_gap_scores
        .iter()
        .filter(|(_, s)| !s.oversupply && s.gap_score > thresholds.narrative_category_score)
        .map(|(category, s)| (category, s.gap_score, s.missing_category))
        .collect();
    notable.sort_by(|a, b| b.1.total_cmp(&a.1));
    for (category, score, missing) in notable {
        if missing {
            insights.push(format!(
                "Projects need {} skills but no one in scope holds any of them.",
                category
            ));
        } else {
            insights.push(format!(
                "The {} category has a gap score of {:.0}%, well above the rest of the portfolio.",
                category,
                score * 100.0
            ));
        }
    }

    let critical: Vec<&GapEntry> = analysis.immediate_with(GapSeverity::Critical).collect();
    if !critical.is_empty() {
        insights.push(format!(
            "{} critical skill gap(s) block current projects: {}.",
            critical.len(),
            quoted_names(&critical)
        ));
    }

    insights
}

/// Narrative recommendations for an organization or department analysis.
///
/// Never empty: a periodic review is always suggested.
pub(crate) fn organization_recommendations(analysis: &GapAnalysis) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    let critical: Vec<&GapEntry> = analysis.immediate_with(GapSeverity::Critical).collect();
    if !critical.is_empty() {
        recommendations.push(
            Recommendation::new(
                RecommendationKind::CriticalGaps,
                Priority::High,
                "Close critical gaps through targeted hiring",
                format!(
                    "Nobody currently holds {}. Bring in experienced people or contractors \
                     while a training plan is set up.",
                    quoted_names(&critical)
                ),
            )
            .with_skills(names(&critical)),
        );
    }

    let weak: Vec<&GapEntry> = analysis
        .immediate_gaps
        .iter()
        .filter(|g| g.gap_severity != GapSeverity::Critical)
        .collect();
    if !weak.is_empty() {
        recommendations.push(
            Recommendation::new(
                RecommendationKind::Upskilling,
                Priority::Medium,
                "Upskill existing staff",
                format!(
                    "Coverage or proficiency is thin for {}. Structured training and pairing \
                     on live projects will close these faster than hiring.",
                    quoted_names(&weak)
                ),
            )
            .with_skills(names(&weak)),
        );
    }

    if !analysis.emerging_gaps.is_empty() {
        let emerging: Vec<&GapEntry> = analysis.emerging_gaps.iter().collect();
        recommendations.push(
            Recommendation::new(
                RecommendationKind::MarketTrend,
                Priority::Medium,
                "Invest ahead of market demand",
                format!(
                    "The market is moving toward {}. Start building capability before projects \
                     ask for it.",
                    quoted_names(&emerging)
                ),
            )
            .with_skills(names(&emerging)),
        );
    }

    if !analysis.oversupply.is_empty() {
        let surplus: Vec<&GapEntry> = analysis.oversupply.iter().collect();
        recommendations.push(
            Recommendation::new(
                RecommendationKind::Reallocation,
                Priority::Low,
                "Rebalance over-represented skills",
                format!(
                    "{} are held more widely than projects require. Offer cross-training \
                     toward gap areas.",
                    quoted_names(&surplus)
                ),
            )
            .with_skills(names(&surplus)),
        );
    }

    recommendations.push(Recommendation::new(
        RecommendationKind::Review,
        Priority::Low,
        "Revisit the skills gap analysis regularly",
        "Re-run this analysis each quarter or whenever the project portfolio changes \
         significantly.",
    ));

    recommendations
}

/// Narrative insights for a single resource.
pub(crate) fn resource_insights(
    profile: &ResourceProfile,
    analysis: &ResourceGapAnalysis,
) -> Vec<String> {
    let mut insights = vec![format!(
        "{} meets {:.0}% of the skills required by their role and assignments.",
        profile.name,
        analysis.readiness_score * 100.0
    )];

    if !analysis.role_gaps.is_empty() {
        let role = profile.role.as_deref().unwrap_or("their role");
        insights.push(format!(
            "{} skill(s) expected for {} are missing or below the expected level.",
            analysis.role_gaps.len(),
            role
        ));
    }

    if !analysis.project_gaps.is_empty() {
        let skills: Vec<&str> = analysis
            .project_gaps
            .iter()
            .take(MAX_NAMED_SKILLS)
            .map(|g| g.skill_name.as_str())
            .collect();
        insights.push(format!(
            "Current project assignments need {}.",
            skills.join(", ")
        ));
    }

    let in_demand: Vec<&str> = analysis
        .strengths
        .iter()
        .filter(|s| s.in_demand)
        .take(MAX_NAMED_SKILLS)
        .map(|s| s.skill_name.as_str())
        .collect();
    if !in_demand.is_empty() {
        insights.push(format!(
            "Strong, in-demand expertise in {}.",
            in_demand.join(", ")
        ));
    }

    insights
}

/// Narrative recommendations for a single resource.
pub(crate) fn resource_recommendations(analysis: &ResourceGapAnalysis) -> Vec<Recommendation> {
    build_resource_recommendations(analysis)
}

fn names(gaps: &[&GapEntry]) -> Vec<String> {
    gaps.iter().map(|g| g.skill_name.clone()).collect()
}

fn quoted_names(gaps: &[&GapEntry]) -> String {
    let shown: Vec<&str> = gaps
        .iter()
        .take(MAX_NAMED_SKILLS)
        .map(|g| g.skill_name.as_str())
        .collect();
    let rest = gaps.len().saturating_sub(MAX_NAMED_SKILLS);
    if rest > 0 {
        format!("{}, {} more", shown.join(", "), rest)
    } else {
        shown.join(", ")
    }
}
