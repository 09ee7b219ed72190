//! Prompt construction for the text provider.

use crate::repository::ResourceProfile;
use crate::resource::ResourceGapAnalysis;
use crate::types::{GapAnalysis, GapEntry, MarketTrend, SkillCoverage, SkillDemand};

/// Rows per dataset section; keeps prompts bounded regardless of org size.
const MAX_SKILL_ROWS: usize = 15;
const MAX_TREND_ROWS: usize = 10;
const MAX_GAP_ROWS: usize = 10;

const RESPONSE_FORMAT: &str = r#"Respond with exactly two sections:

Insights
1. <one observation per line>

Recommendations
1. <short title>: <one or two sentences of concrete action>

Give 3-5 insights and 3-6 recommendations. Do not add any other sections."#;

/// Prompt for an organization or department analysis.
pub(crate) fn organization_prompt(
    coverage: &[SkillCoverage],
    demand: &[SkillDemand],
    trends: &[MarketTrend],
    analysis: &GapAnalysis,
) -> String {
    let mut parts = vec![
        "You are a workforce planning analyst. Review the skills data below and explain the \
         most important skill gaps for this organization."
            .to_string(),
    ];

    let mut top_coverage: Vec<&SkillCoverage> = coverage.iter().collect();
    top_coverage.sort_by(|a, b| b.coverage_percentage.total_cmp(&a.coverage_percentage));
    parts.push(section(
        "Organization skills (coverage %, avg proficiency /5)",
        top_coverage.iter().take(MAX_SKILL_ROWS).map(|c| {
            format!(
                "{} [{}]: {:.0}% coverage, {:.1} proficiency",
                c.name, c.category, c.coverage_percentage, c.avg_proficiency
            )
        }),
    ));

    let mut top_demand: Vec<&SkillDemand> = demand.iter().collect();
    top_demand.sort_by(|a, b| b.demand_percentage.total_cmp(&a.demand_percentage));
    parts.push(section(
        "Project requirements (demand %, avg importance /5)",
        top_demand.iter().take(MAX_SKILL_ROWS).map(|d| {
            format!(
                "{} [{}]: {:.0}% of projects, {:.1} importance",
                d.skill_name, d.category, d.demand_percentage, d.avg_importance
            )
        }),
    ));

    parts.push(section(
        "Market trends (demand score /10, growth %)",
        trends.iter().take(MAX_TREND_ROWS).map(|t| {
            format!(
                "{} [{}]: score {:.1}, growth {}%",
                t.skill_name, t.category, t.demand_score, t.growth_rate
            )
        }),
    ));

    parts.push(format!(
        "Gap analysis\n- Overall gap score: {:.0}%",
        analysis.overall_gap_score * 100.0
    ));
    parts.push(section("Immediate gaps", gap_lines(&analysis.immediate_gaps)));
    parts.push(section("Emerging gaps", gap_lines(&analysis.emerging_gaps)));
    parts.push(section("Oversupply", gap_lines(&analysis.oversupply)));
    parts.push(section(
        "Category gap scores",
        analysis
            .category_gap_scores
            .iter()
            .map(|(category, s)| format!("{}: {:.0}%", category, s.gap_score * 100.0)),
    ));

    parts.push(RESPONSE_FORMAT.to_string());
    parts.join("\n\n")
}

/// Prompt for a single resource's development analysis.
pub(crate) fn resource_prompt(profile: &ResourceProfile, analysis: &ResourceGapAnalysis) -> String {
    let role = profile.role.as_deref().unwrap_or("unspecified role");
    let mut parts = vec![format!(
        "You are a career development advisor. Review the skills of {} ({}) against their role \
         and current project assignments.",
        profile.name, role
    )];

    parts.push(format!(
        "Readiness: {:.0}% of required skills are met",
        analysis.readiness_score * 100.0
    ));
    parts.push(section(
        "Role gaps",
        analysis.role_gaps.iter().take(MAX_GAP_ROWS).map(|g| {
            format!(
                "{} ({}): level {:.1} of {:.1} required",
                g.skill_name, g.gap_severity, g.current_proficiency, g.required_proficiency
            )
        }),
    ));
    parts.push(section(
        "Project gaps",
        analysis.project_gaps.iter().take(MAX_GAP_ROWS).map(|g| {
            format!(
                "{} ({}) for {}: level {:.1} of {:.1} required",
                g.skill_name,
                g.gap_severity,
                g.sources.join(", "),
                g.current_proficiency,
                g.required_proficiency
            )
        }),
    ));
    parts.push(section(
        "Strengths",
        analysis
            .strengths
            .iter()
            .take(MAX_GAP_ROWS)
            .map(|s| format!("{} at level {:.1}", s.skill_name, s.proficiency)),
    ));

    parts.push(RESPONSE_FORMAT.to_string());
    parts.join("\n\n")
}

fn gap_lines(gaps: &[GapEntry]) -> impl Iterator<Item = String> + '_ {
    gaps.iter().take(MAX_GAP_ROWS).map(|g| {
        format!(
            "{} [{}]: {} / {}",
            g.skill_name,
            g.category,
            g.gap_severity,
            g.gap_type.label()
        )
    })
}

fn section(title: &str, lines: impl Iterator<Item = String>) -> String {
    let body: Vec<String> = lines.map(|l| format!("- {}", l)).collect();
    if body.is_empty() {
        format!("{}\n- (none)", title)
    } else {
        format!("{}\n{}", title, body.join("\n"))
    }
}
