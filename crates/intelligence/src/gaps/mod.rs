//! Gap calculator: classifies coverage/demand mismatches.
//!
//! Everything here is pure and deterministic. The calculator never touches
//! storage, so the same three inputs always produce the same [`GapAnalysis`].

mod category;

use std::collections::HashMap;

use crate::thresholds::GapThresholds;
use crate::types::{
    GapAnalysis, GapEntry, GapSeverity, GapType, MarketTrend, SkillCoverage, SkillDemand,
};

/// Compute a gap analysis with the default thresholds.
pub fn compute_gaps(
    coverage: &[SkillCoverage],
    demand: &[SkillDemand],
    trends: &[MarketTrend],
) -> GapAnalysis {
    compute_gaps_with(coverage, demand, trends, &GapThresholds::default())
}

/// Compute a gap analysis with explicit thresholds.
pub fn compute_gaps_with(
    coverage: &[SkillCoverage],
    demand: &[SkillDemand],
    trends: &[MarketTrend],
    thresholds: &GapThresholds,
) -> GapAnalysis {
    let coverage_by_id: HashMap<i64, &SkillCoverage> =
        coverage.iter().map(|c| (c.skill_id, c)).collect();
    let demand_by_id: HashMap<i64, &SkillDemand> =
        demand.iter().map(|d| (d.skill_id, d)).collect();

    let immediate_gaps = demand
        .iter()
        .filter_map(|d| classify_demand(d, coverage_by_id.get(&d.skill_id).copied(), thresholds))
        .collect();

    let emerging_gaps = emerging_gaps(coverage, trends, thresholds);

    let oversupply = coverage
        .iter()
        .filter_map(|c| classify_supply(c, demand_by_id.get(&c.skill_id).copied(), thresholds))
        .collect();

    let category_gap_scores = category::score_categories(coverage, demand, thresholds);
    let overall_gap_score = category::overall_score(&category_gap_scores);

    GapAnalysis {
        immediate_gaps,
        emerging_gaps,
        oversupply,
        category_gap_scores,
        overall_gap_score,
    }
}

/// First matching rule wins: missing, low coverage, low proficiency.
fn classify_demand(
    demand: &SkillDemand,
    coverage: Option<&SkillCoverage>,
    t: &GapThresholds,
) -> Option<GapEntry> {
    let Some(coverage) = coverage else {
        return Some(
            GapEntry::new(
                &demand.skill_name,
                &demand.category,
                GapSeverity::Critical,
                GapType::Missing,
            )
            .with_demand(demand),
        );
    };

    let (severity, gap_type) = if coverage.coverage_percentage < t.low_coverage_max
        && demand.demand_percentage > t.low_coverage_min_demand
    {
        (GapSeverity::High, GapType::LowCoverage)
    } else if coverage.avg_proficiency < t.low_proficiency_max
        && demand.avg_importance > t.low_proficiency_min_importance
    {
        (GapSeverity::Medium, GapType::LowProficiency)
    } else {
        return None;
    };

    Some(
        GapEntry::new(&demand.skill_name, &demand.category, severity, gap_type)
            .with_demand(demand)
            .with_coverage(coverage),
    )
}

/// Compare the strongest market trends against current coverage.
fn emerging_gaps(
    coverage: &[SkillCoverage],
    trends: &[MarketTrend],
    t: &GapThresholds,
) -> Vec<GapEntry> {
    let coverage_by_name: HashMap<String, &SkillCoverage> = coverage
        .iter()
        .map(|c| (c.name.to_lowercase(), c))
        .collect();

    let mut ranked: Vec<&MarketTrend> = trends.iter().collect();
    ranked.sort_by(|a, b| b.demand_score.total_cmp(&a.demand_score));

    ranked
        .into_iter()
        .take(t.trend_window)
        .filter_map(|trend| {
            match coverage_by_name.get(&trend.skill_name.to_lowercase()) {
                None if trend.demand_score > t.trend_missing_min_score => {
                    let severity = if trend.demand_score > t.trend_high_score {
                        GapSeverity::High
                    } else {
                        GapSeverity::Medium
                    };
                    Some(
                        GapEntry::new(
                            &trend.skill_name,
                            &trend.category,
                            severity,
                            GapType::MarketTrend,
                        )
                        .with_trend(trend),
                    )
                }
                Some(c)
                    if c.coverage_percentage < t.trend_low_coverage_max
                        && trend.demand_score > t.trend_low_coverage_min_score =>
                {
                    Some(
                        GapEntry::new(
                            &trend.skill_name,
                            &trend.category,
                            GapSeverity::Medium,
                            GapType::LowCoverageTrend,
                        )
                        .with_trend(trend)
                        .with_coverage(c),
                    )
                }
                _ => None,
            }
        })
        .collect()
}

/// Flag skills held far more widely than projects need them.
fn classify_supply(
    coverage: &SkillCoverage,
    demand: Option<&SkillDemand>,
    t: &GapThresholds,
) -> Option<GapEntry> {
    match demand {
        None if coverage.coverage_percentage > t.oversupply_min_coverage => {
            let severity = if coverage.coverage_percentage > t.oversupply_high_coverage {
                GapSeverity::High
            } else {
                GapSeverity::Medium
            };
            Some(
                GapEntry::new(&coverage.name, &coverage.category, severity, GapType::Oversupply)
                    .with_coverage(coverage),
            )
        }
        Some(d)
            if coverage.coverage_percentage > t.oversupply_saturated_coverage
                && d.demand_percentage < t.oversupply_max_demand =>
        {
            Some(
                GapEntry::new(
                    &coverage.name,
                    &coverage.category,
                    GapSeverity::Medium,
                    GapType::Oversupply,
                )
                .with_coverage(coverage)
                .with_demand(d),
            )
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn cov(id: i64, name: &str, pct: f64, prof: f64) -> SkillCoverage {
        SkillCoverage {
            skill_id: id,
            name: name.into(),
            category: "Technical".into(),
            resource_count: 1,
            coverage_percentage: pct,
            avg_proficiency: prof,
            certified_count: 0,
            certification_percentage: 0.0,
        }
    }

    fn dem(id: i64, name: &str, pct: f64, importance: f64) -> SkillDemand {
        SkillDemand {
            skill_id: id,
            skill_name: name.into(),
            category: "Technical".into(),
            project_count: 1,
            demand_percentage: pct,
            avg_importance: importance,
        }
    }

    fn trend(name: &str, score: f64) -> MarketTrend {
        MarketTrend {
            skill_name: name.into(),
            category: "Technical".into(),
            demand_score: score,
            growth_rate: 12,
        }
    }

    #[test]
    fn uncovered_demand_is_critical_missing() {
        let analysis = compute_gaps(&[], &[dem(1, "Rust", 50.0, 4.0)], &[]);
        assert_eq!(analysis.immediate_gaps.len(), 1);
        let gap = &analysis.immediate_gaps[0];
        assert_eq!(gap.skill_name, "Rust");
        assert_eq!(gap.gap_severity, GapSeverity::Critical);
        assert_eq!(gap.gap_type, GapType::Missing);
        assert!(analysis.category_gap_scores["Technical"].missing_category);
        assert_eq!(analysis.overall_gap_score, 1.0);
    }

    #[test]
    fn thin_coverage_of_popular_skill_is_high() {
        let analysis = compute_gaps(
            &[cov(1, "React", 10.0, 4.0)],
            &[dem(1, "React", 40.0, 3.0)],
            &[],
        );
        assert_eq!(analysis.immediate_gaps.len(), 1);
        assert_eq!(analysis.immediate_gaps[0].gap_severity, GapSeverity::High);
        assert_eq!(analysis.immediate_gaps[0].gap_type, GapType::LowCoverage);
        assert_eq!(analysis.immediate_gaps[0].coverage_percentage, Some(10.0));
    }

    #[test]
    fn low_coverage_outranks_low_proficiency() {
        // Both rule 2 and rule 3 conditions hold; only rule 2 fires.
        let analysis = compute_gaps(
            &[cov(1, "Kafka", 5.0, 1.0)],
            &[dem(1, "Kafka", 80.0, 5.0)],
            &[],
        );
        assert_eq!(analysis.immediate_gaps.len(), 1);
        assert_eq!(analysis.immediate_gaps[0].gap_type, GapType::LowCoverage);
    }

    #[test]
    fn weak_holders_of_important_skill_is_medium() {
        let analysis = compute_gaps(
            &[cov(1, "SQL", 50.0, 2.5)],
            &[dem(1, "SQL", 40.0, 4.0)],
            &[],
        );
        assert_eq!(analysis.immediate_gaps[0].gap_severity, GapSeverity::Medium);
        assert_eq!(analysis.immediate_gaps[0].gap_type, GapType::LowProficiency);
    }

    #[test]
    fn healthy_skill_produces_no_gap() {
        let analysis = compute_gaps(
            &[cov(1, "SQL", 50.0, 4.0)],
            &[dem(1, "SQL", 40.0, 4.0)],
            &[],
        );
        assert!(analysis.immediate_gaps.is_empty());
    }

    #[test]
    fn undemanded_widespread_skill_is_oversupply() {
        let analysis = compute_gaps(&[cov(1, "Cobol", 80.0, 4.0)], &[], &[]);
        assert_eq!(analysis.oversupply.len(), 1);
        assert_eq!(analysis.oversupply[0].gap_severity, GapSeverity::High);
        assert_eq!(analysis.oversupply[0].gap_type, GapType::Oversupply);
        assert!(analysis.category_gap_scores["Technical"].oversupply);
        assert_eq!(analysis.overall_gap_score, 0.0);
    }

    #[test]
    fn moderate_undemanded_skill_is_medium_oversupply() {
        let analysis = compute_gaps(&[cov(1, "Perl", 45.0, 3.0)], &[], &[]);
        assert_eq!(analysis.oversupply[0].gap_severity, GapSeverity::Medium);
    }

    #[test]
    fn saturated_but_lightly_demanded_skill_is_oversupply() {
        let analysis = compute_gaps(
            &[cov(1, "Excel", 85.0, 4.0)],
            &[dem(1, "Excel", 10.0, 2.0)],
            &[],
        );
        assert_eq!(analysis.oversupply.len(), 1);
        assert_eq!(analysis.oversupply[0].gap_severity, GapSeverity::Medium);
        assert_eq!(analysis.oversupply[0].demand_percentage, Some(10.0));
    }

    #[test]
    fn uncovered_hot_trend_is_emerging_gap() {
        let analysis = compute_gaps(
            &[],
            &[],
            &[trend("LLM Ops", 9.0), trend("Prompting", 8.0), trend("Fax", 3.0)],
        );
        assert_eq!(analysis.emerging_gaps.len(), 2);
        assert_eq!(analysis.emerging_gaps[0].skill_name, "LLM Ops");
        assert_eq!(analysis.emerging_gaps[0].gap_severity, GapSeverity::High);
        assert_eq!(analysis.emerging_gaps[1].gap_severity, GapSeverity::Medium);
        assert_eq!(analysis.emerging_gaps[0].gap_type, GapType::MarketTrend);
    }

    #[test]
    fn trend_matching_is_case_insensitive() {
        let analysis = compute_gaps(&[cov(1, "rust", 10.0, 3.0)], &[], &[trend("Rust", 8.8)]);
        assert_eq!(analysis.emerging_gaps.len(), 1);
        assert_eq!(analysis.emerging_gaps[0].gap_type, GapType::LowCoverageTrend);
        assert_eq!(analysis.emerging_gaps[0].gap_severity, GapSeverity::Medium);
    }

    #[test]
    fn only_top_trends_are_inspected() {
        let mut trends: Vec<MarketTrend> =
            (0..10).map(|i| trend(&format!("covered-{i}"), 9.5)).collect();
        trends.push(trend("Uncovered", 7.9));
        let coverage: Vec<SkillCoverage> = (0..10)
            .map(|i| cov(i, &format!("covered-{i}"), 50.0, 4.0))
            .collect();
        let analysis = compute_gaps(&coverage, &[], &trends);
        assert!(analysis.emerging_gaps.is_empty());
    }

    #[test]
    fn custom_thresholds_change_classification() {
        let thresholds = GapThresholds {
            low_coverage_max: 5.0,
            ..GapThresholds::default()
        };
        let analysis = compute_gaps_with(
            &[cov(1, "React", 10.0, 4.0)],
            &[dem(1, "React", 40.0, 3.0)],
            &[],
            &thresholds,
        );
        assert!(analysis.immediate_gaps.is_empty());
    }

    fn arb_coverage() -> impl Strategy<Value = Vec<SkillCoverage>> {
        prop::collection::vec(
            (0i64..20, 0.0f64..=100.0, 0.0f64..=5.0, 0usize..4),
            0..15,
        )
        .prop_map(|rows| {
            rows.into_iter()
                .map(|(id, pct, prof, cat)| SkillCoverage {
                    category: format!("cat-{cat}"),
                    ..cov(id, &format!("s{id}"), pct, prof)
                })
                .collect()
        })
    }

    fn arb_demand() -> impl Strategy<Value = Vec<SkillDemand>> {
        prop::collection::vec(
            (0i64..20, 0.0f64..=100.0, 0.0f64..=5.0, 0usize..4),
            0..15,
        )
        .prop_map(|rows| {
            rows.into_iter()
                .map(|(id, pct, imp, cat)| SkillDemand {
                    category: format!("cat-{cat}"),
                    ..dem(id, &format!("s{id}"), pct, imp)
                })
                .collect()
        })
    }

    fn arb_trends() -> impl Strategy<Value = Vec<MarketTrend>> {
        prop::collection::vec((0i64..30, 0.0f64..=10.0), 0..20).prop_map(|rows| {
            rows.into_iter()
                .map(|(id, score)| trend(&format!("S{id}"), score))
                .collect()
        })
    }

    proptest! {
        /// Property: every score stays within [0, 1].
        #[test]
        fn scores_are_bounded(coverage in arb_coverage(), demand in arb_demand()) {
            let analysis = compute_gaps(&coverage, &demand, &[]);
            for score in analysis.category_gap_scores.values() {
                prop_assert!((0.0..=1.0).contains(&score.gap_score));
            }
            prop_assert!((0.0..=1.0).contains(&analysis.overall_gap_score));
        }

        /// Property: each demanded skill yields at most one immediate gap.
        #[test]
        fn at_most_one_immediate_gap_per_demand_row(
            coverage in arb_coverage(),
            demand in arb_demand(),
        ) {
            let analysis = compute_gaps(&coverage, &demand, &[]);
            prop_assert!(analysis.immediate_gaps.len() <= demand.len());
        }

        /// Property: the calculator is pure.
        #[test]
        fn calculator_is_deterministic(
            coverage in arb_coverage(),
            demand in arb_demand(),
            trends in arb_trends(),
        ) {
            let first = compute_gaps(&coverage, &demand, &trends);
            let second = compute_gaps(&coverage, &demand, &trends);
            prop_assert_eq!(first, second);
        }

        /// Property: only oversupplied categories means an overall score of zero.
        #[test]
        fn oversupply_only_yields_zero_overall(coverage in arb_coverage()) {
            let analysis = compute_gaps(&coverage, &[], &[]);
            prop_assert!(analysis.category_gap_scores.values().all(|s| s.oversupply));
            prop_assert_eq!(analysis.overall_gap_score, 0.0);
        }
    }
}
