//! Category-level gap scoring.

use std::collections::BTreeMap;

use crate::thresholds::GapThresholds;
use crate::types::{CategoryGapScore, SkillCoverage, SkillDemand};

#[derive(Debug, Default)]
struct Totals {
    count: usize,
    primary: f64,
    secondary: f64,
}

impl Totals {
    fn add(&mut self, primary: f64, secondary: f64) {
        self.count += 1;
        self.primary += primary;
        self.secondary += secondary;
    }

    fn means(&self) -> (f64, f64) {
        let n = self.count.max(1) as f64;
        (self.primary / n, self.secondary / n)
    }
}

/// Score every category present in coverage or demand.
pub(crate) fn score_categories(
    coverage: &[SkillCoverage],
    demand: &[SkillDemand],
    thresholds: &GapThresholds,
) -> BTreeMap<String, CategoryGapScore> {
    // primary = coverage %, secondary = proficiency
    let mut supply: BTreeMap<&str, Totals> = BTreeMap::new();
    for c in coverage {
        supply
            .entry(c.category.as_str())
            .or_default()
            .add(c.coverage_percentage, c.avg_proficiency);
    }

    // primary = demand %, secondary = importance
    let mut need: BTreeMap<&str, Totals> = BTreeMap::new();
    for d in demand {
        need.entry(d.category.as_str())
            .or_default()
            .add(d.demand_percentage, d.avg_importance);
    }

    let mut scores = BTreeMap::new();
    for category in supply.keys().chain(need.keys()) {
        if scores.contains_key(*category) {
            continue;
        }
        let score = match (supply.get(category), need.get(category)) {
            (Some(s), Some(n)) => {
                let (avg_coverage, avg_proficiency) = s.means();
                let (avg_demand, avg_importance) = n.means();
                let coverage_term = (avg_demand - avg_coverage).max(0.0) / 100.0;
                let proficiency_term = (avg_importance / 5.0 - avg_proficiency / 5.0).max(0.0);
                let raw = thresholds.demand_weight * coverage_term
                    + thresholds.proficiency_weight * proficiency_term;
                CategoryGapScore {
                    gap_score: bounded(raw),
                    required_skills: n.count,
                    available_skills: s.count,
                    avg_demand: Some(avg_demand),
                    avg_coverage: Some(avg_coverage),
                    avg_importance: Some(avg_importance),
                    avg_proficiency: Some(avg_proficiency),
                    ..CategoryGapScore::default()
                }
            }
            (None, Some(n)) => {
                let (avg_demand, avg_importance) = n.means();
                CategoryGapScore {
                    gap_score: 1.0,
                    required_skills: n.count,
                    missing_category: true,
                    avg_demand: Some(avg_demand),
                    avg_importance: Some(avg_importance),
                    ..CategoryGapScore::default()
                }
            }
            (Some(s), None) => {
                let (avg_coverage, avg_proficiency) = s.means();
                CategoryGapScore {
                    gap_score: 0.0,
                    available_skills: s.count,
                    oversupply: true,
                    avg_coverage: Some(avg_coverage),
                    avg_proficiency: Some(avg_proficiency),
                    ..CategoryGapScore::default()
                }
            }
            (None, None) => continue,
        };
        scores.insert((*category).to_string(), score);
    }
    scores
}

/// Unweighted mean over categories that are not oversupplied.
pub(crate) fn overall_score(scores: &BTreeMap<String, CategoryGapScore>) -> f64 {
    let counted: Vec<f64> = scores
        .values()
        .filter(|s| !s.oversupply)
        .map(|s| s.gap_score)
        .collect();
    if counted.is_empty() {
        return 0.0;
    }
    bounded(counted.iter().sum::<f64>() / counted.len() as f64)
}

fn bounded(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
