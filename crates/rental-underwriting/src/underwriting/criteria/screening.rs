use super::{CriteriaEvaluator, PropertyComparison};
use crate::config::ScreeningConfig;
use crate::underwriting::domain::{BuyingBoxCriteria, FinancialMetrics, PropertyFinancialInput};
use serde::Serialize;

/// A criteria set's verdict on one property during a screening pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScreeningResult {
    pub criteria_name: String,
    pub comparison: PropertyComparison,
    pub qualifies: bool,
}

/// Evaluate a property against every active criteria set, in the order given.
pub fn screen_property(
    property: &PropertyFinancialInput,
    metrics: Option<&FinancialMetrics>,
    criteria_sets: &[BuyingBoxCriteria],
    policy: &ScreeningConfig,
) -> Vec<ScreeningResult> {
    let evaluator = CriteriaEvaluator::new();
    criteria_sets
        .iter()
        .filter(|criteria| criteria.is_active)
        .map(|criteria| {
            let comparison = evaluator.compare(property, criteria, metrics);
            ScreeningResult {
                criteria_name: criteria.name.clone(),
                qualifies: comparison.score >= policy.minimum_match_score,
                comparison,
            }
        })
        .collect()
}

/// A property offered for ranking against a single criteria set.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a, K> {
    pub key: K,
    pub property: &'a PropertyFinancialInput,
    pub metrics: Option<&'a FinancialMetrics>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedCandidate<K> {
    pub key: K,
    pub comparison: PropertyComparison,
}

/// Compare each candidate against `criteria`, best score first. Ties keep input order.
pub fn rank_candidates<K: Clone>(
    criteria: &BuyingBoxCriteria,
    candidates: &[Candidate<'_, K>],
) -> Vec<RankedCandidate<K>> {
    let evaluator = CriteriaEvaluator::new();
    let mut ranked: Vec<RankedCandidate<K>> = candidates
        .iter()
        .map(|candidate| RankedCandidate {
            key: candidate.key.clone(),
            comparison: evaluator.compare(candidate.property, criteria, candidate.metrics),
        })
        .collect();

    ranked.sort_by(|left, right| right.comparison.score.total_cmp(&left.comparison.score));
    ranked
}
