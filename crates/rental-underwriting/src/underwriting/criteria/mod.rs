mod rules;
mod screening;

pub use screening::{rank_candidates, screen_property, Candidate, RankedCandidate, ScreeningResult};

use super::domain::{BuyingBoxCriteria, FinancialMetrics, PropertyFinancialInput};
use rules::RULES;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Stable identifier for each buying-box rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriterionKey {
    CapRate,
    CashOnCash,
    PurchasePrice,
    RentToValue,
    MinYearBuilt,
    MaxYearBuilt,
}

impl CriterionKey {
    pub fn as_str(self) -> &'static str {
        match self {
            CriterionKey::CapRate => "cap_rate",
            CriterionKey::CashOnCash => "cash_on_cash",
            CriterionKey::PurchasePrice => "purchase_price",
            CriterionKey::RentToValue => "rent_to_value",
            CriterionKey::MinYearBuilt => "min_year_built",
            CriterionKey::MaxYearBuilt => "max_year_built",
        }
    }
}

/// Outcome of checking one property against one criteria set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyComparison {
    /// Only criteria with both a threshold and a comparable value appear here.
    pub matches: BTreeMap<CriterionKey, bool>,
    pub failure_reasons: Vec<String>,
    /// Share of evaluated criteria that passed, 0 through 100.
    pub score: f64,
    pub evaluated_count: usize,
}

impl PropertyComparison {
    pub fn met_count(&self) -> usize {
        self.matches.values().filter(|passed| **passed).count()
    }

    pub fn is_full_match(&self) -> bool {
        self.failure_reasons.is_empty()
    }
}

/// Pure evaluator applying buying-box thresholds to a property and its metrics.
#[derive(Debug, Default, Clone, Copy)]
pub struct CriteriaEvaluator;

impl CriteriaEvaluator {
    pub fn new() -> Self {
        Self
    }

    /// Never fails; missing thresholds or values shrink the set of evaluated rules.
    pub fn compare(
        &self,
        property: &PropertyFinancialInput,
        criteria: &BuyingBoxCriteria,
        metrics: Option<&FinancialMetrics>,
    ) -> PropertyComparison {
        let mut matches = BTreeMap::new();
        let mut failure_reasons = Vec::new();
        let mut met = 0usize;

        for rule in RULES.iter() {
            let Some(passed) = rule.evaluate(criteria, property, metrics) else {
                continue;
            };

            matches.insert(rule.key, passed);
            if passed {
                met += 1;
            } else {
                failure_reasons.push(rule.failure_reason.to_string());
            }
        }

        let evaluated_count = matches.len();
        let score = if evaluated_count == 0 {
            100.0
        } else {
            met as f64 / evaluated_count as f64 * 100.0
        };

        PropertyComparison {
            matches,
            failure_reasons,
            score,
            evaluated_count,
        }
    }
}
