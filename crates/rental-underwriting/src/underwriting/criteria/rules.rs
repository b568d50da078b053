use super::CriterionKey;
use crate::underwriting::domain::{BuyingBoxCriteria, FinancialMetrics, PropertyFinancialInput};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Bound {
    AtLeast,
    AtMost,
}

impl Bound {
    fn admits(self, observed: f64, threshold: f64) -> bool {
        match self {
            Bound::AtLeast => observed >= threshold,
            Bound::AtMost => observed <= threshold,
        }
    }
}

type ThresholdFn = fn(&BuyingBoxCriteria) -> Option<f64>;
type ObservedFn = fn(&PropertyFinancialInput, Option<&FinancialMetrics>) -> Option<f64>;

/// One buying-box rule: where its threshold lives, where the compared value lives,
/// which side of the threshold passes, and what to say when it does not.
pub(crate) struct CriterionRule {
    pub(crate) key: CriterionKey,
    pub(crate) bound: Bound,
    pub(crate) threshold: ThresholdFn,
    pub(crate) observed: ObservedFn,
    pub(crate) failure_reason: &'static str,
}

impl CriterionRule {
    /// `None` when either side of the comparison is unavailable.
    pub(crate) fn evaluate(
        &self,
        criteria: &BuyingBoxCriteria,
        property: &PropertyFinancialInput,
        metrics: Option<&FinancialMetrics>,
    ) -> Option<bool> {
        let threshold = (self.threshold)(criteria)?;
        let observed = (self.observed)(property, metrics)?;
        Some(self.bound.admits(observed, threshold))
    }
}

/// Evaluation order is the order of this table.
pub(crate) const RULES: [CriterionRule; 6] = [
    CriterionRule {
        key: CriterionKey::CapRate,
        bound: Bound::AtLeast,
        threshold: |criteria| criteria.min_cap_rate,
        observed: |_, metrics| metrics.and_then(|m| m.cap_rate_percent),
        failure_reason: "Cap rate below minimum",
    },
    CriterionRule {
        key: CriterionKey::CashOnCash,
        bound: Bound::AtLeast,
        threshold: |criteria| criteria.min_cash_on_cash,
        observed: |_, metrics| metrics.and_then(|m| m.cash_on_cash_return_percent),
        failure_reason: "Cash-on-cash return below minimum",
    },
    CriterionRule {
        key: CriterionKey::PurchasePrice,
        bound: Bound::AtMost,
        threshold: |criteria| criteria.max_purchase_price,
        observed: |property, _| Some(property.purchase_price),
        failure_reason: "Purchase price above maximum",
    },
    CriterionRule {
        key: CriterionKey::RentToValue,
        bound: Bound::AtLeast,
        threshold: |criteria| criteria.min_rent_to_value,
        observed: |_, metrics| metrics.and_then(|m| m.rent_to_value_ratio_percent),
        failure_reason: "Rent-to-value ratio below minimum",
    },
    CriterionRule {
        key: CriterionKey::MinYearBuilt,
        bound: Bound::AtLeast,
        threshold: |criteria| criteria.min_year_built.map(f64::from),
        observed: |property, _| property.year_built.map(f64::from),
        failure_reason: "Property too old",
    },
    CriterionRule {
        key: CriterionKey::MaxYearBuilt,
        bound: Bound::AtMost,
        threshold: |criteria| criteria.max_year_built.map(f64::from),
        observed: |property, _| property.year_built.map(f64::from),
        failure_reason: "Property too new",
    },
];
