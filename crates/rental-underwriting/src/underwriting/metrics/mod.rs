mod financing;
mod income;

pub use financing::{cash_to_close, loan_amount, monthly_mortgage_payment};
pub use income::{
    cap_rate_percent, cash_on_cash_return_percent, gross_rent_multiplier, net_operating_income,
    rent_to_value_ratio_percent,
};

use super::domain::{FinancialMetrics, PropertyFinancialInput};
use serde::Serialize;

/// Stateless calculator deriving the full metrics record for a property.
#[derive(Debug, Default, Clone, Copy)]
pub struct MetricsCalculator;

impl MetricsCalculator {
    pub fn new() -> Self {
        Self
    }

    /// Derive every metric, failing as soon as one computation cannot proceed.
    pub fn compute(
        &self,
        input: &PropertyFinancialInput,
    ) -> Result<FinancialMetrics, MetricsError> {
        let missing = input.missing_metric_inputs();
        if !missing.is_empty() {
            return Err(MetricsError::MissingInputs { missing });
        }

        let monthly_payment = monthly_mortgage_payment(input)?;
        let noi = net_operating_income(input)?;
        let cap_rate = cap_rate_percent(noi, input.purchase_price);
        let cash_to_close = cash_to_close(input);
        let cash_on_cash = cash_on_cash_return_percent(noi, monthly_payment, cash_to_close)?;

        Ok(FinancialMetrics {
            monthly_mortgage_payment: Some(monthly_payment),
            net_operating_income: Some(noi),
            cap_rate_percent: Some(cap_rate),
            cash_to_close: Some(cash_to_close),
            cash_on_cash_return_percent: Some(cash_on_cash),
            rent_to_value_ratio_percent: Some(rent_to_value_ratio_percent(input)),
            gross_rent_multiplier: Some(gross_rent_multiplier(input)),
            is_current: true,
        })
    }

    /// Recompute when there is no record or the record is stale.
    ///
    /// Returns the metrics to use and whether they were freshly computed. A current
    /// record is handed back untouched.
    pub fn recalculate_if_needed(
        &self,
        input: &PropertyFinancialInput,
        existing: Option<FinancialMetrics>,
    ) -> Result<(FinancialMetrics, bool), MetricsError> {
        match existing {
            Some(metrics) if metrics.is_current => Ok((metrics, false)),
            _ => self.compute(input).map(|metrics| (metrics, true)),
        }
    }
}

/// Computation that rejected the property's inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricsComputation {
    InputCheck,
    MonthlyMortgagePayment,
    NetOperatingIncome,
    CashOnCashReturn,
}

/// Reasons a metrics record cannot be derived. None of these are transient.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MetricsError {
    #[error("property is missing inputs required for metrics: {}", .missing.join(", "))]
    MissingInputs { missing: Vec<&'static str> },
    #[error(
        "monthly mortgage payment needs a positive interest rate and loan term \
         (interest_rate={interest_rate}, loan_term={loan_term})"
    )]
    InvalidFinancingTerms { interest_rate: f64, loan_term: f64 },
    #[error("net operating income needs a positive intended rent")]
    MissingRent,
    #[error("cash-on-cash return needs a positive cash to close (got {cash_to_close})")]
    ZeroCashInvestment { cash_to_close: f64 },
}

impl MetricsError {
    pub fn computation(&self) -> MetricsComputation {
        match self {
            MetricsError::MissingInputs { .. } => MetricsComputation::InputCheck,
            MetricsError::InvalidFinancingTerms { .. } => {
                MetricsComputation::MonthlyMortgagePayment
            }
            MetricsError::MissingRent => MetricsComputation::NetOperatingIncome,
            MetricsError::ZeroCashInvestment { .. } => MetricsComputation::CashOnCashReturn,
        }
    }
}
