//! Underwriting engine for rental property purchases.
//!
//! [`MetricsCalculator`] turns a property's raw financial inputs into mortgage,
//! income and return metrics. [`CriteriaEvaluator`] scores a property and its
//! metrics against a user's buying box. Both are pure and hold no state, so they
//! can be shared freely across request handlers.

pub mod criteria;
pub mod domain;
pub mod import;
pub mod metrics;
pub mod valuation;

pub use criteria::{
    rank_candidates, screen_property, Candidate, CriteriaEvaluator, CriterionKey,
    PropertyComparison, RankedCandidate, ScreeningResult,
};
pub use domain::{
    BuyingBoxCriteria, CriteriaValidationError, FinancialMetrics, FinancingTerms,
    OperatingAssumptions, OperatingExpenses, PropertyFinancialInput,
};
pub use import::{ImportedProperty, PropertyCsvImporter, PropertyImportError};
pub use metrics::{MetricsCalculator, MetricsComputation, MetricsError};
pub use valuation::{
    PropertyValuation, ValuationError, ValuationKind, ValuationSource, ValuationSummary,
};
