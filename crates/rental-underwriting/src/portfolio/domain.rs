use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::underwriting::{
    BuyingBoxCriteria, FinancialMetrics, FinancingTerms, OperatingAssumptions, OperatingExpenses,
    PropertyFinancialInput, PropertyValuation, ValuationSummary,
};

/// Identifier wrapper for tracked properties.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PropertyId(pub String);

/// Identifier wrapper for saved buying boxes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CriteriaId(pub String);

/// Metrics as last persisted for a property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredMetrics {
    pub metrics: FinancialMetrics,
    pub calculated_at: DateTime<Utc>,
}

/// A tracked property with its latest metrics and valuation history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyEntry {
    pub id: PropertyId,
    pub address: String,
    pub input: PropertyFinancialInput,
    pub metrics: Option<StoredMetrics>,
    pub valuations: Vec<PropertyValuation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriteriaEntry {
    pub id: CriteriaId,
    pub criteria: BuyingBoxCriteria,
}

/// Payload for registering a property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProperty {
    pub address: String,
    #[serde(flatten)]
    pub input: PropertyFinancialInput,
}

/// Partial update; omitted fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyUpdate {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub purchase_price: Option<f64>,
    #[serde(default)]
    pub intended_monthly_rent: Option<f64>,
    #[serde(default)]
    pub operating_expenses: Option<OperatingExpenses>,
    #[serde(default)]
    pub financing_terms: Option<FinancingTerms>,
    #[serde(default)]
    pub operating_assumptions: Option<OperatingAssumptions>,
    #[serde(default)]
    pub year_built: Option<i32>,
}

impl PropertyUpdate {
    /// Apply onto `input`, reporting whether any metric-bearing field changed.
    pub(crate) fn apply(self, address: &mut String, input: &mut PropertyFinancialInput) -> bool {
        let before = input.clone();

        if let Some(value) = self.address {
            *address = value;
        }
        if let Some(value) = self.purchase_price {
            input.purchase_price = value;
        }
        if let Some(value) = self.intended_monthly_rent {
            input.intended_monthly_rent = Some(value);
        }
        if let Some(value) = self.operating_expenses {
            input.operating_expenses = Some(value);
        }
        if let Some(value) = self.financing_terms {
            input.financing_terms = Some(value);
        }
        if let Some(value) = self.operating_assumptions {
            input.operating_assumptions = Some(value);
        }
        if let Some(value) = self.year_built {
            input.year_built = Some(value);
        }

        before.purchase_price != input.purchase_price
            || before.intended_monthly_rent != input.intended_monthly_rent
            || before.operating_expenses != input.operating_expenses
            || before.financing_terms != input.financing_terms
            || before.operating_assumptions != input.operating_assumptions
    }
}

/// Metrics response, noting whether this request had to recompute them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsView {
    pub property_id: PropertyId,
    #[serde(flatten)]
    pub metrics: FinancialMetrics,
    pub calculated_at: DateTime<Utc>,
    pub recalculated: bool,
}

/// Valuation history for one property.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValuationsView {
    pub property_id: PropertyId,
    pub valuations: Vec<PropertyValuation>,
    pub summary: ValuationSummary,
    /// Latest market value less the purchase price, once a market value is on record.
    pub equity_at_purchase: Option<f64>,
}
