use serde::{Deserialize, Serialize};

/// Annual fixed operating expenses. Absent entries count as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OperatingExpenses {
    #[serde(default)]
    pub insurance: Option<f64>,
    #[serde(default)]
    pub property_taxes: Option<f64>,
    #[serde(default)]
    pub hoa: Option<f64>,
    #[serde(default)]
    pub utilities: Option<f64>,
}

impl OperatingExpenses {
    pub fn annual_total(&self) -> f64 {
        [self.insurance, self.property_taxes, self.hoa, self.utilities]
            .into_iter()
            .map(|amount| amount.unwrap_or(0.0))
            .sum()
    }
}

/// Loan terms for a fixed-rate, fully amortizing mortgage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancingTerms {
    /// Annual rate in percent, e.g. `7.5`.
    #[serde(default)]
    pub interest_rate: Option<f64>,
    /// Term in years.
    #[serde(default)]
    pub loan_term: Option<f64>,
    /// Share of the purchase price paid up front, 0 through 100.
    #[serde(default)]
    pub down_payment_percent: Option<f64>,
    /// Flat closing cost amount.
    #[serde(default)]
    pub closing_costs: Option<f64>,
}

impl FinancingTerms {
    pub fn interest_rate(&self) -> f64 {
        self.interest_rate.unwrap_or(0.0)
    }

    pub fn loan_term(&self) -> f64 {
        self.loan_term.unwrap_or(0.0)
    }

    pub fn down_payment_percent(&self) -> f64 {
        self.down_payment_percent.unwrap_or(0.0)
    }

    pub fn closing_costs(&self) -> f64 {
        self.closing_costs.unwrap_or(0.0)
    }
}

/// Rent-proportional deductions, expressed as fractions of annual rent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OperatingAssumptions {
    #[serde(default)]
    pub vacancy_rate: Option<f64>,
    #[serde(default)]
    pub maintenance_pct: Option<f64>,
    #[serde(default)]
    pub management_pct: Option<f64>,
}

impl OperatingAssumptions {
    pub fn combined_rate(&self) -> f64 {
        self.vacancy_rate.unwrap_or(0.0)
            + self.maintenance_pct.unwrap_or(0.0)
            + self.management_pct.unwrap_or(0.0)
    }
}

/// Raw financial inputs for one property snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyFinancialInput {
    pub purchase_price: f64,
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

impl PropertyFinancialInput {
    /// Names of the inputs that keep a full metrics record from being derived.
    pub fn missing_metric_inputs(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if !self.purchase_price.is_finite() || self.purchase_price <= 0.0 {
            missing.push("purchase_price");
        }
        if !self.intended_monthly_rent.is_some_and(|rent| rent > 0.0) {
            missing.push("intended_monthly_rent");
        }
        if self.operating_expenses.is_none() {
            missing.push("operating_expenses");
        }
        if self.financing_terms.is_none() {
            missing.push("financing_terms");
        }
        if self.operating_assumptions.is_none() {
            missing.push("operating_assumptions");
        }
        missing
    }

    pub fn has_required_fields_for_metrics(&self) -> bool {
        self.missing_metric_inputs().is_empty()
    }

    /// Monthly rent times twelve, when rent is present and positive.
    pub fn annual_rent(&self) -> Option<f64> {
        self.intended_monthly_rent
            .filter(|rent| *rent > 0.0)
            .map(|rent| rent * 12.0)
    }

    pub fn expenses(&self) -> OperatingExpenses {
        self.operating_expenses.unwrap_or_default()
    }

    pub fn financing(&self) -> FinancingTerms {
        self.financing_terms.unwrap_or_default()
    }

    pub fn assumptions(&self) -> OperatingAssumptions {
        self.operating_assumptions.unwrap_or_default()
    }
}

/// Derived investment metrics for one property snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialMetrics {
    pub monthly_mortgage_payment: Option<f64>,
    pub net_operating_income: Option<f64>,
    pub cap_rate_percent: Option<f64>,
    pub cash_to_close: Option<f64>,
    pub cash_on_cash_return_percent: Option<f64>,
    pub rent_to_value_ratio_percent: Option<f64>,
    pub gross_rent_multiplier: Option<f64>,
    pub is_current: bool,
}

impl FinancialMetrics {
    pub fn is_complete(&self) -> bool {
        self.net_operating_income.is_some()
            && self.cap_rate_percent.is_some()
            && self.cash_on_cash_return_percent.is_some()
            && self.rent_to_value_ratio_percent.is_some()
            && self.gross_rent_multiplier.is_some()
    }

    /// Flag the record as out of date after its property's inputs changed.
    pub fn mark_stale(&mut self) {
        self.is_current = false;
    }
}

/// A named, reusable set of investment screening thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuyingBoxCriteria {
    pub name: String,
    #[serde(default)]
    pub min_cap_rate: Option<f64>,
    #[serde(default)]
    pub min_cash_on_cash: Option<f64>,
    #[serde(default)]
    pub max_purchase_price: Option<f64>,
    #[serde(default)]
    pub min_rent_to_value: Option<f64>,
    #[serde(default)]
    pub min_year_built: Option<i32>,
    #[serde(default)]
    pub max_year_built: Option<i32>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

pub const MAX_CRITERIA_NAME_LEN: usize = 100;

impl BuyingBoxCriteria {
    /// A criteria set with no thresholds; it matches every property.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            min_cap_rate: None,
            min_cash_on_cash: None,
            max_purchase_price: None,
            min_rent_to_value: None,
            min_year_built: None,
            max_year_built: None,
            is_active: true,
        }
    }

    pub fn activate(&mut self) {
        self.is_active = true;
    }

    pub fn deactivate(&mut self) {
        self.is_active = false;
    }

    pub fn validate(&self) -> Result<(), CriteriaValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(CriteriaValidationError::EmptyName);
        }
        if name.chars().count() > MAX_CRITERIA_NAME_LEN {
            return Err(CriteriaValidationError::NameTooLong {
                max: MAX_CRITERIA_NAME_LEN,
            });
        }

        if let (Some(min), Some(max)) = (self.min_year_built, self.max_year_built) {
            if min > max {
                return Err(CriteriaValidationError::InvertedYearRange { min, max });
            }
        }

        let thresholds = [
            ("min_cap_rate", self.min_cap_rate),
            ("min_cash_on_cash", self.min_cash_on_cash),
            ("max_purchase_price", self.max_purchase_price),
            ("min_rent_to_value", self.min_rent_to_value),
        ];
        for (field, value) in thresholds {
            if let Some(value) = value {
                if !value.is_finite() {
                    return Err(CriteriaValidationError::NonFiniteThreshold { field });
                }
                if field == "max_purchase_price" && value < 0.0 {
                    return Err(CriteriaValidationError::NegativeThreshold { field, value });
                }
            }
        }

        Ok(())
    }
}

/// Rejected buying-box definitions.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CriteriaValidationError {
    #[error("criteria name must not be empty")]
    EmptyName,
    #[error("criteria name must be at most {max} characters")]
    NameTooLong { max: usize },
    #[error("min_year_built {min} is later than max_year_built {max}")]
    InvertedYearRange { min: i32, max: i32 },
    #[error("{field} must not be negative (got {value})")]
    NegativeThreshold { field: &'static str, value: f64 },
    #[error("{field} must be a finite number")]
    NonFiniteThreshold { field: &'static str },
}
