use super::MetricsError;
use crate::underwriting::domain::PropertyFinancialInput;

/// Annual rent less fixed expenses and rent-proportional deductions.
pub fn net_operating_income(input: &PropertyFinancialInput) -> Result<f64, MetricsError> {
    let annual_rent = input.annual_rent().ok_or(MetricsError::MissingRent)?;

    let fixed_expenses = input.expenses().annual_total();
    let variable_expenses = annual_rent * input.assumptions().combined_rate();

    Ok(annual_rent - fixed_expenses - variable_expenses)
}

pub fn cap_rate_percent(noi: f64, purchase_price: f64) -> f64 {
    if purchase_price <= 0.0 {
        return 0.0;
    }
    noi / purchase_price * 100.0
}

/// Annual cash flow after debt service over the cash invested at closing.
pub fn cash_on_cash_return_percent(
    noi: f64,
    monthly_payment: f64,
    cash_to_close: f64,
) -> Result<f64, MetricsError> {
    if cash_to_close <= 0.0 {
        return Err(MetricsError::ZeroCashInvestment { cash_to_close });
    }

    let annual_cash_flow = noi - monthly_payment * 12.0;
    Ok(annual_cash_flow / cash_to_close * 100.0)
}

pub fn rent_to_value_ratio_percent(input: &PropertyFinancialInput) -> f64 {
    match input.annual_rent() {
        Some(annual_rent) if input.purchase_price > 0.0 => {
            annual_rent / input.purchase_price * 100.0
        }
        _ => 0.0,
    }
}

pub fn gross_rent_multiplier(input: &PropertyFinancialInput) -> f64 {
    match input.annual_rent() {
        Some(annual_rent) if annual_rent > 0.0 => input.purchase_price / annual_rent,
        _ => 0.0,
    }
}
