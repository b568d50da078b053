use super::MetricsError;
use crate::underwriting::domain::PropertyFinancialInput;

const MONTHS_PER_YEAR: f64 = 12.0;

/// Principal left to finance after the down payment.
pub fn loan_amount(input: &PropertyFinancialInput) -> f64 {
    let down_payment_percent = input.financing().down_payment_percent();
    input.purchase_price * (1.0 - down_payment_percent / 100.0)
}

/// Fixed-rate amortized payment: `L * c * (1 + c)^n / ((1 + c)^n - 1)`.
///
/// A non-positive loan amount is a cash purchase and pays nothing. Otherwise the
/// rate and term must both be positive.
pub fn monthly_mortgage_payment(input: &PropertyFinancialInput) -> Result<f64, MetricsError> {
    let loan = loan_amount(input);
    if loan <= 0.0 {
        return Ok(0.0);
    }

    let terms = input.financing();
    let interest_rate = terms.interest_rate();
    let loan_term = terms.loan_term();
    if interest_rate <= 0.0 || loan_term <= 0.0 {
        return Err(MetricsError::InvalidFinancingTerms {
            interest_rate,
            loan_term,
        });
    }

    let monthly_rate = (interest_rate / 100.0) / MONTHS_PER_YEAR;
    let payments = loan_term * MONTHS_PER_YEAR;
    if monthly_rate == 0.0 {
        return Ok(loan / payments);
    }

    let growth = (1.0 + monthly_rate).powf(payments);
    // Rates too small to move `1 + c` off 1.0 amortize straight-line.
    if growth == 1.0 {
        return Ok(loan / payments);
    }

    Ok(loan * monthly_rate * growth / (growth - 1.0))
}

/// Down payment plus flat closing costs.
pub fn cash_to_close(input: &PropertyFinancialInput) -> f64 {
    let terms = input.financing();
    input.purchase_price * (terms.down_payment_percent() / 100.0) + terms.closing_costs()
}
