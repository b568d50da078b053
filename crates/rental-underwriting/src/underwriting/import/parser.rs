use super::{ImportedProperty, PropertyImportError};
use crate::underwriting::domain::{
    FinancingTerms, OperatingAssumptions, OperatingExpenses, PropertyFinancialInput,
};
use serde::{Deserialize, Deserializer};
use std::io::Read;

const EXPENSE_COLUMNS: [&str; 4] = ["insurance", "property_taxes", "hoa", "utilities"];
const FINANCING_COLUMNS: [&str; 4] = [
    "interest_rate",
    "loan_term",
    "down_payment_percent",
    "closing_costs",
];
const ASSUMPTION_COLUMNS: [&str; 3] = ["vacancy_rate", "maintenance_pct", "management_pct"];

/// Which optional input groups the export carries at all.
struct ColumnGroups {
    expenses: bool,
    financing: bool,
    assumptions: bool,
}

impl ColumnGroups {
    fn from_headers(headers: &csv::StringRecord) -> Self {
        let has_any = |columns: &[&str]| {
            headers
                .iter()
                .any(|header| columns.contains(&header.trim().to_ascii_lowercase().as_str()))
        };

        Self {
            expenses: has_any(&EXPENSE_COLUMNS),
            financing: has_any(&FINANCING_COLUMNS),
            assumptions: has_any(&ASSUMPTION_COLUMNS),
        }
    }
}

pub(crate) fn parse_records<R: Read>(
    reader: R,
) -> Result<Vec<ImportedProperty>, PropertyImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let lowered: csv::StringRecord = headers
        .iter()
        .map(|header| header.trim().trim_start_matches('\u{feff}').to_ascii_lowercase())
        .collect();
    csv_reader.set_headers(lowered.clone());
    let groups = ColumnGroups::from_headers(&lowered);

    let mut records = Vec::new();
    for (index, row) in csv_reader.deserialize::<PropertyRow>().enumerate() {
        // Header is line 1.
        let line = index + 2;
        records.push(row?.into_record(line, &groups)?);
    }

    Ok(records)
}

#[derive(Debug, Deserialize)]
struct PropertyRow {
    #[serde(default)]
    address: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    purchase_price: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    intended_rent: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    year_built: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    insurance: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    property_taxes: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    hoa: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    utilities: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    interest_rate: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    loan_term: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    down_payment_percent: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    closing_costs: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    vacancy_rate: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    maintenance_pct: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    management_pct: Option<String>,
}

impl PropertyRow {
    fn into_record(
        self,
        line: usize,
        groups: &ColumnGroups,
    ) -> Result<ImportedProperty, PropertyImportError> {
        let amount = |column: &'static str, raw: &Option<String>| parse_amount(line, column, raw);

        let purchase_price = amount("purchase_price", &self.purchase_price)?
            .ok_or(PropertyImportError::MissingPurchasePrice { line })?;

        let year_built = match self.year_built.as_deref() {
            Some(raw) => Some(parse_year(raw).ok_or_else(|| {
                PropertyImportError::InvalidValue {
                    line,
                    column: "year_built",
                    value: raw.to_string(),
                }
            })?),
            None => None,
        };

        let operating_expenses = if groups.expenses {
            Some(OperatingExpenses {
                insurance: amount("insurance", &self.insurance)?,
                property_taxes: amount("property_taxes", &self.property_taxes)?,
                hoa: amount("hoa", &self.hoa)?,
                utilities: amount("utilities", &self.utilities)?,
            })
        } else {
            None
        };

        let financing_terms = if groups.financing {
            Some(FinancingTerms {
                interest_rate: amount("interest_rate", &self.interest_rate)?,
                loan_term: amount("loan_term", &self.loan_term)?,
                down_payment_percent: amount("down_payment_percent", &self.down_payment_percent)?,
                closing_costs: amount("closing_costs", &self.closing_costs)?,
            })
        } else {
            None
        };

        let operating_assumptions = if groups.assumptions {
            Some(OperatingAssumptions {
                vacancy_rate: amount("vacancy_rate", &self.vacancy_rate)?,
                maintenance_pct: amount("maintenance_pct", &self.maintenance_pct)?,
                management_pct: amount("management_pct", &self.management_pct)?,
            })
        } else {
            None
        };

        Ok(ImportedProperty {
            address: self.address,
            input: PropertyFinancialInput {
                purchase_price,
                intended_monthly_rent: amount("intended_rent", &self.intended_rent)?,
                operating_expenses,
                financing_terms,
                operating_assumptions,
                year_built,
            },
        })
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn parse_amount(
    line: usize,
    column: &'static str,
    raw: &Option<String>,
) -> Result<Option<f64>, PropertyImportError> {
    let Some(raw) = raw.as_deref() else {
        return Ok(None);
    };

    normalize_amount(raw)
        .map(Some)
        .ok_or_else(|| PropertyImportError::InvalidValue {
            line,
            column,
            value: raw.to_string(),
        })
}

/// Accepts exports formatted for people: `$250,000`, `7.5%`.
fn normalize_amount(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|ch| !matches!(ch, '$' | ',' | '%' | ' '))
        .collect();
    cleaned.parse::<f64>().ok().filter(|value| value.is_finite())
}

fn parse_year(raw: &str) -> Option<i32> {
    raw.trim().parse::<i32>().ok()
}

#[cfg(test)]
pub(crate) fn normalize_amount_for_tests(raw: &str) -> Option<f64> {
    normalize_amount(raw)
}
