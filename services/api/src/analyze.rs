use clap::Args;
use rental_underwriting::config::ScreeningConfig;
use rental_underwriting::error::AppError;
use rental_underwriting::portfolio::PortfolioServiceError;
use rental_underwriting::underwriting::{
    screen_property, BuyingBoxCriteria, FinancialMetrics, MetricsCalculator, MetricsComputation,
    PropertyCsvImporter, PropertyFinancialInput, ScreeningResult,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub(crate) struct AnalyzeArgs {
    /// JSON file holding the property's financial inputs
    #[arg(long)]
    pub(crate) property: PathBuf,
    /// Optional JSON file holding an array of buying-box criteria
    #[arg(long)]
    pub(crate) criteria: Option<PathBuf>,
    /// Score a criteria set must reach for the property to qualify (0-100)
    #[arg(long, value_parser = parse_match_score)]
    pub(crate) min_match_score: Option<f64>,
    /// Print the analysis as JSON instead of a text summary
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ScreenArgs {
    /// CSV export with one property per row
    #[arg(long)]
    pub(crate) properties: PathBuf,
    /// JSON file holding an array of buying-box criteria
    #[arg(long)]
    pub(crate) criteria: PathBuf,
    /// Score a criteria set must reach for a property to qualify (0-100)
    #[arg(long, value_parser = parse_match_score)]
    pub(crate) min_match_score: Option<f64>,
}

/// Metrics plus screening results for a single property.
#[derive(Debug, Serialize)]
pub(crate) struct PropertyAnalysis {
    pub(crate) metrics: Option<FinancialMetrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) metrics_unavailable: Option<MetricsUnavailable>,
    pub(crate) screening: Vec<ScreeningResult>,
}

#[derive(Debug, Serialize)]
pub(crate) struct MetricsUnavailable {
    pub(crate) computation: MetricsComputation,
    pub(crate) reason: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AnalysisRequest {
    pub(crate) property: PropertyFinancialInput,
    #[serde(default)]
    pub(crate) criteria: Vec<BuyingBoxCriteria>,
}

/// Derive metrics and screen against the given criteria. Metric failures are
/// reported in the analysis rather than aborting it; invalid criteria abort.
pub(crate) fn analyze_property(
    request: AnalysisRequest,
    policy: &ScreeningConfig,
) -> Result<PropertyAnalysis, AppError> {
    for criteria in &request.criteria {
        criteria
            .validate()
            .map_err(PortfolioServiceError::InvalidCriteria)?;
    }

    let (metrics, metrics_unavailable) = match MetricsCalculator::new().compute(&request.property)
    {
        Ok(metrics) => (Some(metrics), None),
        Err(error) => (
            None,
            Some(MetricsUnavailable {
                computation: error.computation(),
                reason: error.to_string(),
            }),
        ),
    };

    let screening = screen_property(
        &request.property,
        metrics.as_ref(),
        &request.criteria,
        policy,
    );

    Ok(PropertyAnalysis {
        metrics,
        metrics_unavailable,
        screening,
    })
}

pub(crate) fn run_analyze(args: AnalyzeArgs) -> Result<(), AppError> {
    let AnalyzeArgs {
        property,
        criteria,
        min_match_score,
        json,
    } = args;

    let property: PropertyFinancialInput = read_json(&property)?;
    let criteria = match criteria {
        Some(path) => read_json(&path)?,
        None => Vec::new(),
    };
    let policy = screening_policy(min_match_score);

    let analysis = analyze_property(AnalysisRequest { property, criteria }, &policy)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
        return Ok(());
    }

    println!("Property analysis");
    render_metrics(&analysis);
    render_screening(&analysis.screening, "  ");
    Ok(())
}

pub(crate) fn run_screen(args: ScreenArgs) -> Result<(), AppError> {
    let ScreenArgs {
        properties,
        criteria,
        min_match_score,
    } = args;

    let records = PropertyCsvImporter::from_path(&properties)?;
    let criteria: Vec<BuyingBoxCriteria> = read_json(&criteria)?;
    let policy = screening_policy(min_match_score);

    println!(
        "Screening {} properties from {} against {} criteria sets (qualify at {:.0}%)",
        records.len(),
        properties.display(),
        criteria.iter().filter(|set| set.is_active).count(),
        policy.minimum_match_score
    );

    let mut qualifying = 0usize;
    for record in records {
        let analysis = analyze_property(
            AnalysisRequest {
                property: record.input,
                criteria: criteria.clone(),
            },
            &policy,
        )?;

        if analysis.screening.iter().any(|result| result.qualifies) {
            qualifying += 1;
        }

        println!("\n{}", record.address);
        match (&analysis.metrics, &analysis.metrics_unavailable) {
            (Some(metrics), _) => println!(
                "  cap rate {} | cash-on-cash {} | RTV {}",
                percent(metrics.cap_rate_percent),
                percent(metrics.cash_on_cash_return_percent),
                percent(metrics.rent_to_value_ratio_percent)
            ),
            (None, Some(issue)) => println!("  metrics unavailable: {}", issue.reason),
            (None, None) => {}
        }
        render_screening(&analysis.screening, "  ");
    }

    println!("\n{qualifying} properties qualified for at least one buying box");
    Ok(())
}

fn parse_match_score(raw: &str) -> Result<f64, String> {
    ScreeningConfig::from_raw(raw)
        .map(|policy| policy.minimum_match_score)
        .map_err(|_| format!("expected a number between 0 and 100, got '{raw}'"))
}

fn screening_policy(min_match_score: Option<f64>) -> ScreeningConfig {
    min_match_score.map_or_else(ScreeningConfig::default, |score| ScreeningConfig {
        minimum_match_score: score,
    })
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, AppError> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

fn render_metrics(analysis: &PropertyAnalysis) {
    let Some(metrics) = &analysis.metrics else {
        if let Some(issue) = &analysis.metrics_unavailable {
            println!("- Metrics unavailable ({:?}): {}", issue.computation, issue.reason);
        }
        return;
    };

    println!(
        "- Monthly mortgage payment: {}",
        currency(metrics.monthly_mortgage_payment)
    );
    println!(
        "- Net operating income: {}",
        currency(metrics.net_operating_income)
    );
    println!("- Cap rate: {}", percent(metrics.cap_rate_percent));
    println!("- Cash to close: {}", currency(metrics.cash_to_close));
    println!(
        "- Cash-on-cash return: {}",
        percent(metrics.cash_on_cash_return_percent)
    );
    println!(
        "- Rent-to-value ratio: {}",
        percent(metrics.rent_to_value_ratio_percent)
    );
    match metrics.gross_rent_multiplier {
        Some(grm) => println!("- Gross rent multiplier: {grm:.2}"),
        None => println!("- Gross rent multiplier: n/a"),
    }
}

fn render_screening(results: &[ScreeningResult], indent: &str) {
    if results.is_empty() {
        println!("{indent}No active buying boxes to screen against");
        return;
    }

    for result in results {
        let verdict = if result.qualifies { "QUALIFIES" } else { "misses" };
        println!(
            "{indent}{} -> {verdict} ({:.0}% of {} evaluated criteria)",
            result.criteria_name, result.comparison.score, result.comparison.evaluated_count
        );
        for reason in &result.comparison.failure_reasons {
            println!("{indent}  - {reason}");
        }
    }
}

fn currency(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |amount| format!("${amount:.2}"))
}

fn percent(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |rate| format!("{rate:.2}%"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rental_underwriting::underwriting::{
        FinancingTerms, OperatingAssumptions, OperatingExpenses,
    };

    fn duplex() -> PropertyFinancialInput {
        PropertyFinancialInput {
            purchase_price: 250_000.0,
            intended_monthly_rent: Some(2_100.0),
            operating_expenses: Some(OperatingExpenses {
                insurance: Some(1_200.0),
                property_taxes: Some(3_600.0),
                ..OperatingExpenses::default()
            }),
            financing_terms: Some(FinancingTerms {
                interest_rate: Some(7.5),
                loan_term: Some(30.0),
                down_payment_percent: Some(20.0),
                closing_costs: Some(5_000.0),
            }),
            operating_assumptions: Some(OperatingAssumptions {
                vacancy_rate: Some(0.05),
                maintenance_pct: Some(0.10),
                management_pct: Some(0.08),
            }),
            year_built: Some(2000),
        }
    }

    #[test]
    fn analysis_reports_metrics_and_screening() {
        let request = AnalysisRequest {
            property: duplex(),
            criteria: vec![BuyingBoxCriteria {
                max_purchase_price: Some(300_000.0),
                ..BuyingBoxCriteria::named("Under 300k")
            }],
        };

        let analysis =
            analyze_property(request, &ScreeningConfig::default()).expect("analysis builds");

        let metrics = analysis.metrics.expect("metrics derived");
        assert_eq!(metrics.cash_to_close, Some(55_000.0));
        assert!(analysis.metrics_unavailable.is_none());
        assert_eq!(analysis.screening.len(), 1);
        assert!(analysis.screening[0].qualifies);
    }

    #[test]
    fn analysis_keeps_screening_when_metrics_fail() {
        let request = AnalysisRequest {
            property: PropertyFinancialInput {
                intended_monthly_rent: None,
                ..duplex()
            },
            criteria: vec![BuyingBoxCriteria {
                min_cap_rate: Some(6.0),
                min_year_built: Some(1990),
                ..BuyingBoxCriteria::named("Newer builds")
            }],
        };

        let analysis =
            analyze_property(request, &ScreeningConfig::default()).expect("analysis builds");

        assert!(analysis.metrics.is_none());
        let issue = analysis.metrics_unavailable.expect("issue recorded");
        assert_eq!(issue.computation, MetricsComputation::InputCheck);
        assert_eq!(analysis.screening[0].comparison.evaluated_count, 1);
        assert!(analysis.screening[0].qualifies);
    }

    #[test]
    fn analysis_rejects_invalid_criteria() {
        let request = AnalysisRequest {
            property: duplex(),
            criteria: vec![BuyingBoxCriteria::named("")],
        };

        let error = analyze_property(request, &ScreeningConfig::default())
            .expect_err("criteria rejected");
        assert!(error.to_string().contains("criteria name"));
    }

    #[test]
    fn match_scores_outside_the_scale_are_rejected() {
        assert_eq!(parse_match_score(" 60 "), Ok(60.0));
        assert_eq!(parse_match_score("0"), Ok(0.0));
        for raw in ["140", "-5", "NaN", "inf", "most"] {
            let error = parse_match_score(raw).expect_err("rejected");
            assert!(error.contains(raw), "{error}");
        }
    }

    #[test]
    fn screening_policy_defaults_without_a_score() {
        assert_eq!(screening_policy(Some(60.0)).minimum_match_score, 60.0);
        assert_eq!(screening_policy(None), ScreeningConfig::default());
    }
}
