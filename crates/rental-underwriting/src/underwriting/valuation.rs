use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValuationSource {
    Zillow,
    Redfin,
    Rentimate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValuationKind {
    MarketValue,
    RentalEstimate,
}

/// Third-party estimate of a property's market value or achievable rent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyValuation {
    pub source: ValuationSource,
    #[serde(rename = "valuation_type")]
    pub kind: ValuationKind,
    pub value: f64,
    pub valuation_date: NaiveDate,
}

impl PropertyValuation {
    pub fn is_market_value(&self) -> bool {
        self.kind == ValuationKind::MarketValue
    }

    pub fn is_rental_estimate(&self) -> bool {
        self.kind == ValuationKind::RentalEstimate
    }

    pub fn validate(&self) -> Result<(), ValuationError> {
        if !self.value.is_finite() || self.value <= 0.0 {
            return Err(ValuationError::NonPositiveValue(self.value));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValuationError {
    #[error("valuation value must be greater than zero (got {0})")]
    NonPositiveValue(f64),
}

/// Most recent estimate of each kind across all sources.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValuationSummary {
    pub latest_market_value: Option<PropertyValuation>,
    pub latest_rental_estimate: Option<PropertyValuation>,
}

impl ValuationSummary {
    pub fn from_valuations(valuations: &[PropertyValuation]) -> Self {
        let latest = |kind: ValuationKind| {
            valuations
                .iter()
                .filter(|valuation| valuation.kind == kind)
                .fold(None::<&PropertyValuation>, |best, candidate| match best {
                    Some(current) if current.valuation_date >= candidate.valuation_date => {
                        Some(current)
                    }
                    _ => Some(candidate),
                })
                .cloned()
        };

        Self {
            latest_market_value: latest(ValuationKind::MarketValue),
            latest_rental_estimate: latest(ValuationKind::RentalEstimate),
        }
    }

    /// Market value less the purchase price; positive means bought below market.
    pub fn equity_at_purchase(&self, purchase_price: f64) -> Option<f64> {
        self.latest_market_value
            .as_ref()
            .map(|valuation| valuation.value - purchase_price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valuation(
        source: ValuationSource,
        kind: ValuationKind,
        value: f64,
        day: u32,
    ) -> PropertyValuation {
        PropertyValuation {
            source,
            kind,
            value,
            valuation_date: NaiveDate::from_ymd_opt(2025, 3, day).expect("valid date"),
        }
    }

    #[test]
    fn summary_picks_latest_per_kind() {
        let valuations = vec![
            valuation(ValuationSource::Zillow, ValuationKind::MarketValue, 262_000.0, 2),
            valuation(ValuationSource::Redfin, ValuationKind::MarketValue, 258_500.0, 14),
            valuation(ValuationSource::Rentimate, ValuationKind::RentalEstimate, 2_150.0, 9),
        ];

        let summary = ValuationSummary::from_valuations(&valuations);

        let market = summary.latest_market_value.as_ref().expect("market value");
        assert_eq!(market.source, ValuationSource::Redfin);
        assert!(market.is_market_value());
        let rent = summary.latest_rental_estimate.as_ref().expect("rent estimate");
        assert!(rent.is_rental_estimate());
        assert_eq!(summary.equity_at_purchase(250_000.0), Some(8_500.0));
    }

    #[test]
    fn same_day_estimates_keep_the_first_seen() {
        let valuations = vec![
            valuation(ValuationSource::Zillow, ValuationKind::MarketValue, 240_000.0, 5),
            valuation(ValuationSource::Redfin, ValuationKind::MarketValue, 245_000.0, 5),
        ];

        let summary = ValuationSummary::from_valuations(&valuations);
        assert_eq!(
            summary.latest_market_value.map(|valuation| valuation.source),
            Some(ValuationSource::Zillow)
        );
    }

    #[test]
    fn empty_history_has_no_equity_estimate() {
        let summary = ValuationSummary::from_valuations(&[]);
        assert!(summary.latest_rental_estimate.is_none());
        assert_eq!(summary.equity_at_purchase(100_000.0), None);
    }

    #[test]
    fn kind_travels_as_valuation_type() {
        let payload = r#"{
            "source": "Rentimate",
            "valuation_type": "rental_estimate",
            "value": 2150,
            "valuation_date": "2025-03-09"
        }"#;

        let parsed: PropertyValuation = serde_json::from_str(payload).expect("parses");
        assert!(parsed.is_rental_estimate());

        let encoded = serde_json::to_value(&parsed).expect("serializes");
        assert_eq!(encoded["valuation_type"], "rental_estimate");
        assert!(encoded.get("kind").is_none());

        let legacy = payload.replace("valuation_type", "kind");
        assert!(serde_json::from_str::<PropertyValuation>(&legacy).is_err());
    }

    #[test]
    fn validate_rejects_non_positive_values() {
        let zero = valuation(ValuationSource::Zillow, ValuationKind::MarketValue, 0.0, 1);
        assert_eq!(zero.validate(), Err(ValuationError::NonPositiveValue(0.0)));
    }
}
