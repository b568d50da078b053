use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{Datelike, Utc};
use tracing::{debug, info, warn};

use super::domain::{
    CriteriaEntry, CriteriaId, MetricsView, NewProperty, PropertyEntry, PropertyId,
    PropertyUpdate, StoredMetrics, ValuationsView,
};
use super::repository::{PortfolioRepository, RepositoryError};
use crate::config::ScreeningConfig;
use crate::underwriting::{
    rank_candidates, screen_property, BuyingBoxCriteria, Candidate, CriteriaValidationError,
    FinancialMetrics, MetricsCalculator, MetricsError, PropertyValuation, RankedCandidate,
    ScreeningResult, ValuationError, ValuationSummary,
};

pub const MAX_ADDRESS_LEN: usize = 255;
const EARLIEST_YEAR_BUILT: i32 = 1800;

static PROPERTY_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static CRITERIA_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_property_id() -> PropertyId {
    let id = PROPERTY_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    PropertyId(format!("prop-{id:06}"))
}

fn next_criteria_id() -> CriteriaId {
    let id = CRITERIA_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    CriteriaId(format!("bbc-{id:06}"))
}

/// Service tying the underwriting engine to stored properties and buying boxes.
///
/// Metrics are cached on the property entry. Editing a property's financial inputs
/// marks the cached record stale; the next metrics read recomputes it. Every write
/// to a property goes through [`PortfolioRepository::modify_property`].
pub struct PortfolioService<R> {
    repository: Arc<R>,
    calculator: MetricsCalculator,
    screening: ScreeningConfig,
}

impl<R> PortfolioService<R>
where
    R: PortfolioRepository + 'static,
{
    pub fn new(repository: Arc<R>, screening: ScreeningConfig) -> Self {
        Self {
            repository,
            calculator: MetricsCalculator::new(),
            screening,
        }
    }

    pub fn screening(&self) -> &ScreeningConfig {
        &self.screening
    }

    pub fn create_property(
        &self,
        property: NewProperty,
    ) -> Result<PropertyEntry, PortfolioServiceError> {
        let NewProperty { address, input } = property;
        let address = address.trim().to_string();
        validate_property(&address, input.purchase_price, input.year_built)?;

        let entry = PropertyEntry {
            id: next_property_id(),
            address,
            input,
            metrics: None,
            valuations: Vec::new(),
        };

        let stored = self.repository.insert_property(entry)?;
        info!(property_id = %stored.id.0, "property registered");
        Ok(stored)
    }

    pub fn get_property(&self, id: &PropertyId) -> Result<PropertyEntry, PortfolioServiceError> {
        let entry = self
            .repository
            .fetch_property(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(entry)
    }

    /// Apply a partial update. Cached metrics go stale when financial inputs change.
    pub fn update_property(
        &self,
        id: &PropertyId,
        update: PropertyUpdate,
    ) -> Result<PropertyEntry, PortfolioServiceError> {
        let (entry, financials_changed) = self.repository.modify_property(id, |entry| {
            let financials_changed = update.apply(&mut entry.address, &mut entry.input);
            entry.address = entry.address.trim().to_string();
            validate_property(&entry.address, entry.input.purchase_price, entry.input.year_built)?;

            if financials_changed {
                if let Some(stored) = entry.metrics.as_mut() {
                    stored.metrics.mark_stale();
                }
            }
            Ok::<_, PortfolioServiceError>((entry.clone(), financials_changed))
        })?;

        if financials_changed {
            debug!(property_id = %id.0, "financial inputs changed; metrics marked stale");
        }
        Ok(entry)
    }

    /// Current metrics, recomputed only when missing or stale.
    pub fn metrics(&self, id: &PropertyId) -> Result<MetricsView, PortfolioServiceError> {
        self.current_metrics(id, false).map(|(_, view)| view)
    }

    /// Recompute regardless of the cached record's state.
    pub fn recalculate_metrics(
        &self,
        id: &PropertyId,
    ) -> Result<MetricsView, PortfolioServiceError> {
        self.current_metrics(id, true).map(|(_, view)| view)
    }

    /// The entry together with metrics matching its inputs.
    ///
    /// A current cached record is served without writing. Otherwise the metrics are
    /// derived from the entry as it stands under the repository lock, so they can
    /// never be stored against inputs that have since been edited.
    fn current_metrics(
        &self,
        id: &PropertyId,
        force: bool,
    ) -> Result<(PropertyEntry, MetricsView), PortfolioServiceError> {
        if !force {
            let entry = self.get_property(id)?;
            let cached = entry
                .metrics
                .as_ref()
                .filter(|stored| stored.metrics.is_current)
                .map(|stored| MetricsView {
                    property_id: entry.id.clone(),
                    metrics: stored.metrics.clone(),
                    calculated_at: stored.calculated_at,
                    recalculated: false,
                });
            if let Some(view) = cached {
                return Ok((entry, view));
            }
        }

        let calculator = &self.calculator;
        let outcome = self.repository.modify_property(id, |entry| {
            let existing = entry.metrics.take().filter(|_| !force);
            let previous_timestamp = existing.as_ref().map(|stored| stored.calculated_at);

            let (metrics, recalculated) = calculator
                .recalculate_if_needed(&entry.input, existing.map(|stored| stored.metrics))?;
            let calculated_at = match previous_timestamp {
                Some(timestamp) if !recalculated => timestamp,
                _ => Utc::now(),
            };

            entry.metrics = Some(StoredMetrics {
                metrics: metrics.clone(),
                calculated_at,
            });

            let view = MetricsView {
                property_id: entry.id.clone(),
                metrics,
                calculated_at,
                recalculated,
            };
            Ok::<_, PortfolioServiceError>((entry.clone(), view))
        });

        match &outcome {
            Ok((_, view)) if view.recalculated => {
                debug!(property_id = %id.0, "metrics recalculated");
            }
            Err(PortfolioServiceError::Metrics(error)) => {
                warn!(
                    property_id = %id.0,
                    computation = ?error.computation(),
                    %error,
                    "metrics unavailable"
                );
            }
            _ => {}
        }
        outcome
    }

    /// Entry and metrics for screening. A property whose metrics cannot be derived is
    /// still screened on the thresholds that need no metrics.
    fn screening_snapshot(
        &self,
        id: &PropertyId,
    ) -> Result<(PropertyEntry, Option<FinancialMetrics>), PortfolioServiceError> {
        match self.current_metrics(id, false) {
            Ok((entry, view)) => Ok((entry, Some(view.metrics))),
            Err(PortfolioServiceError::Metrics(error)) => {
                debug!(property_id = %id.0, %error, "screening without metrics");
                Ok((self.get_property(id)?, None))
            }
            Err(other) => Err(other),
        }
    }

    pub fn create_criteria(
        &self,
        criteria: BuyingBoxCriteria,
    ) -> Result<CriteriaEntry, PortfolioServiceError> {
        let mut criteria = criteria;
        criteria.name = criteria.name.trim().to_string();
        criteria.validate()?;

        let stored = self.repository.insert_criteria(CriteriaEntry {
            id: next_criteria_id(),
            criteria,
        })?;
        info!(criteria_id = %stored.id.0, name = %stored.criteria.name, "buying box saved");
        Ok(stored)
    }

    pub fn list_criteria(&self) -> Result<Vec<CriteriaEntry>, PortfolioServiceError> {
        Ok(self.repository.list_criteria()?)
    }

    pub fn set_criteria_active(
        &self,
        id: &CriteriaId,
        active: bool,
    ) -> Result<CriteriaEntry, PortfolioServiceError> {
        let mut entry = self
            .repository
            .fetch_criteria(id)?
            .ok_or(RepositoryError::NotFound)?;

        if active {
            entry.criteria.activate();
        } else {
            entry.criteria.deactivate();
        }

        self.repository.update_criteria(entry.clone())?;
        Ok(entry)
    }

    /// Screen one property against every active buying box.
    pub fn compare_property(
        &self,
        id: &PropertyId,
    ) -> Result<Vec<ScreeningResult>, PortfolioServiceError> {
        let (entry, metrics) = self.screening_snapshot(id)?;

        let criteria_sets: Vec<BuyingBoxCriteria> = self
            .repository
            .list_criteria()?
            .into_iter()
            .map(|stored| stored.criteria)
            .collect();

        Ok(screen_property(
            &entry.input,
            metrics.as_ref(),
            &criteria_sets,
            &self.screening,
        ))
    }

    /// Rank several properties against one buying box, best fit first.
    pub fn rank_properties(
        &self,
        criteria_id: &CriteriaId,
        property_ids: &[PropertyId],
    ) -> Result<Vec<RankedCandidate<PropertyId>>, PortfolioServiceError> {
        let criteria = self
            .repository
            .fetch_criteria(criteria_id)?
            .ok_or(RepositoryError::NotFound)?
            .criteria;

        let mut entries = Vec::with_capacity(property_ids.len());
        for id in property_ids {
            entries.push(self.screening_snapshot(id)?);
        }

        let candidates: Vec<Candidate<'_, PropertyId>> = entries
            .iter()
            .map(|(entry, metrics)| Candidate {
                key: entry.id.clone(),
                property: &entry.input,
                metrics: metrics.as_ref(),
            })
            .collect();

        Ok(rank_candidates(&criteria, &candidates))
    }

    pub fn add_valuation(
        &self,
        id: &PropertyId,
        valuation: PropertyValuation,
    ) -> Result<ValuationSummary, PortfolioServiceError> {
        valuation.validate()?;
        self.repository.modify_property(id, |entry| {
            entry.valuations.push(valuation);
            Ok(ValuationSummary::from_valuations(&entry.valuations))
        })
    }

    /// Valuation history with the latest estimates and the implied equity at purchase.
    pub fn valuations(&self, id: &PropertyId) -> Result<ValuationsView, PortfolioServiceError> {
        let entry = self.get_property(id)?;
        let summary = ValuationSummary::from_valuations(&entry.valuations);
        let equity_at_purchase = summary.equity_at_purchase(entry.input.purchase_price);
        Ok(ValuationsView {
            property_id: entry.id,
            valuations: entry.valuations,
            summary,
            equity_at_purchase,
        })
    }
}

fn validate_property(
    address: &str,
    purchase_price: f64,
    year_built: Option<i32>,
) -> Result<(), PropertyValidationError> {
    if address.is_empty() {
        return Err(PropertyValidationError::EmptyAddress);
    }
    if address.chars().count() > MAX_ADDRESS_LEN {
        return Err(PropertyValidationError::AddressTooLong {
            max: MAX_ADDRESS_LEN,
        });
    }
    if !purchase_price.is_finite() || purchase_price <= 0.0 {
        return Err(PropertyValidationError::NonPositivePurchasePrice(
            purchase_price,
        ));
    }
    if let Some(year) = year_built {
        let latest = Utc::now().year() + 1;
        if !(EARLIEST_YEAR_BUILT..=latest).contains(&year) {
            return Err(PropertyValidationError::YearBuiltOutOfRange {
                year,
                earliest: EARLIEST_YEAR_BUILT,
                latest,
            });
        }
    }
    Ok(())
}

/// Rejected property payloads.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PropertyValidationError {
    #[error("address must not be empty")]
    EmptyAddress,
    #[error("address must be at most {max} characters")]
    AddressTooLong { max: usize },
    #[error("purchase_price must be greater than zero (got {0})")]
    NonPositivePurchasePrice(f64),
    #[error("year_built {year} must fall between {earliest} and {latest}")]
    YearBuiltOutOfRange {
        year: i32,
        earliest: i32,
        latest: i32,
    },
}

/// Error raised by the portfolio service.
#[derive(Debug, thiserror::Error)]
pub enum PortfolioServiceError {
    #[error(transparent)]
    Metrics(#[from] MetricsError),
    #[error(transparent)]
    InvalidProperty(#[from] PropertyValidationError),
    #[error(transparent)]
    InvalidCriteria(#[from] CriteriaValidationError),
    #[error(transparent)]
    InvalidValuation(#[from] ValuationError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
