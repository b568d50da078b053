use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::config::ScreeningConfig;
use crate::portfolio::domain::{CriteriaEntry, CriteriaId, NewProperty, PropertyEntry, PropertyId};
use crate::portfolio::repository::{PortfolioRepository, RepositoryError};
use crate::portfolio::{portfolio_router, PortfolioService};
use crate::underwriting::{
    BuyingBoxCriteria, FinancingTerms, OperatingAssumptions, OperatingExpenses,
    PropertyFinancialInput,
};

pub(super) fn ranch_input() -> PropertyFinancialInput {
    PropertyFinancialInput {
        purchase_price: 250_000.0,
        intended_monthly_rent: Some(2_100.0),
        operating_expenses: Some(OperatingExpenses {
            insurance: Some(1_200.0),
            property_taxes: Some(3_600.0),
            hoa: Some(0.0),
            utilities: None,
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

pub(super) fn ranch_house() -> NewProperty {
    NewProperty {
        address: "418 Prairie View Rd".to_string(),
        input: ranch_input(),
    }
}

/// Listing with only a price and build year; metrics cannot be derived.
pub(super) fn bare_listing() -> NewProperty {
    NewProperty {
        address: "77 Quarry St".to_string(),
        input: PropertyFinancialInput {
            purchase_price: 180_000.0,
            year_built: Some(1962),
            ..PropertyFinancialInput::default()
        },
    }
}

pub(super) fn starter_box() -> BuyingBoxCriteria {
    BuyingBoxCriteria {
        max_purchase_price: Some(300_000.0),
        min_cap_rate: Some(5.0),
        min_year_built: Some(1980),
        ..BuyingBoxCriteria::named("Starter rentals")
    }
}

pub(super) fn build_service() -> (PortfolioService<MemoryRepository>, Arc<MemoryRepository>) {
    let repository = Arc::new(MemoryRepository::default());
    let service = PortfolioService::new(repository.clone(), ScreeningConfig::default());
    (service, repository)
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) properties: Arc<Mutex<BTreeMap<PropertyId, PropertyEntry>>>,
    pub(super) criteria: Arc<Mutex<Vec<CriteriaEntry>>>,
}

impl PortfolioRepository for MemoryRepository {
    fn insert_property(&self, entry: PropertyEntry) -> Result<PropertyEntry, RepositoryError> {
        let mut guard = self.properties.lock().expect("repository mutex poisoned");
        if guard.contains_key(&entry.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(entry.id.clone(), entry.clone());
        Ok(entry)
    }

    fn modify_property<T, E, F>(&self, id: &PropertyId, change: F) -> Result<T, E>
    where
        F: FnOnce(&mut PropertyEntry) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        let mut guard = self.properties.lock().expect("repository mutex poisoned");
        let stored = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        let mut draft = stored.clone();
        let outcome = change(&mut draft)?;
        *stored = draft;
        Ok(outcome)
    }

    fn fetch_property(&self, id: &PropertyId) -> Result<Option<PropertyEntry>, RepositoryError> {
        let guard = self.properties.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn insert_criteria(&self, entry: CriteriaEntry) -> Result<CriteriaEntry, RepositoryError> {
        let mut guard = self.criteria.lock().expect("repository mutex poisoned");
        if guard.iter().any(|stored| stored.id == entry.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.push(entry.clone());
        Ok(entry)
    }

    fn update_criteria(&self, entry: CriteriaEntry) -> Result<(), RepositoryError> {
        let mut guard = self.criteria.lock().expect("repository mutex poisoned");
        match guard.iter_mut().find(|stored| stored.id == entry.id) {
            Some(stored) => {
                *stored = entry;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch_criteria(&self, id: &CriteriaId) -> Result<Option<CriteriaEntry>, RepositoryError> {
        let guard = self.criteria.lock().expect("repository mutex poisoned");
        Ok(guard.iter().find(|stored| &stored.id == id).cloned())
    }

    fn list_criteria(&self) -> Result<Vec<CriteriaEntry>, RepositoryError> {
        Ok(self.criteria.lock().expect("repository mutex poisoned").clone())
    }
}

pub(super) struct UnavailableRepository;

impl PortfolioRepository for UnavailableRepository {
    fn insert_property(&self, _entry: PropertyEntry) -> Result<PropertyEntry, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn modify_property<T, E, F>(&self, _id: &PropertyId, _change: F) -> Result<T, E>
    where
        F: FnOnce(&mut PropertyEntry) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        Err(RepositoryError::Unavailable("database offline".to_string()).into())
    }

    fn fetch_property(&self, _id: &PropertyId) -> Result<Option<PropertyEntry>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn insert_criteria(&self, _entry: CriteriaEntry) -> Result<CriteriaEntry, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update_criteria(&self, _entry: CriteriaEntry) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch_criteria(&self, _id: &CriteriaId) -> Result<Option<CriteriaEntry>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list_criteria(&self) -> Result<Vec<CriteriaEntry>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

type PendingEdit = Box<dyn FnOnce(&mut PropertyEntry) + Send>;

/// Memory store that lands one queued edit right after the next property read,
/// standing in for a second request writing between a read and a write.
#[derive(Default)]
pub(super) struct InterleavingRepository {
    pub(super) inner: MemoryRepository,
    pending: Mutex<Option<PendingEdit>>,
}

impl InterleavingRepository {
    pub(super) fn after_next_read(&self, edit: impl FnOnce(&mut PropertyEntry) + Send + 'static) {
        *self.pending.lock().expect("pending mutex poisoned") = Some(Box::new(edit));
    }

    pub(super) fn stored(&self, id: &PropertyId) -> PropertyEntry {
        self.inner
            .properties
            .lock()
            .expect("repository mutex poisoned")
            .get(id)
            .cloned()
            .expect("property stored")
    }
}

impl PortfolioRepository for InterleavingRepository {
    fn insert_property(&self, entry: PropertyEntry) -> Result<PropertyEntry, RepositoryError> {
        self.inner.insert_property(entry)
    }

    fn fetch_property(&self, id: &PropertyId) -> Result<Option<PropertyEntry>, RepositoryError> {
        let fetched = self.inner.fetch_property(id)?;
        let edit = self.pending.lock().expect("pending mutex poisoned").take();
        if let Some(edit) = edit {
            let mut guard = self.inner.properties.lock().expect("repository mutex poisoned");
            if let Some(stored) = guard.get_mut(id) {
                edit(stored);
            }
        }
        Ok(fetched)
    }

    fn modify_property<T, E, F>(&self, id: &PropertyId, change: F) -> Result<T, E>
    where
        F: FnOnce(&mut PropertyEntry) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        self.inner.modify_property(id, change)
    }

    fn insert_criteria(&self, entry: CriteriaEntry) -> Result<CriteriaEntry, RepositoryError> {
        self.inner.insert_criteria(entry)
    }

    fn update_criteria(&self, entry: CriteriaEntry) -> Result<(), RepositoryError> {
        self.inner.update_criteria(entry)
    }

    fn fetch_criteria(&self, id: &CriteriaId) -> Result<Option<CriteriaEntry>, RepositoryError> {
        self.inner.fetch_criteria(id)
    }

    fn list_criteria(&self) -> Result<Vec<CriteriaEntry>, RepositoryError> {
        self.inner.list_criteria()
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn router_with_service(service: PortfolioService<MemoryRepository>) -> axum::Router {
    portfolio_router(Arc::new(service))
}
