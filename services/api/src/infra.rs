use metrics_exporter_prometheus::PrometheusHandle;
use rental_underwriting::portfolio::{
    CriteriaEntry, CriteriaId, PortfolioRepository, PropertyEntry, PropertyId, RepositoryError,
};
use std::collections::BTreeMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local store; everything is lost on restart.
#[derive(Default, Clone)]
pub(crate) struct InMemoryPortfolioRepository {
    properties: Arc<Mutex<BTreeMap<PropertyId, PropertyEntry>>>,
    criteria: Arc<Mutex<Vec<CriteriaEntry>>>,
}

impl PortfolioRepository for InMemoryPortfolioRepository {
    fn insert_property(&self, entry: PropertyEntry) -> Result<PropertyEntry, RepositoryError> {
        let mut guard = self.properties.lock().map_err(poisoned)?;
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
        let mut guard = self.properties.lock().map_err(poisoned)?;
        let stored = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        let mut draft = stored.clone();
        let outcome = change(&mut draft)?;
        *stored = draft;
        Ok(outcome)
    }

    fn fetch_property(&self, id: &PropertyId) -> Result<Option<PropertyEntry>, RepositoryError> {
        let guard = self.properties.lock().map_err(poisoned)?;
        Ok(guard.get(id).cloned())
    }

    fn insert_criteria(&self, entry: CriteriaEntry) -> Result<CriteriaEntry, RepositoryError> {
        let mut guard = self.criteria.lock().map_err(poisoned)?;
        if guard.iter().any(|stored| stored.id == entry.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.push(entry.clone());
        Ok(entry)
    }

    fn update_criteria(&self, entry: CriteriaEntry) -> Result<(), RepositoryError> {
        let mut guard = self.criteria.lock().map_err(poisoned)?;
        match guard.iter_mut().find(|stored| stored.id == entry.id) {
            Some(stored) => {
                *stored = entry;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch_criteria(&self, id: &CriteriaId) -> Result<Option<CriteriaEntry>, RepositoryError> {
        let guard = self.criteria.lock().map_err(poisoned)?;
        Ok(guard.iter().find(|stored| &stored.id == id).cloned())
    }

    fn list_criteria(&self) -> Result<Vec<CriteriaEntry>, RepositoryError> {
        let guard = self.criteria.lock().map_err(poisoned)?;
        Ok(guard.clone())
    }
}

fn poisoned<T>(_: std::sync::PoisonError<T>) -> RepositoryError {
    RepositoryError::Unavailable("repository mutex poisoned".to_string())
}
