use super::domain::{CriteriaEntry, CriteriaId, PropertyEntry, PropertyId};

/// Storage abstraction so the service can be exercised without a database.
pub trait PortfolioRepository: Send + Sync {
    fn insert_property(&self, entry: PropertyEntry) -> Result<PropertyEntry, RepositoryError>;
    fn fetch_property(&self, id: &PropertyId) -> Result<Option<PropertyEntry>, RepositoryError>;
    /// Run `change` against the stored entry while holding the store's lock.
    ///
    /// The entry is written back only when `change` returns `Ok`, so a rejected edit
    /// leaves the record untouched. Unknown ids fail with `RepositoryError::NotFound`.
    fn modify_property<T, E, F>(&self, id: &PropertyId, change: F) -> Result<T, E>
    where
        F: FnOnce(&mut PropertyEntry) -> Result<T, E>,
        E: From<RepositoryError>;

    fn insert_criteria(&self, entry: CriteriaEntry) -> Result<CriteriaEntry, RepositoryError>;
    fn update_criteria(&self, entry: CriteriaEntry) -> Result<(), RepositoryError>;
    fn fetch_criteria(&self, id: &CriteriaId) -> Result<Option<CriteriaEntry>, RepositoryError>;
    /// All saved criteria, oldest first.
    fn list_criteria(&self) -> Result<Vec<CriteriaEntry>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
