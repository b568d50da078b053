//! Tracked properties and saved buying boxes layered over the underwriting engine.
//!
//! The service owns metric caching and screening passes; storage sits behind
//! [`PortfolioRepository`] so the HTTP layer can run against memory or a database.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    CriteriaEntry, CriteriaId, MetricsView, NewProperty, PropertyEntry, PropertyId,
    PropertyUpdate, StoredMetrics, ValuationsView,
};
pub use repository::{PortfolioRepository, RepositoryError};
pub use router::portfolio_router;
pub use service::{PortfolioService, PortfolioServiceError, PropertyValidationError};
