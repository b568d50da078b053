//! Rental property underwriting: investment metrics, buying-box screening, and the
//! portfolio service that caches both for tracked properties.

pub mod config;
pub mod error;
pub mod portfolio;
pub mod telemetry;
pub mod underwriting;
