use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{CriteriaId, NewProperty, PropertyId, PropertyUpdate};
use super::repository::{PortfolioRepository, RepositoryError};
use super::service::{PortfolioService, PortfolioServiceError};
use crate::underwriting::{BuyingBoxCriteria, PropertyValuation};

/// Router exposing property tracking, metrics, buying boxes and screening.
pub fn portfolio_router<R>(service: Arc<PortfolioService<R>>) -> Router
where
    R: PortfolioRepository + 'static,
{
    Router::new()
        .route("/api/v1/properties", post(create_property_handler::<R>))
        .route(
            "/api/v1/properties/:property_id",
            get(get_property_handler::<R>).put(update_property_handler::<R>),
        )
        .route(
            "/api/v1/properties/:property_id/metrics",
            get(metrics_handler::<R>).post(recalculate_handler::<R>),
        )
        .route(
            "/api/v1/properties/:property_id/comparisons",
            get(comparisons_handler::<R>),
        )
        .route(
            "/api/v1/properties/:property_id/valuations",
            get(valuations_handler::<R>).post(add_valuation_handler::<R>),
        )
        .route(
            "/api/v1/buying-criteria",
            get(list_criteria_handler::<R>).post(create_criteria_handler::<R>),
        )
        .route(
            "/api/v1/buying-criteria/:criteria_id/activate",
            post(activate_criteria_handler::<R>),
        )
        .route(
            "/api/v1/buying-criteria/:criteria_id/deactivate",
            post(deactivate_criteria_handler::<R>),
        )
        .route(
            "/api/v1/buying-criteria/:criteria_id/rankings",
            post(rankings_handler::<R>),
        )
        .with_state(service)
}

type ServiceState<R> = State<Arc<PortfolioService<R>>>;

#[derive(Debug, Deserialize)]
pub(crate) struct RankingRequest {
    pub property_ids: Vec<PropertyId>,
}

pub(crate) async fn create_property_handler<R>(
    State(service): ServiceState<R>,
    axum::Json(property): axum::Json<NewProperty>,
) -> Response
where
    R: PortfolioRepository + 'static,
{
    match service.create_property(property) {
        Ok(entry) => (StatusCode::CREATED, axum::Json(entry)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn get_property_handler<R>(
    State(service): ServiceState<R>,
    Path(property_id): Path<String>,
) -> Response
where
    R: PortfolioRepository + 'static,
{
    match service.get_property(&PropertyId(property_id)) {
        Ok(entry) => (StatusCode::OK, axum::Json(entry)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn update_property_handler<R>(
    State(service): ServiceState<R>,
    Path(property_id): Path<String>,
    axum::Json(update): axum::Json<PropertyUpdate>,
) -> Response
where
    R: PortfolioRepository + 'static,
{
    match service.update_property(&PropertyId(property_id), update) {
        Ok(entry) => (StatusCode::OK, axum::Json(entry)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn metrics_handler<R>(
    State(service): ServiceState<R>,
    Path(property_id): Path<String>,
) -> Response
where
    R: PortfolioRepository + 'static,
{
    match service.metrics(&PropertyId(property_id)) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn recalculate_handler<R>(
    State(service): ServiceState<R>,
    Path(property_id): Path<String>,
) -> Response
where
    R: PortfolioRepository + 'static,
{
    match service.recalculate_metrics(&PropertyId(property_id)) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn comparisons_handler<R>(
    State(service): ServiceState<R>,
    Path(property_id): Path<String>,
) -> Response
where
    R: PortfolioRepository + 'static,
{
    let id = PropertyId(property_id);
    match service.compare_property(&id) {
        Ok(results) => {
            let payload = json!({
                "property_id": id,
                "minimum_match_score": service.screening().minimum_match_score,
                "results": results,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn valuations_handler<R>(
    State(service): ServiceState<R>,
    Path(property_id): Path<String>,
) -> Response
where
    R: PortfolioRepository + 'static,
{
    match service.valuations(&PropertyId(property_id)) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn add_valuation_handler<R>(
    State(service): ServiceState<R>,
    Path(property_id): Path<String>,
    axum::Json(valuation): axum::Json<PropertyValuation>,
) -> Response
where
    R: PortfolioRepository + 'static,
{
    match service.add_valuation(&PropertyId(property_id), valuation) {
        Ok(summary) => (StatusCode::CREATED, axum::Json(summary)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn list_criteria_handler<R>(State(service): ServiceState<R>) -> Response
where
    R: PortfolioRepository + 'static,
{
    match service.list_criteria() {
        Ok(entries) => (StatusCode::OK, axum::Json(entries)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn create_criteria_handler<R>(
    State(service): ServiceState<R>,
    axum::Json(criteria): axum::Json<BuyingBoxCriteria>,
) -> Response
where
    R: PortfolioRepository + 'static,
{
    match service.create_criteria(criteria) {
        Ok(entry) => (StatusCode::CREATED, axum::Json(entry)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn activate_criteria_handler<R>(
    State(service): ServiceState<R>,
    Path(criteria_id): Path<String>,
) -> Response
where
    R: PortfolioRepository + 'static,
{
    toggle_criteria(&service, criteria_id, true)
}

pub(crate) async fn deactivate_criteria_handler<R>(
    State(service): ServiceState<R>,
    Path(criteria_id): Path<String>,
) -> Response
where
    R: PortfolioRepository + 'static,
{
    toggle_criteria(&service, criteria_id, false)
}

fn toggle_criteria<R>(service: &PortfolioService<R>, criteria_id: String, active: bool) -> Response
where
    R: PortfolioRepository + 'static,
{
    match service.set_criteria_active(&CriteriaId(criteria_id), active) {
        Ok(entry) => (StatusCode::OK, axum::Json(entry)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn rankings_handler<R>(
    State(service): ServiceState<R>,
    Path(criteria_id): Path<String>,
    axum::Json(request): axum::Json<RankingRequest>,
) -> Response
where
    R: PortfolioRepository + 'static,
{
    match service.rank_properties(&CriteriaId(criteria_id), &request.property_ids) {
        Ok(ranked) => (StatusCode::OK, axum::Json(ranked)).into_response(),
        Err(error) => error.into_response(),
    }
}

impl IntoResponse for PortfolioServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            PortfolioServiceError::Metrics(_)
            | PortfolioServiceError::InvalidProperty(_)
            | PortfolioServiceError::InvalidCriteria(_)
            | PortfolioServiceError::InvalidValuation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            PortfolioServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
            PortfolioServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
            PortfolioServiceError::Repository(RepositoryError::Unavailable(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let mut payload = json!({ "error": self.to_string() });
        if let PortfolioServiceError::Metrics(error) = &self {
            payload["computation"] = json!(error.computation());
        }

        (status, axum::Json(payload)).into_response()
    }
}
