use crate::analyze::{analyze_property, AnalysisRequest, PropertyAnalysis};
use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use rental_underwriting::config::ScreeningConfig;
use rental_underwriting::error::AppError;
use rental_underwriting::portfolio::{portfolio_router, PortfolioRepository, PortfolioService};
use serde_json::json;
use std::sync::Arc;

pub(crate) fn with_portfolio_routes<R>(service: Arc<PortfolioService<R>>) -> axum::Router
where
    R: PortfolioRepository + 'static,
{
    let screening = *service.screening();

    portfolio_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/underwriting/analyze",
            axum::routing::post(analyze_endpoint).layer(Extension(screening)),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Stateless underwriting: nothing is stored.
pub(crate) async fn analyze_endpoint(
    Extension(policy): Extension<ScreeningConfig>,
    Json(request): Json<AnalysisRequest>,
) -> Result<Json<PropertyAnalysis>, AppError> {
    analyze_property(request, &policy).map(Json)
}
