use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryPortfolioRepository};
use crate::routes::with_portfolio_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use rental_underwriting::config::AppConfig;
use rental_underwriting::error::AppError;
use rental_underwriting::portfolio::PortfolioService;
use rental_underwriting::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let repository = Arc::new(InMemoryPortfolioRepository::default());
    let portfolio_service = Arc::new(PortfolioService::new(repository, config.screening));

    let app = with_portfolio_routes(portfolio_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        minimum_match_score = config.screening.minimum_match_score,
        "rental underwriting service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
