use crate::cli::ServeArgs;
use crate::infra::{demo_orchestrator, AppState};
use crate::routes::with_factoring_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use credpulse::config::AppConfig;
use credpulse::error::AppError;
use credpulse::telemetry;
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

    let orchestrator = Arc::new(demo_orchestrator(config.workflow.clone()));

    let app = with_factoring_routes(orchestrator)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        oracle_timeout_ms = u64::try_from(config.workflow.oracle_timeout.as_millis()).unwrap_or(u64::MAX),
        base_rate = config.workflow.base_rate,
        "credpulse factoring service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
