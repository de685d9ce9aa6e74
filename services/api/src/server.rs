use crate::cli::ServeArgs;
use crate::infra::{rule_store, AppState};
use crate::routes::with_advisory_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use cloud_advisor::advisory::AdvisoryService;
use cloud_advisor::config::AppConfig;
use cloud_advisor::error::AppError;
use cloud_advisor::telemetry;
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

    let store = rule_store(&config.advisor, args.rules_dir.take(), args.strict);
    let advisory_service = Arc::new(AdvisoryService::from_store(store, config.advisor.baseline)?);
    let rules_loaded = advisory_service.snapshot().len();

    let app = with_advisory_routes(advisory_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, rules_loaded, "cloud advisor ready");

    axum::serve(listener, app).await?;
    Ok(())
}
