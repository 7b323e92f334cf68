use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::report_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;
use vehicle_inspection::config::AppConfig;
use vehicle_inspection::error::AppError;
use vehicle_inspection::inspection::ReportComposer;
use vehicle_inspection::telemetry;

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
        composer: Arc::new(ReportComposer::for_language(config.report.language)),
    };

    let app = report_routes(config.report.max_payload_bytes)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        language = config.report.language.code(),
        max_payload_bytes = config.report.max_payload_bytes,
        "inspection report service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
