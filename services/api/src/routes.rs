use crate::infra::AppState;
use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderName, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde_json::json;
use tracing::info;
use vehicle_inspection::error::AppError;
use vehicle_inspection::inspection::{report_filename, InspectionRecord};

const DIAGNOSTICS_HEADER: HeaderName = HeaderName::from_static("x-report-diagnostics");

pub(crate) fn report_routes(max_payload_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/generate-pdf", post(generate_report_endpoint))
        .route("/api/generate-pdf", post(generate_report_endpoint))
        .layer(DefaultBodyLimit::max(max_payload_bytes))
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

/// Composes the submitted record and returns it as a PDF attachment.
///
/// Composition is CPU bound (image decoding, deflate), so it runs on the
/// blocking pool. Degraded images still produce a 200; their count is
/// reported in `x-report-diagnostics`.
pub(crate) async fn generate_report_endpoint(
    Extension(state): Extension<AppState>,
    Json(record): Json<InspectionRecord>,
) -> Result<impl IntoResponse, AppError> {
    let filename = report_filename(&record);
    let composer = state.composer.clone();
    let report = tokio::task::spawn_blocking(move || composer.compose(&record)).await??;

    info!(
        %filename,
        pages = report.page_count,
        diagnostics = report.diagnostics.len(),
        "served inspection report"
    );

    let headers = [
        (header::CONTENT_TYPE, mime::APPLICATION_PDF.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        ),
        (DIAGNOSTICS_HEADER, report.diagnostics.len().to_string()),
    ];

    Ok((StatusCode::OK, headers, report.bytes))
}
