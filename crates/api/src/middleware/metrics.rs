//! Prometheus metrics middleware and business counters.

use axum::{
    body::Body,
    extract::MatchedPath,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::Instant;

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

const DURATION_BUCKETS: &[f64] = &[0.001, 0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 10.0];

/// Records `http_requests_total` and `http_request_duration_seconds`,
/// labelled by the matched route rather than the raw path.
pub async fn metrics_middleware(req: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().as_str().to_string();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(req).await;

    counter!(
        "http_requests_total",
        "method" => method.clone(),
        "path" => path.clone(),
        "status" => response.status().as_u16().to_string()
    )
    .increment(1);

    histogram!(
        "http_request_duration_seconds",
        "method" => method,
        "path" => path
    )
    .record(start.elapsed().as_secs_f64());

    response
}

/// Counts a stored RSVP by resulting status.
pub fn record_rsvp_submission(status: &str) {
    counter!("rsvp_submissions_total", "status" => status.to_string()).increment(1);
}

/// Counts a notification attempt by outcome (sent, failed, skipped).
pub fn record_notification(result: &str) {
    counter!("rsvp_notifications_total", "result" => result.to_string()).increment(1);
}

/// Serves the Prometheus text exposition.
pub async fn metrics_handler() -> impl IntoResponse {
    match PROMETHEUS_HANDLE.get() {
        Some(handle) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        ),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            [(header::CONTENT_TYPE, "text/plain")],
            "Metrics not initialized".to_string(),
        ),
    }
}

/// Installs the global Prometheus recorder. Calling it again is a no-op.
pub fn init_metrics() -> Result<(), BuildError> {
    if PROMETHEUS_HANDLE.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new()
        .set_buckets(DURATION_BUCKETS)?
        .install_recorder()?;
    let _ = PROMETHEUS_HANDLE.set(handle);
    Ok(())
}
