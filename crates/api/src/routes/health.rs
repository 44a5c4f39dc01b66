//! Health check endpoint handlers.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::time::Instant;

use crate::app::AppState;
use crate::error::ApiError;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub database: DatabaseHealth,
    pub notifications: NotificationHealth,
}

#[derive(Debug, Serialize)]
pub struct DatabaseHealth {
    pub connected: bool,
    pub latency_ms: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct NotificationHealth {
    pub enabled: bool,
    pub provider: String,
}

/// Simple status response for liveness/readiness probes.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

async fn ping(state: &AppState) -> Option<u64> {
    let start = Instant::now();
    sqlx::query("SELECT 1")
        .execute(&state.pool)
        .await
        .ok()
        .map(|_| start.elapsed().as_millis() as u64)
}

/// Database connectivity and configuration summary. 503 when the database is
/// unreachable.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let latency_ms = ping(&state).await;
    let connected = latency_ms.is_some();

    let response = HealthResponse {
        status: if connected { "healthy" } else { "unhealthy" },
        version: env!("CARGO_PKG_VERSION"),
        database: DatabaseHealth {
            connected,
            latency_ms,
        },
        notifications: NotificationHealth {
            enabled: state.config.notification.enabled,
            provider: state.config.notification.provider.clone(),
        },
    };

    let status = if connected {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(response))
}

pub async fn live() -> Json<StatusResponse> {
    Json(StatusResponse { status: "alive" })
}

/// Ready once the database answers.
pub async fn ready(State(state): State<AppState>) -> Result<Json<StatusResponse>, ApiError> {
    ping(&state)
        .await
        .map(|_| Json(StatusResponse { status: "ready" }))
        .ok_or_else(|| ApiError::ServiceUnavailable("Database unreachable".to_string()))
}
