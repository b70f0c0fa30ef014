//! Health check endpoints for orchestrator probes

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;

use super::state::AppState;
use crate::api::types::Json;
use crate::domain::bot::LifecycleStatus;

/// Health response, with the pipeline lifecycle on readiness checks
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pipeline: Option<LifecycleStatus>,
}

#[derive(Serialize, Clone, Copy, PartialEq, Eq, Debug)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unavailable,
}

/// Returns 200 while the process is serving
pub async fn health_check() -> impl IntoResponse {
    let response = HealthResponse {
        status: HealthStatus::Healthy,
        version: env!("CARGO_PKG_VERSION").to_string(),
        pipeline: None,
    };

    (StatusCode::OK, Json(response))
}

/// Returns 503 until a pipeline has been built
pub async fn ready_check(State(state): State<AppState>) -> impl IntoResponse {
    let pipeline = state.bot.status().await;
    let ready = pipeline.state == "ready";

    let response = HealthResponse {
        status: if ready {
            HealthStatus::Healthy
        } else {
            HealthStatus::Unavailable
        },
        version: env!("CARGO_PKG_VERSION").to_string(),
        pipeline: Some(pipeline),
    };

    let status_code = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(response))
}

/// Liveness probe
pub async fn live_check() -> impl IntoResponse {
    StatusCode::OK
}
