use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::queue::QueueStatus;
use crate::state::AppState;

// ============ Response DTOs ============

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

/// Service status including the render queue
#[derive(Debug, Serialize, ToSchema)]
pub struct StatusResponse {
    pub status: String,
    pub render_queue: QueueStatus,
}

// ============ Handlers ============

/// Liveness probe
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    ),
    tag = "Health"
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "UP".to_string(),
    })
}

/// Detailed status with render queue statistics
#[utoipa::path(
    get,
    path = "/status",
    responses(
        (status = 200, description = "Service and render queue status", body = StatusResponse)
    ),
    tag = "Health"
)]
pub async fn service_status(State(state): State<AppState>) -> Json<StatusResponse> {
    let render_queue = state.render_queue.status_snapshot().await;

    Json(StatusResponse {
        status: "UP".to_string(),
        render_queue,
    })
}
