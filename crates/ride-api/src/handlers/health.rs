//! Health check handlers
//!
//! Liveness and readiness probes, mounted outside `/api/v1` and the rate
//! limiter.

use axum::{extract::State, http::StatusCode, Json};
use ride_service::dto::{HealthResponse, ReadinessResponse};

use crate::state::AppState;

fn healthy() -> HealthResponse {
    HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }
}

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(healthy())
}

/// Process is up; never touches dependencies
///
/// GET /health/live
pub async fn liveness_check() -> StatusCode {
    StatusCode::OK
}

/// Database and Redis reachability
///
/// GET /health/ready
pub async fn readiness_check(
    State(state): State<AppState>,
) -> (StatusCode, Json<ReadinessResponse>) {
    let db_healthy = state.db_pool().acquire().await.is_ok();
    let redis_healthy = state.redis_pool().health_check().await.is_ok();

    let response = ReadinessResponse::new(db_healthy, redis_healthy);
    let status = if response.is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}
