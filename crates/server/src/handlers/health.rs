//! Health check endpoint.

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::extract::State;
use axum::Json;
use serde::Serialize;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// GET /v1/health
///
/// Intentionally unauthenticated for load balancer probes. Verifies the
/// repository root is reachable.
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    state
        .repository
        .health_check()
        .await
        .map_err(|e| ApiError::Unavailable(e.to_string()))?;
    Ok(Json(HealthResponse { status: "ok" }))
}
