//! Capability discovery endpoint.

use crate::error::ApiResult;
use crate::state::AppState;
use axum::extract::State;
use axum::Json;
use serde::Serialize;

/// Capabilities response.
#[derive(Debug, Serialize)]
pub struct CapabilitiesResponse {
    /// Maximum accepted file size in bytes; zero means unlimited.
    pub max_file_size: u64,
    /// Seconds a granted slot stays valid.
    pub slot_ttl_secs: u64,
    /// API version.
    pub api_version: &'static str,
}

/// GET /v1/capabilities
pub async fn get_capabilities(
    State(state): State<AppState>,
) -> ApiResult<Json<CapabilitiesResponse>> {
    // Negative limits also mean "unlimited"; advertise them as zero.
    let max_file_size = u64::try_from(state.config.slots.max_file_size).unwrap_or(0);
    Ok(Json(CapabilitiesResponse {
        max_file_size,
        slot_ttl_secs: state.config.slots.ttl_secs,
        api_version: "v1",
    }))
}
