//! Slot request endpoint.

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

/// Slot request body.
#[derive(Debug, Deserialize)]
pub struct SlotRequest {
    /// Opaque requester identity, recorded with the slot.
    pub requester: String,
    /// Filename the upload will carry.
    pub filename: String,
    /// Exact size in bytes of the upcoming upload.
    pub size: u64,
}

/// Slot response body.
#[derive(Debug, Serialize)]
pub struct SlotResponse {
    /// Where to PUT the file, valid for one upload until the slot expires.
    pub put_url: String,
    /// Where the file will be fetchable after the upload.
    pub get_url: String,
}

/// POST /v1/slots
pub async fn request_slot(
    State(state): State<AppState>,
    body: Result<Json<SlotRequest>, JsonRejection>,
) -> ApiResult<Json<SlotResponse>> {
    let Json(request) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    if request.filename.is_empty() {
        return Err(ApiError::BadRequest("filename must not be empty".into()));
    }
    if request.requester.is_empty() {
        return Err(ApiError::BadRequest("requester must not be empty".into()));
    }

    let grant =
        state
            .negotiator
            .request_slot(&request.requester, &request.filename, request.size)?;

    Ok(Json(SlotResponse {
        put_url: grant.put_url,
        get_url: grant.get_url,
    }))
}
