//! Object transfer endpoints: one-shot upload and public fetch.

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::Response;
use dropslot_core::SlotId;
use dropslot_storage::StorageError;
use futures::StreamExt;
use tracing::{info, warn};

/// GET /{slot_id}/{filename}
///
/// Unauthenticated fetch. An unparsable identifier is indistinguishable from
/// a missing object; both give 404. Objects are immutable once uploaded, so
/// responses are cacheable for a year.
pub async fn fetch_object(
    State(state): State<AppState>,
    Path((slot_id, filename)): Path<(String, String)>,
    headers: HeaderMap,
) -> ApiResult<Response> {
    let id = SlotId::parse(&slot_id).map_err(|_| ApiError::NotFound(slot_id.clone()))?;

    let size = match state.repository.size(&id).await {
        Ok(size) => size,
        Err(StorageError::NotFound(_)) => return Err(ApiError::NotFound(slot_id)),
        Err(e) => return Err(e.into()),
    };

    let etag = state.repository.etag(&id).await;

    if let Some(etag) = &etag {
        let matches = headers
            .get(header::IF_NONE_MATCH)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v == etag);
        if matches {
            return Response::builder()
                .status(StatusCode::NOT_MODIFIED)
                .header(header::ETAG, etag)
                .body(Body::empty())
                .map_err(|e| ApiError::Internal(e.to_string()));
        }
    }

    let content_type = state.repository.content_type(&id, Some(&filename)).await;
    let stream = state.repository.open_read(&id).await?;

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CACHE_CONTROL, "max-age=31536000");
    if size > 0 {
        builder = builder.header(header::CONTENT_LENGTH, size);
    }
    if let Some(content_type) = content_type {
        builder = builder.header(header::CONTENT_TYPE, content_type);
    }
    if let Some(etag) = etag {
        builder = builder.header(header::ETAG, etag);
    }

    builder
        .body(Body::from_stream(stream))
        .map_err(|e| ApiError::Internal(e.to_string()))
}

/// PUT /{slot_id}/{filename}
///
/// Redeems a pending slot. Unknown, expired, and already-used slots are all
/// answered with the same 400 so probing reveals nothing. The body streams
/// through a temp file; a fetch never sees a partial upload.
pub async fn store_object(
    State(state): State<AppState>,
    Path((slot_id, _filename)): Path<(String, String)>,
    headers: HeaderMap,
    body: Body,
) -> ApiResult<Response> {
    let id = SlotId::parse(&slot_id)
        .map_err(|_| ApiError::BadRequest(format!("invalid slot identifier: {slot_id}")))?;

    let slot = state
        .slots
        .consume(&id)
        .ok_or(dropslot_core::Error::SlotUnavailable)?;

    let declared = headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());
    match declared {
        Some(declared) if declared == slot.size => {}
        Some(declared) => {
            return Err(dropslot_core::Error::SizeMismatch {
                declared,
                expected: slot.size,
            }
            .into());
        }
        None => {
            return Err(ApiError::BadRequest(
                "Content-Length header is required".into(),
            ));
        }
    }

    let mut upload = state.repository.open_write(&id).await?;
    let mut stream = body.into_data_stream();
    let mut written: u64 = 0;
    while let Some(chunk) = stream.next().await {
        let data = match chunk {
            Ok(data) => data,
            Err(error) => {
                warn!(%id, %error, "upload transport error, aborting");
                let _ = upload.abort().await;
                return Err(ApiError::BadRequest(format!("transfer aborted: {error}")));
            }
        };
        written += data.len() as u64;
        if written > slot.size {
            // Abort failures must not mask the mismatch response.
            let _ = upload.abort().await;
            return Err(dropslot_core::Error::SizeMismatch {
                declared: written,
                expected: slot.size,
            }
            .into());
        }
        if let Err(error) = upload.write(data).await {
            let _ = upload.abort().await;
            return Err(error.into());
        }
    }

    if written != slot.size {
        let _ = upload.abort().await;
        return Err(dropslot_core::Error::SizeMismatch {
            declared: written,
            expected: slot.size,
        }
        .into());
    }

    upload.finish().await?;
    info!(%id, creator = %slot.creator, size = written, "upload stored");

    Response::builder()
        .status(StatusCode::CREATED)
        .header(header::LOCATION, state.negotiator.transfer_url(&slot))
        .body(Body::empty())
        .map_err(|e| ApiError::Internal(e.to_string()))
}
