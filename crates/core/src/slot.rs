//! Single-use upload tickets.

use crate::SlotId;
use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, PrimitiveDateTime};

/// A slot authorizes exactly one upload of a file with a known name and size.
///
/// Slots are immutable once created. The expiry deadline is fixed at creation
/// time; consumption is tracked by the table holding the slot, not by the slot
/// itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slot {
    /// Identifier under which the upload will be stored and later fetched.
    pub id: SlotId,
    /// Who requested the slot (opaque requester identity, logged only).
    pub creator: String,
    /// Filename announced by the requester. Used for URLs and content type
    /// hints only, never for disk paths.
    pub filename: String,
    /// Exact size in bytes the upload must have.
    pub size: u64,
    /// Instant the slot was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// Instant after which the slot may no longer be consumed.
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

impl Slot {
    /// Create a slot with a freshly generated hardened identifier, expiring
    /// `ttl` from now.
    pub fn new(
        creator: impl Into<String>,
        filename: impl Into<String>,
        size: u64,
        ttl: time::Duration,
    ) -> Self {
        let now = OffsetDateTime::now_utc();
        // A deadline past the calendar limit never expires in practice;
        // clamp there rather than overflowing the addition.
        let expires_at = now
            .checked_add(ttl)
            .unwrap_or(PrimitiveDateTime::MAX.assume_utc());
        Self {
            id: SlotId::generate(),
            creator: creator.into(),
            filename: filename.into(),
            size,
            created_at: now,
            expires_at,
        }
    }

    /// Whether the slot has passed its expiry deadline.
    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        now >= self.expires_at
    }
}
