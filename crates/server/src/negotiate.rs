//! Slot negotiation.

use crate::slots::SlotTable;
use dropslot_core::{AnnounceConfig, Error, Slot, SlotConfig};
use std::sync::Arc;
use tracing::info;

/// A granted slot together with its transfer URLs.
#[derive(Clone, Debug)]
pub struct SlotGrant {
    pub slot: Slot,
    pub put_url: String,
    pub get_url: String,
}

/// Issues slots: enforces the size limit, registers the slot in the table,
/// and resolves the transfer URLs from the announce configuration.
pub struct SlotNegotiator {
    table: Arc<SlotTable>,
    announce: AnnounceConfig,
    max_file_size: i64,
    ttl: time::Duration,
}

impl SlotNegotiator {
    pub fn new(table: Arc<SlotTable>, announce: AnnounceConfig, slots: &SlotConfig) -> Self {
        Self {
            table,
            announce,
            max_file_size: slots.max_file_size,
            ttl: slots.ttl(),
        }
    }

    /// Configured size limit in bytes; zero or negative means unlimited.
    pub fn max_file_size(&self) -> i64 {
        self.max_file_size
    }

    /// Grant a slot for one upload of `filename` with exactly `size` bytes.
    pub fn request_slot(
        &self,
        creator: &str,
        filename: &str,
        size: u64,
    ) -> Result<SlotGrant, Error> {
        if self.max_file_size > 0 && size > self.max_file_size as u64 {
            return Err(Error::TooLarge {
                size,
                max: self.max_file_size as u64,
            });
        }

        let slot = Slot::new(creator, filename, size, self.ttl);
        let url = self.transfer_url(&slot);
        info!(id = %slot.id, creator, filename, size, "slot granted");
        self.table.create(slot.clone());

        // Upload and fetch go through the same resource.
        Ok(SlotGrant {
            slot,
            put_url: url.clone(),
            get_url: url,
        })
    }

    /// The transfer URL for a slot, ASCII-only by construction.
    pub fn transfer_url(&self, slot: &Slot) -> String {
        let ctx = self.announce.context_root.trim_end_matches('/');
        format!(
            "{}://{}:{}{}/{}/{}",
            self.announce.scheme,
            self.announce.host,
            self.announce.port,
            ctx,
            slot.id,
            urlencoding::encode(&slot.filename)
        )
    }
}
