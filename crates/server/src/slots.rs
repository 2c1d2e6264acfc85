//! In-memory slot table.

use dropslot_core::{Slot, SlotId};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;
use time::OffsetDateTime;
use tracing::debug;

/// Interval between sweeps of expired entries.
pub const CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

/// Concurrent map of pending slots, keyed by identifier.
///
/// Consumption removes the entry in one critical section, so for any
/// identifier at most one caller ever receives the slot. Expired entries are
/// dropped lazily on consume and swept by the cleanup task; capacity is
/// bounded by TTL turnover.
#[derive(Default)]
pub struct SlotTable {
    inner: Mutex<HashMap<SlotId, Slot>>,
}

impl SlotTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a slot, replacing any same-id entry.
    pub fn create(&self, slot: Slot) {
        let mut inner = self.inner.lock().expect("slot table poisoned");
        inner.insert(slot.id.clone(), slot);
    }

    /// Atomically take the slot for `id`, if one is pending and unexpired.
    ///
    /// Expired entries are removed and reported as absent; a consumed slot
    /// can never be consumed again.
    pub fn consume(&self, id: &SlotId) -> Option<Slot> {
        let mut inner = self.inner.lock().expect("slot table poisoned");
        let slot = inner.remove(id)?;
        if slot.is_expired(OffsetDateTime::now_utc()) {
            debug!(%id, "dropping expired slot on consume");
            return None;
        }
        Some(slot)
    }

    /// Sweep expired entries. Returns how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let now = OffsetDateTime::now_utc();
        let mut inner = self.inner.lock().expect("slot table poisoned");
        let before = inner.len();
        inner.retain(|_, slot| !slot.is_expired(now));
        before - inner.len()
    }

    /// Number of pending slots.
    pub fn len(&self) -> usize {
        self.inner.lock().expect("slot table poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Spawn a background task sweeping expired slots on an interval.
pub fn spawn_cleanup_task(table: Arc<SlotTable>, interval: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let dropped = table.purge_expired();
            if dropped > 0 {
                debug!(dropped, "swept expired slots");
            }
        }
    })
}
