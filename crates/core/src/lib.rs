//! Core domain types for dropslot.
//!
//! This crate defines the data model shared by the storage and server crates:
//! - Slot identifiers (hardened random tokens with a legacy UUID fallback)
//! - Slots (single-use upload tickets)
//! - Application configuration
//! - Domain error types

pub mod config;
pub mod error;
pub mod slot;
pub mod slot_id;

pub use config::{AnnounceConfig, AppConfig, PurgeConfig, ServerConfig, SlotConfig, StorageConfig};
pub use error::{Error, Result};
pub use slot::Slot;
pub use slot_id::SlotId;

/// Default maximum accepted file size: 50 MiB.
pub const DEFAULT_MAX_FILE_SIZE: i64 = 50 * 1024 * 1024;

/// Default slot time-to-live in seconds (5 minutes).
pub const DEFAULT_SLOT_TTL_SECS: u64 = 300;

/// Default interval between purge passes in seconds (5 minutes).
pub const DEFAULT_PURGE_INTERVAL_SECS: u64 = 300;
