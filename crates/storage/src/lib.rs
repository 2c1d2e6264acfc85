//! Storage layer for dropslot.
//!
//! Stored objects live behind the [`Repository`] trait; the one shipped
//! implementation keeps each object as a flat file named by its slot
//! identifier. The layer also owns the quota purge engine that reclaims
//! space from the oldest objects when the backing medium fills up.

pub mod detect;
pub mod error;
pub mod filesystem;
pub mod purge;
pub mod space;
pub mod traits;

pub use error::{StorageError, StorageResult};
pub use filesystem::FileRepository;
pub use purge::{select_victims, PurgeCandidate, PurgeStats};
pub use traits::{ByteStream, Repository, StreamingUpload};

use dropslot_core::StorageConfig;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Build a repository from configuration.
pub async fn from_config(config: &StorageConfig) -> StorageResult<FileRepository> {
    match config {
        StorageConfig::Directory { path } => FileRepository::at_directory(path).await,
        StorageConfig::Temp => FileRepository::in_temp_dir(),
    }
}

/// Handle to the recurring purge task.
///
/// Dropping the handle cancels the timer; already stored objects are kept.
pub struct PurgeTaskHandle {
    handle: tokio::task::JoinHandle<()>,
}

impl PurgeTaskHandle {
    /// Cancel the recurring purge.
    pub fn shutdown(self) {
        self.handle.abort();
    }
}

impl Drop for PurgeTaskHandle {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Spawn a task running one purge pass every `interval`.
///
/// Panics if `interval` is zero (configuration validation rejects that
/// before this point).
pub fn spawn_purge_task(repository: Arc<dyn Repository>, interval: Duration) -> PurgeTaskHandle {
    let handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first tick completes immediately; initialization already ran a
        // pass, so skip it.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match repository.purge().await {
                Ok(stats) if stats.files_deleted > 0 => {
                    info!(
                        files_deleted = stats.files_deleted,
                        bytes_deleted = stats.bytes_deleted,
                        "purge pass reclaimed space"
                    );
                }
                Ok(_) => debug!("purge pass reclaimed nothing"),
                Err(error) => warn!(%error, "purge pass failed"),
            }
        }
    });
    PurgeTaskHandle { handle }
}
