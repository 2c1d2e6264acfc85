//! Repository trait definitions.

use crate::error::StorageResult;
use crate::purge::PurgeStats;
use async_trait::async_trait;
use bytes::Bytes;
use dropslot_core::SlotId;
use futures::Stream;
use std::pin::Pin;

/// A boxed stream of bytes for streaming reads.
pub type ByteStream = Pin<Box<dyn Stream<Item = StorageResult<Bytes>> + Send>>;

/// Repository abstraction for uploaded objects.
///
/// Objects are keyed by slot identifier only. Announced filenames never reach
/// the repository as keys; they are passed (if at all) as advisory hints.
#[async_trait]
pub trait Repository: Send + Sync + 'static {
    /// Check if an object exists.
    async fn exists(&self, id: &SlotId) -> StorageResult<bool>;

    /// Get an object's size in bytes without fetching content.
    async fn size(&self, id: &SlotId) -> StorageResult<u64>;

    /// Weak cache validator for an object.
    ///
    /// Derived from the object's identity and last-modified time, so it
    /// changes whenever the object is rewritten. Returns `None` when the
    /// object cannot be statted; a missing validator disables conditional
    /// requests but never fails a fetch.
    async fn etag(&self, id: &SlotId) -> Option<String>;

    /// Best-effort content type for an object.
    ///
    /// Stages: sniff the object's leading bytes, then fall back to an
    /// extension heuristic on `name_hint`. Degrades to `None`; detection
    /// failures never fail the request.
    async fn content_type(&self, id: &SlotId, name_hint: Option<&str>) -> Option<String>;

    /// Open an object for reading as a chunked byte stream.
    async fn open_read(&self, id: &SlotId) -> StorageResult<ByteStream>;

    /// Start a streaming write for an object.
    ///
    /// The object becomes visible only when `finish()` succeeds; a concurrent
    /// reader never observes a partial object.
    async fn open_write(&self, id: &SlotId) -> StorageResult<Box<dyn StreamingUpload>>;

    /// Delete an object. Returns whether an object was actually removed.
    async fn delete(&self, id: &SlotId) -> StorageResult<bool>;

    /// Run one quota purge pass, reclaiming space from the oldest objects
    /// when usage exceeds the free-space margin.
    async fn purge(&self) -> StorageResult<PurgeStats>;

    /// Verify the repository is reachable.
    ///
    /// The default implementation returns Ok(()), suitable for backends that
    /// don't require connectivity verification.
    async fn health_check(&self) -> StorageResult<()> {
        Ok(())
    }
}

/// Trait for streaming uploads.
#[async_trait]
pub trait StreamingUpload: Send {
    /// Write a chunk of data.
    async fn write(&mut self, data: Bytes) -> StorageResult<()>;

    /// Finish the upload and return the total bytes written.
    async fn finish(self: Box<Self>) -> StorageResult<u64>;

    /// Abort the upload, discarding anything written so far.
    async fn abort(self: Box<Self>) -> StorageResult<()>;
}
