//! Filesystem-backed repository.

use crate::detect;
use crate::error::{StorageError, StorageResult};
use crate::purge::{select_victims, PurgeCandidate, PurgeStats};
use crate::space;
use crate::traits::{ByteStream, Repository, StreamingUpload};
use async_trait::async_trait;
use bytes::Bytes;
use dropslot_core::SlotId;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Default chunk size for streaming reads (64 KiB).
const STREAM_CHUNK_SIZE: usize = 64 * 1024;

/// Prefix of in-flight temp files, excluded from purge passes.
const TEMP_PREFIX: &str = ".tmp.";

/// Repository storing each object as one flat file named by its identifier.
pub struct FileRepository {
    root: PathBuf,
    // Keeps a throwaway root alive for the repository's lifetime; the
    // directory is removed on drop.
    _temp: Option<tempfile::TempDir>,
}

impl FileRepository {
    /// Create a repository rooted at a fixed directory, creating it if
    /// absent.
    pub async fn at_directory(root: impl AsRef<Path>) -> StorageResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).await?;
        Ok(Self { root, _temp: None })
    }

    /// Create a repository in a fresh temporary directory.
    ///
    /// The directory and everything in it is removed when the repository is
    /// dropped.
    pub fn in_temp_dir() -> StorageResult<Self> {
        let temp = tempfile::tempdir()?;
        Ok(Self {
            root: temp.path().to_path_buf(),
            _temp: Some(temp),
        })
    }

    /// Root directory holding the stored objects.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Run one synchronous purge pass up front.
    ///
    /// Called at startup so a restart into a full disk reclaims space before
    /// the first upload arrives.
    pub async fn initialize(&self) -> StorageResult<()> {
        let stats = self.purge().await?;
        info!(
            root = %self.root.display(),
            files_deleted = stats.files_deleted,
            bytes_deleted = stats.bytes_deleted,
            "repository initialized"
        );
        Ok(())
    }

    /// Resolve the on-disk path for an identifier.
    ///
    /// Identifiers are validated at parse time, but the key is re-checked to
    /// be a single normal path component before touching the filesystem.
    fn object_path(&self, id: &SlotId) -> StorageResult<PathBuf> {
        let key = id.as_str();
        let mut components = Path::new(key).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Ok(self.root.join(key)),
            _ => Err(StorageError::InvalidKey(key.to_string())),
        }
    }

    /// Collect purge candidates: regular files directly under the root,
    /// excluding in-flight temp files. Unreadable entries are logged and
    /// skipped.
    async fn purge_candidates(&self) -> StorageResult<Vec<PurgeCandidate>> {
        let mut candidates = Vec::new();
        let mut entries = fs::read_dir(&self.root).await?;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            if name.to_string_lossy().starts_with(TEMP_PREFIX) {
                continue;
            }
            let metadata = match entry.metadata().await {
                Ok(metadata) => metadata,
                Err(error) => {
                    warn!(path = %entry.path().display(), %error, "skipping unreadable entry");
                    continue;
                }
            };
            if !metadata.is_file() {
                continue;
            }
            let modified = match metadata.modified() {
                Ok(modified) => modified,
                Err(error) => {
                    warn!(path = %entry.path().display(), %error, "entry has no mtime, skipping");
                    continue;
                }
            };
            candidates.push(PurgeCandidate {
                path: entry.path(),
                size: metadata.len(),
                modified,
            });
        }
        Ok(candidates)
    }
}

/// Weak validator from the object's path identity and last-modified time.
fn compute_etag(path: &Path, modified: std::time::SystemTime) -> String {
    let mut path_hasher = DefaultHasher::new();
    path.hash(&mut path_hasher);
    let mut mtime_hasher = DefaultHasher::new();
    modified.hash(&mut mtime_hasher);
    format!("{:x}{:x}", path_hasher.finish(), mtime_hasher.finish())
}

fn not_found(id: &SlotId, error: std::io::Error) -> StorageError {
    if error.kind() == std::io::ErrorKind::NotFound {
        StorageError::NotFound(id.to_string())
    } else {
        StorageError::Io(error)
    }
}

#[async_trait]
impl Repository for FileRepository {
    #[instrument(skip(self), fields(backend = "filesystem"))]
    async fn exists(&self, id: &SlotId) -> StorageResult<bool> {
        let path = self.object_path(id)?;
        fs::try_exists(&path).await.map_err(StorageError::Io)
    }

    #[instrument(skip(self), fields(backend = "filesystem"))]
    async fn size(&self, id: &SlotId) -> StorageResult<u64> {
        let path = self.object_path(id)?;
        let metadata = fs::metadata(&path).await.map_err(|e| not_found(id, e))?;
        Ok(metadata.len())
    }

    #[instrument(skip(self), fields(backend = "filesystem"))]
    async fn etag(&self, id: &SlotId) -> Option<String> {
        let path = self.object_path(id).ok()?;
        match fs::metadata(&path).await {
            Ok(metadata) => match metadata.modified() {
                Ok(modified) => Some(compute_etag(&path, modified)),
                Err(error) => {
                    debug!(%id, %error, "no mtime available, skipping validator");
                    None
                }
            },
            Err(error) => {
                debug!(%id, %error, "stat failed, skipping validator");
                None
            }
        }
    }

    #[instrument(skip(self), fields(backend = "filesystem"))]
    async fn content_type(&self, id: &SlotId, name_hint: Option<&str>) -> Option<String> {
        let path = self.object_path(id).ok()?;
        let mut prefix = [0u8; detect::SNIFF_LEN];
        let read = match fs::File::open(&path).await {
            Ok(mut file) => match file.read(&mut prefix).await {
                Ok(n) => n,
                Err(error) => {
                    debug!(%id, %error, "sniff read failed");
                    0
                }
            },
            Err(error) => {
                debug!(%id, %error, "sniff open failed");
                0
            }
        };
        detect::detect(&prefix[..read], name_hint)
    }

    #[instrument(skip(self), fields(backend = "filesystem"))]
    async fn open_read(&self, id: &SlotId) -> StorageResult<ByteStream> {
        let path = self.object_path(id)?;
        let file = fs::File::open(&path).await.map_err(|e| not_found(id, e))?;

        // Stream the file in chunks instead of loading it into memory.
        let stream = async_stream::try_stream! {
            let mut file = file;
            let mut buf = vec![0u8; STREAM_CHUNK_SIZE];
            loop {
                let n = file.read(&mut buf).await?;
                if n == 0 {
                    break;
                }
                yield Bytes::copy_from_slice(&buf[..n]);
            }
        };

        Ok(Box::pin(stream))
    }

    #[instrument(skip(self), fields(backend = "filesystem"))]
    async fn open_write(&self, id: &SlotId) -> StorageResult<Box<dyn StreamingUpload>> {
        let final_path = self.object_path(id)?;

        // Unique temp name so concurrent writes to the same identifier never
        // clobber each other's in-flight data.
        let temp_path = self.root.join(format!("{TEMP_PREFIX}{}", Uuid::new_v4()));
        let file = fs::File::create(&temp_path).await?;

        Ok(Box::new(FileUpload {
            file,
            temp_path,
            final_path,
            bytes_written: 0,
        }))
    }

    #[instrument(skip(self), fields(backend = "filesystem"))]
    async fn delete(&self, id: &SlotId) -> StorageResult<bool> {
        let path = self.object_path(id)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    #[instrument(skip(self), fields(backend = "filesystem"))]
    async fn purge(&self) -> StorageResult<PurgeStats> {
        let candidates = self.purge_candidates().await?;
        let used: u64 = candidates.iter().map(|c| c.size).sum();

        let root = self.root.clone();
        let free = tokio::task::spawn_blocking(move || space::usable_space(&root))
            .await
            .map_err(|e| {
                StorageError::Io(std::io::Error::other(format!("spawn_blocking failed: {e}")))
            })?;
        let free = match free {
            Some(free) => free,
            None => {
                warn!(root = %self.root.display(), "no disk matches the repository root, skipping purge");
                return Ok(PurgeStats::default());
            }
        };

        let victims = select_victims(candidates, used, free);
        let mut stats = PurgeStats::default();
        for victim in victims {
            match fs::remove_file(&victim.path).await {
                Ok(()) => {
                    info!(path = %victim.path.display(), size = victim.size, "purged");
                    stats.files_deleted += 1;
                    stats.bytes_deleted += victim.size;
                }
                Err(error) => {
                    warn!(path = %victim.path.display(), %error, "purge delete failed");
                }
            }
        }
        Ok(stats)
    }

    #[instrument(skip(self), fields(backend = "filesystem"))]
    async fn health_check(&self) -> StorageResult<()> {
        let metadata = fs::metadata(&self.root).await.map_err(|e| {
            StorageError::Io(std::io::Error::new(
                e.kind(),
                format!("repository root not accessible: {e}"),
            ))
        })?;

        if !metadata.is_dir() {
            return Err(StorageError::Config(format!(
                "repository root is not a directory: {:?}",
                self.root
            )));
        }

        Ok(())
    }
}

/// Streaming upload writing through a temp file.
struct FileUpload {
    file: fs::File,
    temp_path: PathBuf,
    final_path: PathBuf,
    bytes_written: u64,
}

#[async_trait]
impl StreamingUpload for FileUpload {
    async fn write(&mut self, data: Bytes) -> StorageResult<()> {
        self.file.write_all(&data).await?;
        self.bytes_written += data.len() as u64;
        Ok(())
    }

    async fn finish(mut self: Box<Self>) -> StorageResult<u64> {
        // Flush to disk before the rename so the visible object is durable.
        self.file.sync_all().await?;
        drop(self.file);
        fs::rename(&self.temp_path, &self.final_path).await?;
        Ok(self.bytes_written)
    }

    async fn abort(self: Box<Self>) -> StorageResult<()> {
        drop(self.file);
        let _ = fs::remove_file(&self.temp_path).await;
        Ok(())
    }
}
