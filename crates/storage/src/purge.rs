//! Quota purge planning.
//!
//! A purge pass reclaims space when the stored objects occupy at least as
//! much of the backing medium as remains free. Victims are chosen oldest
//! first until usage drops back under the free-space margin. Selection is a
//! pure function over observed sizes so the thresholds can be tested without
//! touching a disk.

use std::path::PathBuf;
use std::time::SystemTime;

/// A regular file eligible for purging.
#[derive(Clone, Debug)]
pub struct PurgeCandidate {
    /// Absolute path of the file.
    pub path: PathBuf,
    /// File size in bytes.
    pub size: u64,
    /// Last modification time.
    pub modified: SystemTime,
}

/// Outcome of one purge pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PurgeStats {
    /// Files removed.
    pub files_deleted: u64,
    /// Bytes reclaimed.
    pub bytes_deleted: u64,
}

/// Choose which files a purge pass should delete.
///
/// `used` is the total size of the candidates, `free` the usable space left
/// on the backing medium. No file is selected while `used < free`; once the
/// margin is crossed, files are selected oldest-modified first, stopping as
/// soon as the remaining usage drops under the margin again. Reclaimed bytes
/// count toward the free side, so each deletion closes the gap from both
/// ends.
pub fn select_victims(
    mut candidates: Vec<PurgeCandidate>,
    used: u64,
    free: u64,
) -> Vec<PurgeCandidate> {
    if used == 0 || used < free {
        return Vec::new();
    }

    candidates.sort_by_key(|c| c.modified);

    let mut victims = Vec::new();
    let mut deleted: u64 = 0;
    for candidate in candidates {
        deleted = deleted.saturating_add(candidate.size);
        victims.push(candidate);
        if deleted >= used || used - deleted < free.saturating_add(deleted) {
            break;
        }
    }
    victims
}
