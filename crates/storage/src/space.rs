//! Disk free-space probing.

use std::path::Path;
use sysinfo::Disks;

/// Usable space in bytes on the medium backing `path`.
///
/// The disk whose mount point is the longest prefix of `path` wins, so a
/// repository under `/var/lib` is matched against `/var` rather than `/`
/// when both are mounted. Minimal containers often expose an empty disk
/// list; those fall back to asking the filesystem directly.
pub fn usable_space(path: &Path) -> Option<u64> {
    let disks = Disks::new_with_refreshed_list();
    usable_space_from(&disks, path).or_else(|| statvfs_space(path))
}

fn usable_space_from(disks: &Disks, path: &Path) -> Option<u64> {
    disks
        .list()
        .iter()
        .filter(|disk| path.starts_with(disk.mount_point()))
        .max_by_key(|disk| disk.mount_point().as_os_str().len())
        .map(|disk| disk.available_space())
}

#[cfg(unix)]
fn statvfs_space(path: &Path) -> Option<u64> {
    let stat = nix::sys::statvfs::statvfs(path).ok()?;
    Some((stat.blocks_available() as u64).saturating_mul(stat.fragment_size() as u64))
}

#[cfg(not(unix))]
fn statvfs_space(_path: &Path) -> Option<u64> {
    None
}
