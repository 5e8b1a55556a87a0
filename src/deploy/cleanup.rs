//! Finding and removing deployed symlinks.
//!
//! Only symlinks are ever removed. Scans never descend into a linked
//! directory, so a link pointing back into the staging area cannot pull
//! staged files into the removal set.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::error::Result;
use crate::fs::{EntryKind, Filesystem};

/// Collect the symlinks under `root`, sorted.
///
/// Without `recursive` only the direct children of `root` are checked. A
/// missing root, or a root that is itself a link, yields nothing. Unreadable
/// subdirectories are logged and skipped.
#[instrument(skip(fs), fields(root = %root.display()))]
pub fn find_links(fs: &dyn Filesystem, root: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    if fs.lstat(root)? != Some(EntryKind::Dir) {
        debug!("Scan root is not a directory");
        return Ok(Vec::new());
    }

    let mut links = Vec::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        let entries = match fs.read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if dir.as_path() != root => {
                warn!(dir = %dir.display(), error = %e, "Skipping unreadable directory");
                continue;
            }
            Err(e) => return Err(e),
        };
        for entry in entries {
            match entry.kind {
                EntryKind::Symlink => links.push(entry.path),
                EntryKind::Dir if recursive => pending.push(entry.path),
                EntryKind::Dir | EntryKind::File => {}
            }
        }
    }

    links.sort();
    debug!(found = links.len(), "Link scan finished");
    Ok(links)
}

/// A link that could not be removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemovalFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// Result of one [`remove_links`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RemovalOutcome {
    /// Links removed, or that would be removed in a dry run.
    pub removed: Vec<PathBuf>,
    pub failures: Vec<RemovalFailure>,
}

/// Remove each path that is still a symlink.
///
/// Every path is re-checked right before removal: anything that is no
/// longer a symlink is recorded as a failure and left in place. A failure
/// never stops the batch.
#[instrument(skip(fs, paths), fields(count = paths.len()))]
pub fn remove_links(fs: &dyn Filesystem, paths: &[PathBuf], dry_run: bool) -> RemovalOutcome {
    let mut outcome = RemovalOutcome::default();
    for path in paths {
        let result = match fs.lstat(path) {
            Ok(Some(EntryKind::Symlink)) if dry_run => Ok(()),
            Ok(Some(EntryKind::Symlink)) => fs.remove_file(path).map_err(|e| e.to_string()),
            Ok(Some(_)) => Err("no longer a symlink".to_string()),
            Ok(None) => Err("no longer exists".to_string()),
            Err(e) => Err(e.to_string()),
        };
        match result {
            Ok(()) => outcome.removed.push(path.clone()),
            Err(reason) => {
                warn!(path = %path.display(), %reason, "Not removed");
                outcome.failures.push(RemovalFailure {
                    path: path.clone(),
                    reason,
                });
            }
        }
    }
    outcome
}
