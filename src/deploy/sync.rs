//! Mirroring a staging directory into a destination tree with symlinks.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::error::Result;
use crate::fs::{EntryKind, Filesystem};

/// A link (or directory) that could not be put in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// Result of one [`sync`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncOutcome {
    /// Links created, or that would be created in a dry run.
    pub created: Vec<PathBuf>,
    pub failures: Vec<LinkFailure>,
}

impl SyncOutcome {
    fn fail(&mut self, path: PathBuf, reason: impl ToString) {
        let reason = reason.to_string();
        warn!(path = %path.display(), %reason, "Link failed");
        self.failures.push(LinkFailure { path, reason });
    }
}

/// Make sure `dir` is a real directory, replacing a file or link in its way.
///
/// Returns `None` (after recording why) when the directory cannot be used,
/// otherwise whether the directory is new. In a dry run a new directory
/// exists only in the plan, so nothing below it is looked up.
fn ensure_dir(
    fs: &dyn Filesystem,
    dir: &Path,
    parent_is_new: bool,
    dry_run: bool,
    outcome: &mut SyncOutcome,
) -> Option<bool> {
    if dry_run && parent_is_new {
        return Some(true);
    }
    let existing = match fs.lstat(dir) {
        Ok(kind) => kind,
        Err(e) => {
            outcome.fail(dir.to_path_buf(), e);
            return None;
        }
    };
    if existing == Some(EntryKind::Dir) {
        return Some(false);
    }
    if dry_run {
        return Some(true);
    }
    if existing.is_some() {
        debug!(path = %dir.display(), "Replacing non-directory with directory");
        if let Err(e) = fs.remove_file(dir) {
            outcome.fail(dir.to_path_buf(), e);
            return None;
        }
    }
    if let Err(e) = fs.create_dir_all(dir) {
        outcome.fail(dir.to_path_buf(), e);
        return None;
    }
    Some(true)
}

/// Link every file under `source` to the same relative path under `dest`.
///
/// Directories are mirrored as real directories; files become symlinks to
/// their absolute source path, replacing whatever file or link was there.
/// A real directory in the place of a file is left alone and reported.
/// With `dry_run` nothing is mutated and `created` lists exactly the links a
/// real run would create.
#[instrument(skip(fs), fields(source = %source.display(), dest = %dest.display()))]
pub fn sync(fs: &dyn Filesystem, source: &Path, dest: &Path, dry_run: bool) -> Result<SyncOutcome> {
    let mut outcome = SyncOutcome::default();
    if fs.stat(source)? != Some(EntryKind::Dir) {
        debug!("Source is not a directory, nothing to link");
        return Ok(outcome);
    }
    let source = fs.absolute(source)?;

    let mut pending = vec![(source, dest.to_path_buf(), false)];
    while let Some((src_dir, dst_dir, parent_is_new)) = pending.pop() {
        let Some(is_new) = ensure_dir(fs, &dst_dir, parent_is_new, dry_run, &mut outcome) else {
            continue;
        };

        let entries = match fs.read_dir(&src_dir) {
            Ok(entries) => entries,
            Err(e) => {
                outcome.fail(src_dir, e);
                continue;
            }
        };

        // Reverse so the worklist pops subdirectories in name order.
        let mut subdirs = Vec::new();
        for entry in entries {
            let target = dst_dir.join(&entry.name);
            let follows_to_dir = match entry.kind {
                EntryKind::Dir => true,
                EntryKind::Symlink => fs.stat(&entry.path).ok().flatten() == Some(EntryKind::Dir),
                EntryKind::File => false,
            };
            if follows_to_dir {
                subdirs.push((entry.path, target, is_new));
                continue;
            }

            let existing = if dry_run && is_new {
                Ok(None)
            } else {
                fs.lstat(&target)
            };
            match existing {
                Ok(Some(EntryKind::Dir)) => {
                    outcome.fail(target, "a directory is in the way");
                    continue;
                }
                Ok(Some(_)) if !dry_run => {
                    if let Err(e) = fs.remove_file(&target) {
                        outcome.fail(target, e);
                        continue;
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    outcome.fail(target, e);
                    continue;
                }
            }

            if !dry_run {
                if let Err(e) = fs.symlink(&entry.path, &target) {
                    outcome.fail(target, e);
                    continue;
                }
            }
            outcome.created.push(target);
        }
        pending.extend(subdirs.into_iter().rev());
    }

    debug!(
        created = outcome.created.len(),
        failures = outcome.failures.len(),
        dry_run,
        "Sync finished"
    );
    Ok(outcome)
}
