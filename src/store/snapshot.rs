//! Snapshot copies of the live database.
//!
//! Opening LevelDB is not a pure read: recovery may rewrite the log and
//! manifest. Reads therefore go through a private copy that is thrown away
//! and rebuilt on every invocation.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use super::{check_external_writer, locate_store, KvStore, LevelDbStore, StoreEntry};
use crate::config::Config;
use crate::error::{Result, VxError};

/// LevelDB's own lock file; never copied into a snapshot.
const LEVELDB_LOCK: &str = "LOCK";

/// An opened store plus where it came from.
pub struct StoreHandle {
    /// The database directory that was located.
    pub live_path: PathBuf,
    /// The directory actually opened (the snapshot, unless disabled).
    pub read_path: PathBuf,
    store: LevelDbStore,
}

impl StoreHandle {
    pub fn is_snapshot(&self) -> bool {
        self.live_path != self.read_path
    }
}

impl KvStore for StoreHandle {
    fn for_each_entry(&mut self, visit: &mut dyn FnMut(StoreEntry)) -> Result<()> {
        self.store.for_each_entry(visit)
    }
}

/// Locate, lock-check and open the database.
///
/// With `use_snapshot` the located directory is copied into the configured
/// snapshot directory first and the copy is opened.
#[instrument(skip(config))]
pub fn open_store(
    config: &Config,
    override_path: Option<&Path>,
    use_snapshot: bool,
) -> Result<StoreHandle> {
    let live_path = locate_store(config, override_path)?;
    check_external_writer(&live_path, &config.store.lock_sentinel)?;

    let read_path = if use_snapshot {
        prepare_snapshot(&live_path, &config.snapshot_dir()?, &config.store.lock_sentinel)?
    } else {
        warn!(path = %live_path.display(), "Reading the database in place");
        live_path.clone()
    };

    let store = LevelDbStore::open(&read_path)?;
    Ok(StoreHandle {
        live_path,
        read_path,
        store,
    })
}

/// Replace `snapshot_dir` with a fresh copy of `live`.
#[instrument(fields(live = %live.display(), snapshot = %snapshot_dir.display()))]
pub fn prepare_snapshot(live: &Path, snapshot_dir: &Path, sentinel: &str) -> Result<PathBuf> {
    let fail = |reason: String| VxError::SnapshotFailed {
        source_path: live.to_path_buf(),
        snapshot: snapshot_dir.to_path_buf(),
        reason,
    };

    let live_abs = std::path::absolute(live)?;
    let snap_abs = std::path::absolute(snapshot_dir)?;
    if snap_abs.starts_with(&live_abs) || live_abs.starts_with(&snap_abs) {
        return Err(fail("snapshot directory overlaps the database".to_string()));
    }

    if snapshot_dir.symlink_metadata().is_ok() {
        debug!("Discarding previous snapshot");
        fs::remove_dir_all(snapshot_dir).map_err(|e| fail(e.to_string()))?;
    }
    fs::create_dir_all(snapshot_dir).map_err(|e| fail(e.to_string()))?;

    let mut copied = 0usize;
    let mut pending = vec![(live.to_path_buf(), snapshot_dir.to_path_buf())];
    while let Some((src_dir, dst_dir)) = pending.pop() {
        for entry in fs::read_dir(&src_dir).map_err(|e| fail(e.to_string()))? {
            let entry = entry.map_err(|e| fail(e.to_string()))?;
            let name = entry.file_name();
            if name == LEVELDB_LOCK || (!sentinel.is_empty() && name == sentinel) {
                continue;
            }

            let src = entry.path();
            let dst = dst_dir.join(&name);
            let file_type = entry.file_type().map_err(|e| fail(e.to_string()))?;
            if file_type.is_dir() {
                fs::create_dir_all(&dst).map_err(|e| fail(e.to_string()))?;
                pending.push((src, dst));
            } else {
                fs::copy(&src, &dst).map_err(|e| fail(format!("{}: {e}", src.display())))?;
                copied += 1;
            }
        }
    }

    info!(files = copied, "Database snapshot ready");
    Ok(snapshot_dir.to_path_buf())
}
