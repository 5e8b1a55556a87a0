//! LevelDB-backed store reader.

use std::path::{Path, PathBuf};

use rusty_leveldb::{LdbIterator, Options, DB};
use tracing::{debug, info, instrument};

use super::{KvStore, StoreEntry};
use crate::error::{Result, VxError};

/// Read-only view over a LevelDB directory.
pub struct LevelDbStore {
    path: PathBuf,
    db: DB,
}

impl LevelDbStore {
    /// Opens an existing LevelDB directory. Never creates one.
    #[instrument(fields(path = %path.display()))]
    pub fn open(path: &Path) -> Result<Self> {
        if !path.is_dir() {
            return Err(VxError::PathNotFound {
                what: "Database directory",
                path: path.to_path_buf(),
            });
        }

        let opts = Options {
            create_if_missing: false,
            ..Options::default()
        };

        let db = DB::open(path, opts).map_err(|e| VxError::StoreOpen {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        info!("Opened database");
        Ok(Self {
            path: path.to_path_buf(),
            db,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KvStore for LevelDbStore {
    #[instrument(skip_all, fields(path = %self.path.display()))]
    fn for_each_entry(&mut self, visit: &mut dyn FnMut(StoreEntry)) -> Result<()> {
        let mut iter = self.db.new_iter().map_err(|e| VxError::StoreOpen {
            path: self.path.clone(),
            reason: format!("cannot iterate: {e}"),
        })?;

        let mut count = 0usize;
        while let Some((key, value)) = LdbIterator::next(&mut iter) {
            count += 1;
            visit(StoreEntry::new(key.to_vec(), value.to_vec()));
        }

        debug!(entries = count, "Database iteration complete");
        Ok(())
    }
}
