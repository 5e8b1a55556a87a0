//! Finding the live database and checking that nobody else is writing to it.

use std::path::{Path, PathBuf};

use tracing::{debug, instrument, warn};

use crate::config::{expand_home, Config};
use crate::error::{Result, VxError};

/// Resolve the database directory to read.
///
/// An explicit override wins and must exist. Otherwise the configured live
/// path is tried first, then the local fallback copy.
#[instrument(skip(config))]
pub fn locate_store(config: &Config, override_path: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = override_path {
        let path = expand_home(path)?;
        if path.is_dir() {
            debug!(path = %path.display(), "Using database override");
            return Ok(path);
        }
        return Err(VxError::StoreNotFound {
            candidates: vec![path],
        });
    }

    let live = expand_home(&config.store.path)?;
    if live.is_dir() {
        debug!(path = %live.display(), "Using live database");
        return Ok(live);
    }

    let fallback = expand_home(&config.store.fallback_path)?;
    if fallback.is_dir() {
        warn!(
            fallback = %fallback.display(),
            live = %live.display(),
            "Using local database copy instead of the live one"
        );
        return Ok(fallback);
    }

    Err(VxError::StoreNotFound {
        candidates: vec![live, fallback],
    })
}

/// Refuse to proceed while another process holds the database.
///
/// The check is a precondition, not a retry point: the caller must stop.
pub fn check_external_writer(store_dir: &Path, sentinel: &str) -> Result<()> {
    if sentinel.is_empty() {
        return Ok(());
    }
    let marker = store_dir.join(sentinel);
    if marker.symlink_metadata().is_ok() {
        warn!(sentinel = %marker.display(), "Database is held by another process");
        return Err(VxError::ExternalWriterDetected { sentinel: marker });
    }
    Ok(())
}
