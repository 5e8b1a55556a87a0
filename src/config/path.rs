//! Path resolution helpers for configuration values.
//!
//! Supports absolute paths, paths relative to the config file, and "~" home
//! directory expansion.

use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::error::{Result, VxError};

/// Resolve a path from a config file.
///
/// Resolution rules:
/// 1. Absolute paths: used as-is
/// 2. Paths starting with `~`: expanded to home directory
/// 3. Relative paths: resolved relative to `base_dir`
pub fn resolve_path(path: &Path, base_dir: &Path) -> Result<PathBuf> {
    trace!(
        path = %path.display(),
        base_dir = %base_dir.display(),
        "Resolving path"
    );

    if let Some(expanded) = try_expand_home(path)? {
        return Ok(expanded);
    }

    if path.is_absolute() {
        debug!(path = %path.display(), "Using absolute path as-is");
        return Ok(path.to_path_buf());
    }

    let resolved = base_dir.join(path);
    debug!(
        original = %path.display(),
        resolved = %resolved.display(),
        "Resolved relative path"
    );
    Ok(resolved)
}

/// Expand a leading `~` and leave every other path untouched.
pub fn expand_home(path: &Path) -> Result<PathBuf> {
    Ok(try_expand_home(path)?.unwrap_or_else(|| path.to_path_buf()))
}

fn try_expand_home(path: &Path) -> Result<Option<PathBuf>> {
    let path_str = path.to_string_lossy();
    if path_str != "~" && !path_str.starts_with("~/") {
        return Ok(None);
    }

    let home = home_dir()?;
    let rest = path_str.strip_prefix("~/").unwrap_or("");
    let resolved = if rest.is_empty() { home } else { home.join(rest) };
    debug!(
        original = %path.display(),
        resolved = %resolved.display(),
        "Expanded home directory path"
    );
    Ok(Some(resolved))
}

/// Resolve the user's home directory (cross-platform).
pub fn home_dir() -> Result<PathBuf> {
    dirs::home_dir()
        .ok_or_else(|| VxError::ConfigParse("Could not determine home directory".to_string()))
}
