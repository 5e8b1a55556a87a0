//! Command reports that are not produced by a library operation.
//!
//! Everything a command prints is a `Serialize` value, so robot mode and
//! `--output FILE` share one shape.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::config::Config;
use crate::error::Result;

/// A configured path and whether it is there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathStatus {
    pub path: PathBuf,
    pub exists: bool,
}

impl PathStatus {
    pub fn check(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let exists = path.exists();
        Self { path, exists }
    }
}

/// Resolved configuration plus the state of the paths it names.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigReport {
    /// File the values were loaded from; `None` means built-in defaults.
    pub config_file: Option<PathBuf>,
    pub config: Config,
    pub live_store: PathStatus,
    pub fallback_store: PathStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game_path: Option<PathStatus>,
    /// The database a command would read, or why none was found.
    pub resolved_store: std::result::Result<PathBuf, String>,
    pub snapshot_dir: PathBuf,
}

/// Build metadata for `vxl version`.
#[derive(Debug, Clone, Serialize)]
pub struct VersionInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub git_sha: &'static str,
    pub git_dirty: bool,
    pub build_timestamp: &'static str,
    pub rustc_version: &'static str,
    pub target: &'static str,
}

/// Write `report` as pretty JSON to `path`.
pub fn write_report_file<T: Serialize + ?Sized>(path: &Path, report: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut json = serde_json::to_string_pretty(report)?;
    json.push('\n');
    fs::write(path, json)?;
    info!(path = %path.display(), "Report written");
    Ok(())
}
