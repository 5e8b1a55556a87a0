//! Filesystem abstraction used by deployment and cleanup.
//!
//! Link creation and removal go through [`Filesystem`] so both can be
//! exercised against [`mock::MockFs`], which records every mutation.

pub mod mock;

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use tracing::trace;

use crate::error::Result;

/// The type of a directory entry, without following links.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
    Symlink,
}

impl From<std::fs::FileType> for EntryKind {
    fn from(ft: std::fs::FileType) -> Self {
        if ft.is_symlink() {
            Self::Symlink
        } else if ft.is_dir() {
            Self::Dir
        } else {
            Self::File
        }
    }
}

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: OsString,
    pub path: PathBuf,
    pub kind: EntryKind,
}

/// Operations the synchronizer and cleanup scanner need from the host.
pub trait Filesystem {
    /// Entry type at `path` without following a final link; `None` if absent.
    fn lstat(&self, path: &Path) -> Result<Option<EntryKind>>;

    /// Entry type at `path` following links; `None` if absent or dangling.
    fn stat(&self, path: &Path) -> Result<Option<EntryKind>>;

    /// Directory listing sorted by name. Entry kinds do not follow links.
    fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>>;

    fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// Remove a file or a symlink (never a directory).
    fn remove_file(&self, path: &Path) -> Result<()>;

    /// Create `link` pointing at `target`.
    fn symlink(&self, target: &Path, link: &Path) -> Result<()>;

    fn read_link(&self, path: &Path) -> Result<PathBuf>;

    /// Make `path` absolute without touching the filesystem.
    fn absolute(&self, path: &Path) -> Result<PathBuf>;
}

/// The host filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealFs;

fn absent_if_missing<T>(result: io::Result<T>) -> Result<Option<T>> {
    match result {
        Ok(v) => Ok(Some(v)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

impl Filesystem for RealFs {
    fn lstat(&self, path: &Path) -> Result<Option<EntryKind>> {
        Ok(absent_if_missing(std::fs::symlink_metadata(path))?.map(|m| m.file_type().into()))
    }

    fn stat(&self, path: &Path) -> Result<Option<EntryKind>> {
        Ok(absent_if_missing(std::fs::metadata(path))?.map(|m| m.file_type().into()))
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>> {
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(path)? {
            let entry = entry?;
            entries.push(DirEntry {
                name: entry.file_name(),
                path: entry.path(),
                kind: entry.file_type()?.into(),
            });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        trace!(path = %path.display(), "mkdir -p");
        Ok(std::fs::create_dir_all(path)?)
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        trace!(path = %path.display(), "unlink");
        Ok(std::fs::remove_file(path)?)
    }

    #[cfg(unix)]
    fn symlink(&self, target: &Path, link: &Path) -> Result<()> {
        trace!(target = %target.display(), link = %link.display(), "symlink");
        Ok(std::os::unix::fs::symlink(target, link)?)
    }

    #[cfg(not(unix))]
    fn symlink(&self, _target: &Path, _link: &Path) -> Result<()> {
        Err(io::Error::new(io::ErrorKind::Unsupported, "symlinks require a Unix host").into())
    }

    fn read_link(&self, path: &Path) -> Result<PathBuf> {
        Ok(std::fs::read_link(path)?)
    }

    fn absolute(&self, path: &Path) -> Result<PathBuf> {
        Ok(std::path::absolute(path)?)
    }
}
