//! In-memory filesystem for unit testing.
//!
//! [`MockFs`] keeps a flat map of absolute paths to nodes, records every
//! mutating call and can be told to fail mutations at chosen paths.
//!
//! # Example
//!
//! ```rust,ignore
//! use vxl::fs::mock::{FsOp, MockFs};
//!
//! let fs = MockFs::new()
//!     .with_file("/staging/mod/a.dll")
//!     .with_dir("/game");
//!
//! sync(&fs, Path::new("/staging/mod"), Path::new("/game"), true)?;
//! fs.assert_no_mutations();
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Mutex;

use tracing::trace;

use super::{DirEntry, EntryKind, Filesystem};
use crate::error::Result;

/// Links followed before giving up, as on Linux.
const MAX_LINK_DEPTH: usize = 40;

/// A node in the mock tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    File,
    Dir,
    Symlink(PathBuf),
}

impl Node {
    const fn kind(&self) -> EntryKind {
        match self {
            Self::File => EntryKind::File,
            Self::Dir => EntryKind::Dir,
            Self::Symlink(_) => EntryKind::Symlink,
        }
    }
}

/// Recorded mutation for assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FsOp {
    CreateDirAll(PathBuf),
    RemoveFile(PathBuf),
    Symlink { target: PathBuf, link: PathBuf },
}

/// Mock filesystem rooted at `/`.
#[derive(Debug, Default)]
pub struct MockFs {
    nodes: Mutex<BTreeMap<PathBuf, Node>>,
    operation_log: Mutex<Vec<FsOp>>,
    failing_paths: Mutex<BTreeSet<PathBuf>>,
}

fn io_err(kind: io::ErrorKind, what: &str, path: &Path) -> crate::error::VxError {
    io::Error::new(kind, format!("{what}: {}", path.display())).into()
}

/// Lexically normalize an absolute path.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::from("/");
    for component in path.components() {
        match component {
            Component::Normal(part) => out.push(part),
            Component::ParentDir => {
                out.pop();
            }
            Component::RootDir | Component::CurDir | Component::Prefix(_) => {}
        }
    }
    out
}

impl MockFs {
    pub fn new() -> Self {
        Self::default()
    }

    // === Setup (not recorded) ===

    fn insert_with_parents(&self, path: &Path, node: Node) {
        let path = normalize(path);
        let mut nodes = self.nodes.lock().unwrap();
        for ancestor in path.ancestors().skip(1) {
            if ancestor != Path::new("/") {
                nodes.entry(ancestor.to_path_buf()).or_insert(Node::Dir);
            }
        }
        nodes.insert(path, node);
    }

    #[must_use]
    pub fn with_dir(self, path: impl AsRef<Path>) -> Self {
        self.insert_with_parents(path.as_ref(), Node::Dir);
        self
    }

    #[must_use]
    pub fn with_file(self, path: impl AsRef<Path>) -> Self {
        self.insert_with_parents(path.as_ref(), Node::File);
        self
    }

    #[must_use]
    pub fn with_symlink(self, link: impl AsRef<Path>, target: impl AsRef<Path>) -> Self {
        self.insert_with_parents(link.as_ref(), Node::Symlink(target.as_ref().to_path_buf()));
        self
    }

    /// Make every mutation of `path` fail.
    pub fn fail_at(&self, path: impl AsRef<Path>) {
        self.failing_paths
            .lock()
            .unwrap()
            .insert(normalize(path.as_ref()));
    }

    // === Inspection ===

    pub fn node(&self, path: impl AsRef<Path>) -> Option<Node> {
        self.nodes
            .lock()
            .unwrap()
            .get(&normalize(path.as_ref()))
            .cloned()
    }

    /// Copy of the whole tree.
    pub fn tree(&self) -> BTreeMap<PathBuf, Node> {
        self.nodes.lock().unwrap().clone()
    }

    pub fn operations(&self) -> Vec<FsOp> {
        self.operation_log.lock().unwrap().clone()
    }

    pub fn clear_operations(&self) {
        self.operation_log.lock().unwrap().clear();
    }

    /// # Panics
    ///
    /// Panics if any mutation was recorded.
    pub fn assert_no_mutations(&self) {
        let ops = self.operations();
        assert!(ops.is_empty(), "Expected no mutations, but found: {ops:#?}");
    }

    // === Internal Helpers ===

    fn record_op(&self, op: FsOp) {
        trace!(?op, "Recording mock fs operation");
        self.operation_log.lock().unwrap().push(op);
    }

    fn check_failure(&self, path: &Path) -> Result<()> {
        if self.failing_paths.lock().unwrap().contains(path) {
            return Err(io_err(io::ErrorKind::PermissionDenied, "Mock failure", path));
        }
        Ok(())
    }

    /// Follow links at `path` until a non-link node; `None` if dangling.
    fn resolve(&self, path: &Path) -> Option<(PathBuf, Node)> {
        let nodes = self.nodes.lock().unwrap();
        let mut current = normalize(path);
        for _ in 0..MAX_LINK_DEPTH {
            if current == Path::new("/") {
                return Some((current, Node::Dir));
            }
            match nodes.get(&current)? {
                Node::Symlink(target) => {
                    let parent = current.parent().unwrap_or_else(|| Path::new("/"));
                    current = normalize(&parent.join(target));
                }
                node => return Some((current, node.clone())),
            }
        }
        None
    }
}

impl Filesystem for MockFs {
    fn lstat(&self, path: &Path) -> Result<Option<EntryKind>> {
        let path = normalize(path);
        if path == Path::new("/") {
            return Ok(Some(EntryKind::Dir));
        }
        Ok(self.nodes.lock().unwrap().get(&path).map(Node::kind))
    }

    fn stat(&self, path: &Path) -> Result<Option<EntryKind>> {
        Ok(self.resolve(path).map(|(_, node)| node.kind()))
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>> {
        let listed = normalize(path);
        let real = match self.resolve(&listed) {
            Some((real, Node::Dir)) => real,
            Some(_) => return Err(io_err(io::ErrorKind::NotADirectory, "Not a directory", path)),
            None => return Err(io_err(io::ErrorKind::NotFound, "No such directory", path)),
        };

        let nodes = self.nodes.lock().unwrap();
        Ok(nodes
            .iter()
            .filter(|(p, _)| p.parent() == Some(real.as_path()))
            .filter_map(|(p, node)| {
                let name = p.file_name()?.to_os_string();
                Some(DirEntry {
                    path: listed.join(&name),
                    name,
                    kind: node.kind(),
                })
            })
            .collect())
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        let path = normalize(path);
        self.check_failure(&path)?;
        self.record_op(FsOp::CreateDirAll(path.clone()));

        let mut nodes = self.nodes.lock().unwrap();
        let mut chain: Vec<&Path> = path.ancestors().collect();
        chain.reverse();
        for dir in chain.into_iter().skip(1) {
            match nodes.get(dir) {
                None => {
                    nodes.insert(dir.to_path_buf(), Node::Dir);
                }
                Some(Node::Dir) => {}
                Some(_) => return Err(io_err(io::ErrorKind::AlreadyExists, "File exists", dir)),
            }
        }
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        let path = normalize(path);
        self.check_failure(&path)?;
        self.record_op(FsOp::RemoveFile(path.clone()));

        let mut nodes = self.nodes.lock().unwrap();
        match nodes.get(&path) {
            None => Err(io_err(io::ErrorKind::NotFound, "No such file", &path)),
            Some(Node::Dir) => Err(io_err(io::ErrorKind::IsADirectory, "Is a directory", &path)),
            Some(_) => {
                nodes.remove(&path);
                Ok(())
            }
        }
    }

    fn symlink(&self, target: &Path, link: &Path) -> Result<()> {
        let link = normalize(link);
        self.check_failure(&link)?;
        self.record_op(FsOp::Symlink {
            target: target.to_path_buf(),
            link: link.clone(),
        });

        let parent_ok = link
            .parent()
            .is_some_and(|p| p == Path::new("/") || self.nodes.lock().unwrap().get(p) == Some(&Node::Dir));
        if !parent_ok {
            return Err(io_err(io::ErrorKind::NotFound, "No such directory", &link));
        }

        let mut nodes = self.nodes.lock().unwrap();
        if nodes.contains_key(&link) {
            return Err(io_err(io::ErrorKind::AlreadyExists, "File exists", &link));
        }
        nodes.insert(link, Node::Symlink(target.to_path_buf()));
        Ok(())
    }

    fn read_link(&self, path: &Path) -> Result<PathBuf> {
        match self.nodes.lock().unwrap().get(&normalize(path)) {
            Some(Node::Symlink(target)) => Ok(target.clone()),
            _ => Err(io_err(io::ErrorKind::InvalidInput, "Not a symlink", path)),
        }
    }

    fn absolute(&self, path: &Path) -> Result<PathBuf> {
        Ok(normalize(&Path::new("/").join(path)))
    }
}
