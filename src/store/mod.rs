//! Access to the mod manager's key-value state store.
//!
//! The registry only needs a forward, read-only iteration over raw
//! `(key, value)` byte pairs, so the store is hidden behind [`KvStore`].
//! [`LevelDbStore`] reads Vortex's `state.v2` LevelDB directory and
//! [`MemoryStore`] backs unit tests.

mod leveldb;
mod locate;
mod snapshot;

pub use leveldb::LevelDbStore;
pub use locate::{check_external_writer, locate_store};
pub use snapshot::{open_store, prepare_snapshot, StoreHandle};

use crate::error::Result;

/// One raw entry as yielded by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreEntry {
    pub key: Vec<u8>,
    pub value: Vec<u8>,
}

impl StoreEntry {
    pub fn new(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Read-only, ordered iteration over a key-value store.
///
/// Implementations yield every entry exactly once per call in their own
/// iteration order; callers must not assume any semantic ordering.
pub trait KvStore {
    /// Visit every entry in store order.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store cannot be iterated.
    fn for_each_entry(&mut self, visit: &mut dyn FnMut(StoreEntry)) -> Result<()>;

    /// Collect all entries into memory.
    fn entries(&mut self) -> Result<Vec<StoreEntry>> {
        let mut out = Vec::new();
        self.for_each_entry(&mut |entry| out.push(entry))?;
        Ok(out)
    }
}

/// In-memory store preserving insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Vec<StoreEntry>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a UTF-8 key with a raw value.
    pub fn insert(&mut self, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) {
        self.entries.push(StoreEntry::new(key, value));
    }

    /// Builder-style [`MemoryStore::insert`].
    #[must_use]
    pub fn with(mut self, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<StoreEntry> for MemoryStore {
    fn from_iter<I: IntoIterator<Item = StoreEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl KvStore for MemoryStore {
    fn for_each_entry(&mut self, visit: &mut dyn FnMut(StoreEntry)) -> Result<()> {
        for entry in &self.entries {
            visit(entry.clone());
        }
        Ok(())
    }
}
