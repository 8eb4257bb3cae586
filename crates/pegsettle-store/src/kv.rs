//! Ordered byte-key storage.

use std::collections::BTreeMap;

/// One stored `(key, value)` pair.
pub type KvPair = (Vec<u8>, Vec<u8>);

/// Ordered iterator over a key range.
pub type KvIter<'a> = Box<dyn Iterator<Item = KvPair> + 'a>;

/// Point get/set plus prefix-ordered iteration.
///
/// Implementations are scoped to one block by the ledger runtime; this
/// crate never persists anything itself.
pub trait KvStore {
    fn get(&self, key: &[u8]) -> Option<Vec<u8>>;

    fn set(&mut self, key: &[u8], value: Vec<u8>);

    fn delete(&mut self, key: &[u8]);

    /// All entries whose key starts with `prefix`, in ascending key order.
    /// An empty prefix yields the whole store.
    fn iterate<'a>(&'a self, prefix: &[u8]) -> KvIter<'a>;

    fn has(&self, key: &[u8]) -> bool {
        self.get(key).is_some()
    }
}

/// `BTreeMap`-backed store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemStore {
    entries: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl MemStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KvStore for MemStore {
    fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &[u8], value: Vec<u8>) {
        self.entries.insert(key.to_vec(), value);
    }

    fn delete(&mut self, key: &[u8]) {
        self.entries.remove(key);
    }

    fn iterate<'a>(&'a self, prefix: &[u8]) -> KvIter<'a> {
        let prefix = prefix.to_vec();
        Box::new(
            self.entries
                .range(prefix.clone()..)
                .take_while(move |(k, _)| k.starts_with(&prefix))
                .map(|(k, v)| (k.clone(), v.clone())),
        )
    }
}

/// Write buffer layered over a parent store.
///
/// Reads see buffered writes first. Nothing reaches the parent until the
/// buffer is taken with [`CacheStore::into_writes`] and applied.
pub struct CacheStore<'p> {
    parent: &'p dyn KvStore,
    writes: BTreeMap<Vec<u8>, Option<Vec<u8>>>,
}

impl<'p> CacheStore<'p> {
    #[must_use]
    pub fn new(parent: &'p dyn KvStore) -> Self {
        Self {
            parent,
            writes: BTreeMap::new(),
        }
    }

    /// Buffered writes in key order; `None` marks a deletion.
    #[must_use]
    pub fn into_writes(self) -> BTreeMap<Vec<u8>, Option<Vec<u8>>> {
        self.writes
    }

    #[must_use]
    pub fn pending(&self) -> usize {
        self.writes.len()
    }
}

impl KvStore for CacheStore<'_> {
    fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        match self.writes.get(key) {
            Some(buffered) => buffered.clone(),
            None => self.parent.get(key),
        }
    }

    fn set(&mut self, key: &[u8], value: Vec<u8>) {
        self.writes.insert(key.to_vec(), Some(value));
    }

    fn delete(&mut self, key: &[u8]) {
        self.writes.insert(key.to_vec(), None);
    }

    fn iterate<'a>(&'a self, prefix: &[u8]) -> KvIter<'a> {
        let mut merged: BTreeMap<Vec<u8>, Vec<u8>> = self.parent.iterate(prefix).collect();
        let buffered = self
            .writes
            .range(prefix.to_vec()..)
            .take_while(|(k, _)| k.starts_with(prefix));
        for (key, value) in buffered {
            match value {
                Some(v) => {
                    merged.insert(key.clone(), v.clone());
                }
                None => {
                    merged.remove(key);
                }
            }
        }
        Box::new(merged.into_iter())
    }
}

/// Apply buffered writes to `target`.
pub fn apply_writes(target: &mut dyn KvStore, writes: BTreeMap<Vec<u8>, Option<Vec<u8>>>) {
    for (key, value) in writes {
        match value {
            Some(v) => target.set(&key, v),
            None => target.delete(&key),
        }
    }
}
