//! # Staged Merkle Trie
//!
//! A key/value trie with a two-phase write path: `put` stages entries in an
//! overlay, `commit` flushes them to the backing store, `abort` drops them.
//! Reads and root computation see the overlay immediately — a reader never
//! observes a root that excludes writes it just made through the same
//! handle.
//!
//! The commitment is a binary merkle root over the sorted leaf set, each
//! leaf being the keyed hash of one entry. Deterministic for a given
//! key/value set regardless of insertion order, and stable across process
//! restarts because the backing store is the source of truth for committed
//! entries.

use std::collections::BTreeMap;

use crate::crypto::{blake3_hash_multi, merkle_root, Hash};
use crate::store::{KvStore, StoreResult};

/// A staged-overlay trie over a backing store.
pub struct Trie {
    store: Box<dyn KvStore>,
    staged: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl Trie {
    pub fn new(store: Box<dyn KvStore>) -> Self {
        Self {
            store,
            staged: BTreeMap::new(),
        }
    }

    /// Read a value, staged writes first.
    pub fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        if let Some(value) = self.staged.get(key) {
            return Ok(Some(value.clone()));
        }
        self.store.get(key)
    }

    /// Stage a write. Visible to `get` and `root_hash` immediately;
    /// durable only after `commit`.
    pub fn put(&mut self, key: &[u8], value: &[u8]) {
        self.staged.insert(key.to_vec(), value.to_vec());
    }

    /// The merkle commitment over committed entries merged with the staged
    /// overlay. Staged writes shadow committed ones under the same key.
    /// Empty trie commits to the zero hash.
    pub fn root_hash(&self) -> StoreResult<Hash> {
        let mut merged: BTreeMap<Vec<u8>, Vec<u8>> = BTreeMap::new();
        self.store.scan(&mut |key, value| {
            merged.insert(key.to_vec(), value.to_vec());
            true
        })?;
        for (key, value) in &self.staged {
            merged.insert(key.clone(), value.clone());
        }

        // BTreeMap iterates in key order, so the leaf sequence is already
        // canonical.
        let leaves: Vec<[u8; 32]> = merged
            .iter()
            .map(|(key, value)| blake3_hash_multi(&[key.as_slice(), value.as_slice()]))
            .collect();
        Ok(Hash::new(merkle_root(&leaves)))
    }

    /// Flush staged writes to the backing store. On failure the overlay is
    /// kept intact so the caller can retry or abort.
    pub fn commit(&mut self) -> StoreResult<()> {
        for (key, value) in &self.staged {
            self.store.put(key, value)?;
        }
        self.staged.clear();
        Ok(())
    }

    /// Drop every staged write.
    pub fn abort(&mut self) {
        self.staged.clear();
    }

    pub fn is_dirty(&self) -> bool {
        !self.staged.is_empty()
    }

    pub fn close(&mut self) -> StoreResult<()> {
        self.store.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn memory_trie() -> Trie {
        Trie::new(Box::new(MemoryStore::new()))
    }

    #[test]
    fn empty_root_is_zero() {
        let trie = memory_trie();
        assert!(trie.root_hash().unwrap().is_zero());
    }

    #[test]
    fn staged_writes_are_readable_before_commit() {
        let mut trie = memory_trie();
        trie.put(b"k", b"v");
        assert!(trie.is_dirty());
        assert_eq!(trie.get(b"k").unwrap(), Some(b"v".to_vec()));
    }

    #[test]
    fn root_sees_staged_writes() {
        let mut trie = memory_trie();
        let empty = trie.root_hash().unwrap();
        trie.put(b"k", b"v");
        let staged = trie.root_hash().unwrap();
        assert_ne!(empty, staged);

        // Committing the same content does not move the root.
        trie.commit().unwrap();
        assert_eq!(trie.root_hash().unwrap(), staged);
    }

    #[test]
    fn root_is_order_independent() {
        let mut a = memory_trie();
        a.put(b"x", b"1");
        a.put(b"y", b"2");

        let mut b = memory_trie();
        b.put(b"y", b"2");
        b.put(b"x", b"1");

        assert_eq!(a.root_hash().unwrap(), b.root_hash().unwrap());
    }

    #[test]
    fn staged_write_shadows_committed_value() {
        let mut trie = memory_trie();
        trie.put(b"k", b"old");
        trie.commit().unwrap();
        trie.put(b"k", b"new");
        assert_eq!(trie.get(b"k").unwrap(), Some(b"new".to_vec()));
    }

    #[test]
    fn abort_discards_staged_writes() {
        let mut trie = memory_trie();
        trie.put(b"keep", b"1");
        trie.commit().unwrap();
        let committed = trie.root_hash().unwrap();

        trie.put(b"drop", b"2");
        assert_ne!(trie.root_hash().unwrap(), committed);
        trie.abort();
        assert!(!trie.is_dirty());
        assert_eq!(trie.root_hash().unwrap(), committed);
        assert_eq!(trie.get(b"drop").unwrap(), None);
    }

    #[test]
    fn commit_persists_to_shared_backing() {
        let store = MemoryStore::new();
        let mut trie = Trie::new(Box::new(store.clone()));
        trie.put(b"k", b"v");
        trie.commit().unwrap();

        // A fresh handle over the same backing sees the committed entry
        // and computes the same root.
        let reopened = Trie::new(Box::new(store));
        assert_eq!(reopened.get(b"k").unwrap(), Some(b"v".to_vec()));
        assert_eq!(reopened.root_hash().unwrap(), trie.root_hash().unwrap());
    }

    #[test]
    fn uncommitted_writes_do_not_reach_the_backing() {
        let store = MemoryStore::new();
        let mut trie = Trie::new(Box::new(store.clone()));
        trie.put(b"k", b"v");
        assert_eq!(store.get(b"k").unwrap(), None);
        trie.commit().unwrap();
        assert_eq!(store.get(b"k").unwrap(), Some(b"v".to_vec()));
    }
}
