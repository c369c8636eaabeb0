//! Thread-safe trie handle.

use parking_lot::RwLock;

use crate::crypto::Hash;
use crate::store::{KvStore, StoreResult};
use crate::trie::Trie;

/// One trie behind a read/write lock.
///
/// Reads and root computation take the read lock and may run concurrently;
/// writes, commit, and cancel serialize behind the write lock. The lock is
/// per-tree, so traffic against one tree never blocks another.
pub struct MerkleTree {
    inner: RwLock<Trie>,
}

impl MerkleTree {
    pub fn new(store: Box<dyn KvStore>) -> Self {
        Self {
            inner: RwLock::new(Trie::new(store)),
        }
    }

    pub fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        self.inner.read().get(key)
    }

    pub fn put(&self, key: &[u8], value: &[u8]) {
        self.inner.write().put(key, value);
    }

    pub fn root_hash(&self) -> StoreResult<Hash> {
        self.inner.read().root_hash()
    }

    pub fn commit(&self) -> StoreResult<()> {
        self.inner.write().commit()
    }

    pub fn cancel(&self) {
        self.inner.write().abort();
    }

    pub fn is_dirty(&self) -> bool {
        self.inner.read().is_dirty()
    }

    pub fn close(&self) -> StoreResult<()> {
        self.inner.write().close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use std::sync::Arc;
    use std::thread;

    fn memory_tree() -> MerkleTree {
        MerkleTree::new(Box::new(MemoryStore::new()))
    }

    #[test]
    fn put_get_commit() {
        let tree = memory_tree();
        tree.put(b"k", b"v");
        assert!(tree.is_dirty());
        tree.commit().unwrap();
        assert!(!tree.is_dirty());
        assert_eq!(tree.get(b"k").unwrap(), Some(b"v".to_vec()));
    }

    #[test]
    fn cancel_reverts_staged_writes() {
        let tree = memory_tree();
        tree.put(b"k", b"v");
        tree.cancel();
        assert_eq!(tree.get(b"k").unwrap(), None);
        assert!(tree.root_hash().unwrap().is_zero());
    }

    #[test]
    fn concurrent_readers_and_writers() {
        let tree = Arc::new(memory_tree());
        let mut handles = Vec::new();
        for i in 0u8..4 {
            let tree = Arc::clone(&tree);
            handles.push(thread::spawn(move || {
                for j in 0u8..50 {
                    tree.put(&[i, j], b"v");
                    let _ = tree.root_hash().unwrap();
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        tree.commit().unwrap();
        assert_eq!(tree.get(&[3, 49]).unwrap(), Some(b"v".to_vec()));
    }
}
