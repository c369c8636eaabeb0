//! In-memory backing store.

use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::{KvStore, StoreResult};

/// A map-backed store. Clones share the same underlying map, so a "fresh
/// handle over the same backing" is expressible in-memory the same way a
/// reopened on-disk store is.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<BTreeMap<Vec<u8>, Vec<u8>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> StoreResult<()> {
        self.entries.write().insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn remove(&mut self, key: &[u8]) -> StoreResult<()> {
        self.entries.write().remove(key);
        Ok(())
    }

    fn scan(&self, visit: &mut dyn FnMut(&[u8], &[u8]) -> bool) -> StoreResult<()> {
        for (key, value) in self.entries.read().iter() {
            if !visit(key, value) {
                break;
            }
        }
        Ok(())
    }

    fn close(&mut self) -> StoreResult<()> {
        Ok(())
    }
}
