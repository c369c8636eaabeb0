//! Sled-backed durable store.

use std::path::Path;

use super::{KvStore, StoreResult};

/// A durable store over a sled tree. One sled database per trie — the four
/// trees of the storage service never share a file, so they can be opened,
/// flushed, and dropped independently.
#[derive(Debug)]
pub struct SledStore {
    db: sled::Db,
}

impl SledStore {
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let db = sled::open(path)?;
        Ok(Self { db })
    }
}

impl KvStore for SledStore {
    fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        Ok(self.db.get(key)?.map(|ivec| ivec.to_vec()))
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> StoreResult<()> {
        self.db.insert(key, value)?;
        Ok(())
    }

    fn remove(&mut self, key: &[u8]) -> StoreResult<()> {
        self.db.remove(key)?;
        Ok(())
    }

    fn scan(&self, visit: &mut dyn FnMut(&[u8], &[u8]) -> bool) -> StoreResult<()> {
        for entry in self.db.iter() {
            let (key, value) = entry?;
            if !visit(&key, &value) {
                break;
            }
        }
        Ok(())
    }

    fn close(&mut self) -> StoreResult<()> {
        self.db.flush()?;
        Ok(())
    }
}
