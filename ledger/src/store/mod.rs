//! # Key/Value Backing Stores
//!
//! The trie persists through a minimal key/value abstraction: byte keys in,
//! byte values out. Two implementations — an in-memory map for tests and
//! ephemeral trees, and a sled-backed store for durable trees. Absence is
//! `Ok(None)`, never an error; errors mean the store itself failed.

pub mod disk;
pub mod memory;

pub use disk::SledStore;
pub use memory::MemoryStore;

/// Backing-store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("sled: {0}")]
    Sled(#[from] sled::Error),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// The backing-store contract.
///
/// `scan` visits every entry in unspecified order; the callback returns
/// `false` to stop early. Implementations must be safe to share behind a
/// lock, hence `Send + Sync`.
pub trait KvStore: Send + Sync {
    fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>>;

    fn put(&mut self, key: &[u8], value: &[u8]) -> StoreResult<()>;

    fn remove(&mut self, key: &[u8]) -> StoreResult<()>;

    fn has(&self, key: &[u8]) -> StoreResult<bool> {
        Ok(self.get(key)?.is_some())
    }

    fn scan(&self, visit: &mut dyn FnMut(&[u8], &[u8]) -> bool) -> StoreResult<()>;

    /// Flush and release. Further calls after `close` are unspecified.
    fn close(&mut self) -> StoreResult<()>;
}
