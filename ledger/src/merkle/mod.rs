//! # Merkle Storage Service
//!
//! The top of the stack: [`MerkleTree`] wraps one trie behind a lock, and
//! [`MerkleService`] composes four of them (index, block, transaction,
//! state) into the engine's ingestion and lookup surface, with secondary
//! indexes living in the index tree.

pub mod service;
pub mod tree;

pub use service::{MerkleService, StorageError, StorageResult};
pub use tree::MerkleTree;
