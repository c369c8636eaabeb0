//! # Storage Configuration
//!
//! Where the four tree stores live on disk, and the constants the storage
//! layer refuses to hardcode anywhere else.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Names of the four backing stores, one per Merkle tree. Each becomes its
/// own directory under the data path — trees never share a store.
pub const TREE_INDEX: &str = "index";
pub const TREE_BLOCK: &str = "block";
pub const TREE_TRANSACTION: &str = "transaction";
pub const TREE_STATE: &str = "state";

/// Content hash output length in bytes (BLAKE3-256).
pub const HASH_LENGTH: usize = 32;

/// Account address length in bytes.
pub const ADDRESS_LENGTH: usize = 20;

// ---------------------------------------------------------------------------
// Error Type
// ---------------------------------------------------------------------------

/// Errors raised while loading a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// StorageConfig
// ---------------------------------------------------------------------------

/// Configuration for the storage service.
///
/// `path` is the data directory; each tree opens its own sled database in a
/// subdirectory named after it. With `in_memory` set, no files are touched
/// and every tree gets a private in-memory store — the mode unit tests use.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root data directory for the per-tree stores.
    pub path: PathBuf,

    /// Use in-memory stores instead of sled. Nothing survives drop.
    #[serde(default)]
    pub in_memory: bool,
}

impl StorageConfig {
    /// Configuration for a durable store rooted at `path`.
    pub fn at<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            in_memory: false,
        }
    }

    /// Configuration for a throwaway in-memory store.
    pub fn in_memory() -> Self {
        Self {
            path: PathBuf::new(),
            in_memory: true,
        }
    }

    /// Load a configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let data = std::fs::read(path)?;
        Ok(serde_json::from_slice(&data)?)
    }

    /// The backing-store directory for a named tree.
    pub fn store_path(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }
}
