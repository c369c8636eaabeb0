//! # Cryptographic Primitives
//!
//! Hashing for content addressing and Merkle commitments. Nothing exotic:
//!
//! - **BLAKE3** for content hashes and tree roots — fast everywhere,
//!   parallelizable, and a proper cryptographic hash.
//! - **SHA-256** for interoperability with systems that picked it in 2009
//!   and never looked back.
//!
//! Signing and verification are deliberately *not* here. This engine stores
//! public keys and signatures as opaque bytes; issuing and checking them is
//! the business of the layer that executes transactions.

pub mod hash;
pub mod service;

pub use hash::{blake3_hash, blake3_hash_multi, merkle_root, sha256};
pub use service::{CryptoService, Hash, PublicKey, RawMode, Signature};
