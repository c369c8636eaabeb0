//! # Content Addressing Service
//!
//! The [`CryptoService`] turns any canonical entity into `(hash, bytes)`:
//! the exact bytes that were hashed, and the BLAKE3 digest that becomes the
//! entity's primary storage key. It is stateless and callable from any
//! thread without synchronization.
//!
//! Also home to the opaque value newtypes the entity model carries around:
//! [`Hash`], [`PublicKey`], and [`Signature`]. This engine never inspects a
//! key or signature; it only round-trips them.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::hash::blake3_hash;
use crate::codec::{Canonical, CodecError, CodecResult};
use crate::config::HASH_LENGTH;

// ---------------------------------------------------------------------------
// Hash
// ---------------------------------------------------------------------------

/// A 32-byte BLAKE3 content hash.
///
/// Displays as lowercase hex, which is also the exact form used inside
/// index keys — changing the rendering would silently break every
/// previously written `name@<hex>` entry.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Hash([u8; HASH_LENGTH]);

impl Hash {
    /// The all-zero hash, used as the empty-tree sentinel.
    pub const ZERO: Hash = Hash([0u8; HASH_LENGTH]);

    pub fn new(bytes: [u8; HASH_LENGTH]) -> Self {
        Hash(bytes)
    }

    /// Hash arbitrary bytes with the content-addressing hash function.
    pub fn of(data: &[u8]) -> Self {
        Hash(blake3_hash(data))
    }

    /// Reconstruct a hash from a byte slice, e.g. an index tree value.
    /// Anything but exactly 32 bytes is a format error.
    pub fn from_slice(data: &[u8]) -> CodecResult<Self> {
        let bytes: [u8; HASH_LENGTH] =
            data.try_into().map_err(|_| CodecError::HashLength {
                expected: HASH_LENGTH,
                got: data.len(),
            })?;
        Ok(Hash(bytes))
    }

    /// Parse a hash from its lowercase hex rendering.
    pub fn from_hex(s: &str) -> CodecResult<Self> {
        Self::from_slice(&hex::decode(s)?)
    }

    pub fn as_bytes(&self) -> &[u8; HASH_LENGTH] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; HASH_LENGTH]
    }
}

impl AsRef<[u8]> for Hash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({})", hex::encode(self.0))
    }
}

// ---------------------------------------------------------------------------
// PublicKey / Signature
// ---------------------------------------------------------------------------

/// An opaque public key, carried verbatim through encode/decode.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PublicKey(pub Vec<u8>);

impl PublicKey {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// An opaque signature. The empty signature is the signing-form placeholder:
/// the signing projection of a transaction clears this field and nothing else.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Signature(pub Vec<u8>);

impl Signature {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ---------------------------------------------------------------------------
// CryptoService
// ---------------------------------------------------------------------------

/// Which canonical projection to hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawMode {
    /// The full canonical form, signature included. This is what gets
    /// content-addressed and persisted.
    Binary,
    /// The signing form: identical schema with the signature cleared.
    /// This is what gets hashed and signed at issuance.
    SigningBinary,
}

/// Stateless hashing collaborator.
///
/// Given any entity implementing the canonical-projection contract, returns
/// a deterministic `(hash, bytes)` pair under the requested mode. Same
/// logical entity, same bytes, same hash — always.
#[derive(Debug, Clone, Copy, Default)]
pub struct CryptoService;

impl CryptoService {
    pub fn new() -> Self {
        Self
    }

    /// Render the entity's canonical bytes under `mode` and hash them.
    /// The returned bytes are exactly the bytes that were hashed.
    pub fn raw<T: Canonical>(&self, entity: &T, mode: RawMode) -> CodecResult<(Hash, Vec<u8>)> {
        let data = match mode {
            RawMode::Binary => entity.raw(false)?,
            RawMode::SigningBinary => entity.raw(true)?,
        };
        Ok((Hash::of(&data), data))
    }

    /// Hash raw bytes directly.
    pub fn hash(&self, data: &[u8]) -> Hash {
        Hash::of(data)
    }
}
