//! Fixed-width account addresses.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::codec::{CodecError, CodecResult};
use crate::config::ADDRESS_LENGTH;
use crate::crypto::{sha256, PublicKey};

/// A 20-byte account address.
///
/// Addresses are opaque to the storage engine: they are index-key material
/// and payload fields, never interpreted. Construction from a slice of the
/// wrong width is a format error.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Address([u8; ADDRESS_LENGTH]);

impl Address {
    pub const fn new(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }

    /// The address owned by a public key: the first 20 bytes of the key's
    /// SHA-256 digest. This is the only place the engine interprets key
    /// material.
    pub fn of_public_key(public_key: &PublicKey) -> Self {
        let digest = sha256(public_key.as_bytes());
        let mut bytes = [0u8; ADDRESS_LENGTH];
        bytes.copy_from_slice(&digest[..ADDRESS_LENGTH]);
        Self(bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> CodecResult<Self> {
        let arr: [u8; ADDRESS_LENGTH] =
            bytes.try_into().map_err(|_| CodecError::AddressLength {
                expected: ADDRESS_LENGTH,
                got: bytes.len(),
            })?;
        Ok(Self(arr))
    }

    pub fn from_hex(s: &str) -> CodecResult<Self> {
        Self::from_bytes(&hex::decode(s)?)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_roundtrip() {
        let addr = Address::new([0xAB; 20]);
        let parsed = Address::from_hex(&addr.to_hex()).unwrap();
        assert_eq!(addr, parsed);
    }

    #[test]
    fn wrong_width_is_rejected() {
        let err = Address::from_bytes(&[1u8; 19]).unwrap_err();
        assert!(matches!(
            err,
            CodecError::AddressLength {
                expected: 20,
                got: 19
            }
        ));
    }

    #[test]
    fn bad_hex_is_rejected() {
        assert!(Address::from_hex("zz").is_err());
    }

    #[test]
    fn public_key_derivation_is_deterministic() {
        let key = PublicKey(vec![0x02; 33]);
        assert_eq!(Address::of_public_key(&key), Address::of_public_key(&key));
        assert_ne!(
            Address::of_public_key(&key),
            Address::of_public_key(&PublicKey(vec![0x03; 33]))
        );
    }

    #[test]
    fn public_key_derivation_matches_sha256_prefix() {
        // SHA-256 of the empty string, truncated to 20 bytes.
        let addr = Address::of_public_key(&PublicKey(Vec::new()));
        assert_eq!(addr.to_hex(), "e3b0c44298fc1c149afbf4c8996fb92427ae41e4");
    }
}
