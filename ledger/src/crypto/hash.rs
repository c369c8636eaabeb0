//! # Hashing Utilities
//!
//! The two hash functions this crate will ever use, and the Merkle-root
//! construction built on top of them.
//!
//! BLAKE3 is the workhorse: entity content hashes, tree leaves, tree roots.
//! SHA-256 exists for cross-system references and nothing else — there is
//! no security reason to prefer it, only compatibility.

use sha2::{Digest, Sha256};

/// Compute the SHA-256 hash of the input data.
///
/// Returns a 32-byte digest. Used for external references only; for
/// Arbor-internal hashing, prefer [`blake3_hash`].
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let mut output = [0u8; 32];
    output.copy_from_slice(&hasher.finalize());
    output
}

/// Compute the BLAKE3 hash of the input data.
///
/// Returns a 32-byte digest. This is the content-addressing hash: the same
/// logical entity always produces the same canonical bytes, and those bytes
/// always produce the same digest, across processes and runs.
pub fn blake3_hash(data: &[u8]) -> [u8; 32] {
    *blake3::hash(data).as_bytes()
}

/// Hash multiple byte slices together without concatenation overhead.
///
/// Feeding the parts sequentially into the hasher gives the same result as
/// hashing the concatenation, minus the temporary buffer. Used for tree
/// leaves of the form `key || value`.
pub fn blake3_hash_multi(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new();
    for part in parts {
        hasher.update(part);
    }
    *hasher.finalize().as_bytes()
}

/// Compute a binary Merkle root over a list of leaf hashes.
///
/// Internal nodes are `BLAKE3(left || right)`; an odd node at any level is
/// paired with itself. An empty list returns all zeros (the empty-tree
/// sentinel), so "no data" and "some data" are always distinguishable.
pub fn merkle_root(leaves: &[[u8; 32]]) -> [u8; 32] {
    if leaves.is_empty() {
        return [0u8; 32];
    }

    let mut current_level: Vec<[u8; 32]> = leaves.to_vec();

    // A single leaf is paired with itself so the root is always the output
    // of a hash operation, never a raw leaf.
    if current_level.len() == 1 {
        return blake3_hash_multi(&[current_level[0].as_slice(), current_level[0].as_slice()]);
    }

    while current_level.len() > 1 {
        let mut next_level = Vec::with_capacity((current_level.len() + 1) / 2);

        for chunk in current_level.chunks(2) {
            let left = &chunk[0];
            let right = if chunk.len() == 2 { &chunk[1] } else { &chunk[0] };
            next_level.push(blake3_hash_multi(&[left.as_slice(), right.as_slice()]));
        }

        current_level = next_level;
    }

    current_level[0]
}
