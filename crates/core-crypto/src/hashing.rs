//! # Keccak-256 Hashing
//!
//! The core's sole hashing primitive. Block hashes, transaction hashes, vote
//! hashes, and the period `order_hash` are all Keccak-256 over a canonical
//! RLP encoding of their signed fields.

use sha3::{Digest, Keccak256};

/// A 32-byte Keccak-256 digest.
pub type Hash = [u8; 32];

/// The all-zero hash, used to denote "no block" (e.g. an empty PBFT period,
/// or a `next` vote for the null value).
pub const NULL_HASH: Hash = [0u8; 32];

/// Hash a single byte slice.
pub fn keccak256(data: &[u8]) -> Hash {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    let digest = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    out
}

/// Hash the concatenation of several byte slices without an intermediate
/// allocation, mirroring the streaming update pattern the consensus crates
/// use for combining a block's signed fields.
pub fn keccak256_concat(parts: &[&[u8]]) -> Hash {
    let mut hasher = Keccak256::new();
    for part in parts {
        hasher.update(part);
    }
    let digest = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    out
}
