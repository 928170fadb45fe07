//! Shared scalar aliases used across every wire type in this crate.

/// A 32-byte Keccak-256 digest: block hashes, transaction hashes, vote
/// hashes, order hashes.
pub type Hash = [u8; 32];

/// A 20-byte account address, derived from a secp256k1 public key.
pub type Address = [u8; 20];

/// The null hash, used to denote "no block" — an empty PBFT period's
/// anchor, or a `next` vote for the null value.
pub const NULL_HASH: Hash = [0u8; 32];

/// The integer index of a finalized PBFT period. Period `0` is genesis.
pub type Period = u64;

/// A DAG block's height, counted from its pivot/tips.
pub type Level = u64;
