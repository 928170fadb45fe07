//! # core-crypto
//!
//! Cryptographic primitives consumed by the rest of the workspace as
//! libraries, not reimplemented inline: Keccak-256 hashing, recoverable
//! secp256k1 ECDSA (with EIP-155), VRF sortition (`schnorrkel`), the
//! Wesolowski VDF (`num-bigint`), and BLS12-381 aggregation (`blst`) for the
//! optional pillar-block signature bundle.

pub mod bls;
pub mod ecdsa;
pub mod error;
pub mod hashing;
pub mod vdf;
pub mod vrf;

pub use bls::{BlsKeyPair, BlsPublicKey, BlsSecretKey, BlsSignature};
pub use ecdsa::{public_key_to_address, Address, RecoverableSignature, Secp256k1KeyPair};
pub use error::{CryptoError, CryptoResult};
pub use hashing::{keccak256, keccak256_concat, Hash, NULL_HASH};
pub use vdf::VdfOutput;
pub use vrf::{output_to_threshold, VrfKeyPair, VrfProof, VrfPublicKey};
