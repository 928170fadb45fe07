//! # ECDSA Signatures (secp256k1) with public-key recovery
//!
//! Transactions, DAG blocks, PBFT blocks and votes are all signed with
//! secp256k1 and carry a recoverable signature rather than an attached
//! public key — the sender/proposer/voter address is *derived* from the
//! signature, the way the spec's `sender` / `proposer` fields work.
//!
//! EIP-155 replay protection is folded into the recovery id encoding: when
//! `chain_id != 0` the encoded `v` is `chain_id * 2 + 35 + recovery_id`
//! instead of the legacy `27 + recovery_id`.

use crate::error::{CryptoError, CryptoResult};
use crate::hashing::{keccak256, Hash};
use k256::ecdsa::{RecoveryId, Signature as EcdsaSignature, SigningKey, VerifyingKey};
use zeroize::Zeroize;

/// An address derived from a secp256k1 public key: the low 20 bytes of the
/// Keccak-256 hash of the uncompressed (64-byte, no prefix) public key.
pub type Address = [u8; 20];

/// A recoverable secp256k1 signature: 64-byte `(r, s)` plus an encoded
/// recovery id `v`. `v` already carries EIP-155 chain-id replay protection
/// when the signer supplied a non-zero `chain_id`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecoverableSignature {
    pub r: [u8; 32],
    pub s: [u8; 32],
    pub v: u64,
}

impl RecoverableSignature {
    /// Decode the raw recovery id from `v`, undoing EIP-155 if `chain_id`
    /// was folded in.
    fn recovery_id(&self, chain_id: u64) -> CryptoResult<RecoveryId> {
        let raw = if chain_id == 0 {
            self.v
                .checked_sub(27)
                .ok_or(CryptoError::InvalidSignatureFormat)?
        } else {
            let expected_base = chain_id * 2 + 35;
            self.v
                .checked_sub(expected_base)
                .ok_or(CryptoError::InvalidSignatureFormat)?
        };
        let raw: u8 = raw.try_into().map_err(|_| CryptoError::InvalidSignatureFormat)?;
        RecoveryId::from_byte(raw).ok_or(CryptoError::InvalidSignatureFormat)
    }

    fn to_ecdsa_signature(self) -> CryptoResult<EcdsaSignature> {
        let mut bytes = [0u8; 64];
        bytes[..32].copy_from_slice(&self.r);
        bytes[32..].copy_from_slice(&self.s);
        EcdsaSignature::from_slice(&bytes).map_err(|_| CryptoError::InvalidSignatureFormat)
    }

    /// Recover the signer's address from a message hash.
    ///
    /// `chain_id` must match the value used at signing time; pass `0` for
    /// pre-EIP-155 signatures (votes and DAG blocks, which are not replayed
    /// cross-chain, use `chain_id = 0`).
    pub fn recover_address(&self, message_hash: &Hash, chain_id: u64) -> CryptoResult<Address> {
        Ok(public_key_to_address(&self.recover_public_key(message_hash, chain_id)?))
    }

    /// Recover the full public key from a message hash.
    pub fn recover_public_key(
        &self,
        message_hash: &Hash,
        chain_id: u64,
    ) -> CryptoResult<VerifyingKey> {
        let sig = self.to_ecdsa_signature()?;
        let recid = self.recovery_id(chain_id)?;
        VerifyingKey::recover_from_prehash(message_hash, &sig, recid)
            .map_err(|_| CryptoError::RecoveryFailed)
    }
}

/// Derive the 20-byte address from a secp256k1 public key (last 20 bytes of
/// the Keccak-256 hash of the uncompressed, prefix-stripped point).
pub fn public_key_to_address(key: &VerifyingKey) -> Address {
    let encoded = key.to_encoded_point(false);
    let digest = keccak256(&encoded.as_bytes()[1..]);
    let mut addr = [0u8; 20];
    addr.copy_from_slice(&digest[12..]);
    addr
}

/// secp256k1 signing keypair. Zeroizes its scalar on drop.
pub struct Secp256k1KeyPair {
    signing_key: SigningKey,
}

impl Secp256k1KeyPair {
    /// Generate a random keypair.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::random(&mut rand::thread_rng()),
        }
    }

    /// Load a keypair from its 32-byte scalar.
    pub fn from_bytes(bytes: [u8; 32]) -> CryptoResult<Self> {
        let signing_key =
            SigningKey::from_bytes((&bytes).into()).map_err(|_| CryptoError::InvalidPrivateKey)?;
        Ok(Self { signing_key })
    }

    /// The 20-byte address of this keypair.
    pub fn address(&self) -> Address {
        public_key_to_address(self.signing_key.verifying_key())
    }

    /// Sign a 32-byte message hash, producing a recoverable signature whose
    /// `v` already encodes `chain_id` per EIP-155 (pass `0` to get the
    /// legacy `27`/`28` encoding used by votes and DAG blocks).
    pub fn sign_prehash(&self, message_hash: &Hash, chain_id: u64) -> RecoverableSignature {
        let (sig, recid) = self
            .signing_key
            .sign_prehash_recoverable(message_hash)
            .expect("prehash is exactly 32 bytes");
        let bytes = sig.to_bytes();
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..]);
        let base = if chain_id == 0 { 27 } else { chain_id * 2 + 35 };
        RecoverableSignature {
            r,
            s,
            v: base + recid.to_byte() as u64,
        }
    }

    /// The 32-byte scalar, for persistence in a keystore.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes().into()
    }
}

impl Drop for Secp256k1KeyPair {
    fn drop(&mut self) {
        let mut bytes: [u8; 32] = self.signing_key.to_bytes().into();
        bytes.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_and_recover_roundtrip_non_eip155() {
        let keypair = Secp256k1KeyPair::generate();
        let hash = keccak256(b"a vote");
        let sig = keypair.sign_prehash(&hash, 0);
        let recovered = sig.recover_address(&hash, 0).unwrap();
        assert_eq!(recovered, keypair.address());
    }

    #[test]
    fn sign_and_recover_roundtrip_eip155() {
        let keypair = Secp256k1KeyPair::generate();
        let hash = keccak256(b"a transaction");
        let sig = keypair.sign_prehash(&hash, 9000);
        assert!(sig.v >= 9000 * 2 + 35);
        let recovered = sig.recover_address(&hash, 9000).unwrap();
        assert_eq!(recovered, keypair.address());
    }

    #[test]
    fn recovery_fails_under_wrong_chain_id() {
        let keypair = Secp256k1KeyPair::generate();
        let hash = keccak256(b"a transaction");
        let sig = keypair.sign_prehash(&hash, 9000);
        assert!(sig.recover_address(&hash, 1).is_err());
    }

    #[test]
    fn tampered_hash_recovers_a_different_address() {
        let keypair = Secp256k1KeyPair::generate();
        let hash = keccak256(b"original");
        let sig = keypair.sign_prehash(&hash, 0);
        let other_hash = keccak256(b"tampered");
        let recovered = sig.recover_address(&other_hash, 0).unwrap();
        assert_ne!(recovered, keypair.address());
    }

    #[test]
    fn roundtrip_bytes() {
        let original = Secp256k1KeyPair::generate();
        let bytes = original.to_bytes();
        let restored = Secp256k1KeyPair::from_bytes(bytes).unwrap();
        assert_eq!(original.address(), restored.address());
    }
}
