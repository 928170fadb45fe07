//! BLS12-381 signature aggregation.
//!
//! The consensus core itself never verifies BLS signatures directly — they
//! exist only as the optional aggregated "pillar block" signature bundle
//! carried in `PbftBlock::extra_data`. This module provides the primitive
//! the pillar-chain collaborator (outside this core) needs to produce and
//! check that bundle.

use blst::min_pk::{AggregatePublicKey, AggregateSignature, PublicKey, SecretKey, Signature};
use blst::BLST_ERROR;
use rand::RngCore;
use zeroize::Zeroize;

use crate::error::CryptoError;

/// Domain separation tag (Ethereum 2.0 compatible).
const DST: &[u8] = b"BLS_SIG_BLS12381G2_XMD:SHA-256_SSWU_RO_POP_";

/// BLS secret key (32 bytes).
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct BlsSecretKey([u8; 32]);

impl BlsSecretKey {
    pub fn from_bytes(bytes: &[u8; 32]) -> Self {
        Self(*bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

/// BLS public key (48 bytes compressed).
#[derive(Clone, Debug)]
pub struct BlsPublicKey(PublicKey);

impl PartialEq for BlsPublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.to_bytes() == other.to_bytes()
    }
}

impl Eq for BlsPublicKey {}

/// BLS signature (96 bytes).
#[derive(Clone, Debug)]
pub struct BlsSignature(Signature);

impl PartialEq for BlsSignature {
    fn eq(&self, other: &Self) -> bool {
        self.to_bytes() == other.to_bytes()
    }
}

impl Eq for BlsSignature {}

/// BLS keypair for signing the pillar-block digest.
pub struct BlsKeyPair {
    secret: SecretKey,
    public: BlsPublicKey,
}

impl BlsKeyPair {
    pub fn generate() -> Self {
        let mut ikm = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut ikm);
        let secret = SecretKey::key_gen(&ikm, &[]).expect("valid IKM");
        let public = BlsPublicKey(secret.sk_to_pk());
        Self { secret, public }
    }

    pub fn from_secret_bytes(bytes: &[u8; 32]) -> Result<Self, CryptoError> {
        let secret = SecretKey::from_bytes(bytes).map_err(|_| CryptoError::InvalidPrivateKey)?;
        let public = BlsPublicKey(secret.sk_to_pk());
        Ok(Self { secret, public })
    }

    pub fn sign(&self, message: &[u8]) -> BlsSignature {
        BlsSignature(self.secret.sign(message, DST, &[]))
    }

    pub fn public_key(&self) -> BlsPublicKey {
        self.public.clone()
    }

    pub fn secret_bytes(&self) -> [u8; 32] {
        self.secret.to_bytes()
    }
}

impl BlsPublicKey {
    pub fn verify(&self, message: &[u8], signature: &BlsSignature) -> bool {
        signature.0.verify(true, message, DST, &[], &self.0, true) == BLST_ERROR::BLST_SUCCESS
    }

    pub fn from_bytes(bytes: &[u8; 48]) -> Result<Self, CryptoError> {
        PublicKey::from_bytes(bytes)
            .map(BlsPublicKey)
            .map_err(|_| CryptoError::InvalidPublicKey)
    }

    pub fn to_bytes(&self) -> [u8; 48] {
        self.0.to_bytes()
    }

    /// Aggregate the pillar-bundle signers' public keys into one key that
    /// verifies the aggregated signature.
    pub fn aggregate(keys: &[BlsPublicKey]) -> Result<Self, CryptoError> {
        if keys.is_empty() {
            return Err(CryptoError::InvalidInput("empty key list".into()));
        }
        let refs: Vec<&PublicKey> = keys.iter().map(|k| &k.0).collect();
        AggregatePublicKey::aggregate(&refs, true)
            .map(|apk| BlsPublicKey(apk.to_public_key()))
            .map_err(|_| CryptoError::AggregationFailed)
    }
}

impl BlsSignature {
    pub fn from_bytes(bytes: &[u8; 96]) -> Result<Self, CryptoError> {
        Signature::from_bytes(bytes)
            .map(BlsSignature)
            .map_err(|_| CryptoError::InvalidSignature)
    }

    pub fn to_bytes(&self) -> [u8; 96] {
        self.0.to_bytes()
    }

    /// Aggregate the pillar bundle's individual signatures into one.
    pub fn aggregate(sigs: &[BlsSignature]) -> Result<Self, CryptoError> {
        if sigs.is_empty() {
            return Err(CryptoError::InvalidInput("empty signature list".into()));
        }
        let refs: Vec<&Signature> = sigs.iter().map(|s| &s.0).collect();
        AggregateSignature::aggregate(&refs, true)
            .map(|asig| BlsSignature(asig.to_signature()))
            .map_err(|_| CryptoError::AggregationFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_verify_roundtrip() {
        let keypair = BlsKeyPair::generate();
        let message = b"pillar block digest";
        let signature = keypair.sign(message);
        assert!(keypair.public_key().verify(message, &signature));
    }

    #[test]
    fn wrong_message_rejected() {
        let keypair = BlsKeyPair::generate();
        let signature = keypair.sign(b"pillar block digest");
        assert!(!keypair.public_key().verify(b"different digest", &signature));
    }

    #[test]
    fn different_key_rejected() {
        let kp1 = BlsKeyPair::generate();
        let kp2 = BlsKeyPair::generate();
        let message = b"pillar block digest";
        let signature = kp1.sign(message);
        assert!(!kp2.public_key().verify(message, &signature));
    }

    #[test]
    fn aggregate_signatures_and_keys() {
        let kp1 = BlsKeyPair::generate();
        let kp2 = BlsKeyPair::generate();
        let message = b"same pillar digest";

        let sig1 = kp1.sign(message);
        let sig2 = kp2.sign(message);

        let agg_sig = BlsSignature::aggregate(&[sig1, sig2]).unwrap();
        let agg_pk = BlsPublicKey::aggregate(&[kp1.public_key(), kp2.public_key()]).unwrap();

        assert!(agg_pk.verify(message, &agg_sig));
    }

    #[test]
    fn aggregate_empty_fails() {
        assert!(BlsSignature::aggregate(&[]).is_err());
        assert!(BlsPublicKey::aggregate(&[]).is_err());
    }

    #[test]
    fn from_secret_bytes_roundtrip() {
        let keypair1 = BlsKeyPair::generate();
        let secret_bytes = keypair1.secret_bytes();

        let keypair2 = BlsKeyPair::from_secret_bytes(&secret_bytes).unwrap();
        assert_eq!(keypair1.public_key(), keypair2.public_key());

        let message = b"test";
        assert_eq!(keypair1.sign(message), keypair2.sign(message));
    }
}
