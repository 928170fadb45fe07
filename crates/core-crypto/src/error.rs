//! Crypto error types.

use thiserror::Error;

/// Cryptographic operation errors.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Invalid key length
    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength {
        /// Expected key length in bytes
        expected: usize,
        /// Actual key length in bytes
        actual: usize,
    },

    /// Signature verification failed
    #[error("signature verification failed")]
    SignatureVerificationFailed,

    /// Invalid signature format
    #[error("invalid signature format")]
    InvalidSignatureFormat,

    /// Invalid public key
    #[error("invalid public key")]
    InvalidPublicKey,

    /// Invalid private key
    #[error("invalid private key")]
    InvalidPrivateKey,

    /// Invalid signature
    #[error("invalid signature")]
    InvalidSignature,

    /// Signer could not be recovered from the signature
    #[error("signature recovery failed")]
    RecoveryFailed,

    /// BLS aggregation failed
    #[error("BLS aggregation failed")]
    AggregationFailed,

    /// VRF proof did not verify against the supplied input
    #[error("VRF proof verification failed")]
    VrfVerificationFailed,

    /// VDF proof did not verify against the supplied input
    #[error("VDF proof verification failed")]
    VdfVerificationFailed,

    /// Key generation failed
    #[error("key generation failed: {0}")]
    KeyGenerationFailed(String),

    /// Invalid input for a cryptographic operation
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Convenience alias for crypto operation results.
pub type CryptoResult<T> = Result<T, CryptoError>;
