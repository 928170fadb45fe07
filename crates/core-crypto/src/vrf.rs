//! # VRF Sortition
//!
//! Stake-weighted random selection for DAG block proposal eligibility and
//! PBFT step eligibility. Every sortition draw is a VRF proof over
//! `(period, round, step, level, salt)`-style inputs; the 32-byte VRF output
//! is read as a big-endian integer and compared against the active
//! `threshold_upper` to classify the draw (see `core-types::SortitionParams`).

use crate::error::{CryptoError, CryptoResult};
use schnorrkel::{signing_context, Keypair, PublicKey, SecretKey};

const VRF_CONTEXT: &[u8] = b"vesta-dag-sortition-vrf";

/// A VRF keypair. Wraps `schnorrkel`'s sr25519 keypair rather than rolling a
/// bespoke VRF construction.
pub struct VrfKeyPair {
    keypair: Keypair,
}

/// A VRF proof: the 32-byte pseudorandom output plus the proof that it was
/// derived honestly from the secret key and the input message.
#[derive(Clone, Debug)]
pub struct VrfProof {
    pub output: [u8; 32],
    pub proof: [u8; 64],
}

impl VrfKeyPair {
    /// Generate a random VRF keypair.
    pub fn generate() -> Self {
        Self {
            keypair: Keypair::generate(),
        }
    }

    /// Load a VRF keypair from its 32-byte secret scalar + nonce seed.
    pub fn from_bytes(bytes: &[u8; 64]) -> CryptoResult<Self> {
        let secret = SecretKey::from_bytes(bytes).map_err(|_| CryptoError::InvalidPrivateKey)?;
        Ok(Self {
            keypair: secret.to_keypair(),
        })
    }

    /// The public key used to verify proofs produced by this keypair.
    pub fn public(&self) -> VrfPublicKey {
        VrfPublicKey {
            key: self.keypair.public,
        }
    }

    /// Produce a VRF proof over `message`.
    pub fn prove(&self, message: &[u8]) -> VrfProof {
        let ctx = signing_context(VRF_CONTEXT);
        let (io, proof, _batchable) = self.keypair.vrf_sign(ctx.bytes(message));
        VrfProof {
            output: io.to_output().to_bytes(),
            proof: proof.to_bytes(),
        }
    }
}

/// The public half of a `VrfKeyPair`, as distributed in the DPoS validator
/// set.
#[derive(Clone, Copy)]
pub struct VrfPublicKey {
    key: PublicKey,
}

impl VrfPublicKey {
    /// Load from a 32-byte sr25519 public key.
    pub fn from_bytes(bytes: &[u8; 32]) -> CryptoResult<Self> {
        Ok(Self {
            key: PublicKey::from_bytes(bytes).map_err(|_| CryptoError::InvalidPublicKey)?,
        })
    }

    /// Raw 32-byte encoding.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.key.to_bytes()
    }

    /// Verify that `proof` was produced over `message` by the holder of the
    /// matching secret key, returning the verified 32-byte output.
    pub fn verify(&self, message: &[u8], proof: &VrfProof) -> CryptoResult<[u8; 32]> {
        let ctx = signing_context(VRF_CONTEXT);
        let output = schnorrkel::vrf::VRFOutput::from_bytes(&proof.output)
            .map_err(|_| CryptoError::VrfVerificationFailed)?;
        let signature = schnorrkel::vrf::VRFProof::from_bytes(&proof.proof)
            .map_err(|_| CryptoError::VrfVerificationFailed)?;
        let (io, _) = self
            .key
            .vrf_verify(ctx.bytes(message), &output, &signature)
            .map_err(|_| CryptoError::VrfVerificationFailed)?;
        Ok(io.to_output().to_bytes())
    }
}

/// Interpret a 32-byte VRF output as a big-endian `u64` threshold value, the
/// way sortition comparisons in `dag-engine` and `pbft-engine` are made
/// against `threshold_upper`/`threshold_range`.
pub fn output_to_threshold(output: &[u8; 32]) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&output[..8]);
    u64::from_be_bytes(buf)
}
