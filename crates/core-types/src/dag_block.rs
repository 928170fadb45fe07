//! DAG block wire type:
//! `pivot, level, timestamp, vdf_bytes, tips, transactions (+gas_estimations
//! where protocol-enabled), signature`.

use alloy_rlp::{Decodable, Encodable, RlpDecodable, RlpEncodable};
use sha3::{Digest, Keccak256};
use std::collections::HashSet;

use crate::error::{TypesError, TypesResult};
use crate::primitives::{Address, Hash, Level};

/// The sortition bundle bound to this block's proposal attempt, embedded
/// as the opaque `vdf_bytes` wire field: the proposer's VRF public key and
/// proof (so admission can re-derive and check the sortition threshold
/// without a separate wire field) plus the Wesolowski VDF solution `(y,
/// pi)` and the `difficulty` it was computed under — `difficulty` is
/// carried alongside the proof because the verifier needs it to re-derive
/// the exponent `2^difficulty`, not because it is itself part of the proof.
/// Mirrors the 5-field `(pk, proof, sol.first, sol.second, difficulty)` RLP
/// of the taraxa-node `VdfSortition` this is grounded on.
#[derive(Clone, Debug, PartialEq, Eq, RlpEncodable, RlpDecodable)]
pub struct VdfProof {
    pub vrf_public_key: [u8; 32],
    pub vrf_proof: Vec<u8>,
    pub difficulty: u16,
    pub y: Vec<u8>,
    pub pi: Vec<u8>,
}

impl VdfProof {
    /// `true` for the sortition-`omit` class: no VDF was computed.
    pub fn is_omitted(&self) -> bool {
        self.difficulty == 0 && self.y.is_empty() && self.pi.is_empty()
    }

    /// Split `vrf_proof` into the 32-byte VRF output and the 64-byte proof
    /// schnorrkel's verifier needs; `None` if the field isn't the expected
    /// 96 bytes (a malformed or adversarial block).
    pub fn vrf_output_and_proof(&self) -> Option<([u8; 32], [u8; 64])> {
        if self.vrf_proof.len() != 96 {
            return None;
        }
        let mut output = [0u8; 32];
        let mut proof = [0u8; 64];
        output.copy_from_slice(&self.vrf_proof[..32]);
        proof.copy_from_slice(&self.vrf_proof[32..]);
        Some((output, proof))
    }

    pub fn from_vrf_parts(output: [u8; 32], proof: [u8; 64]) -> Vec<u8> {
        let mut out = Vec::with_capacity(96);
        out.extend_from_slice(&output);
        out.extend_from_slice(&proof);
        out
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.length());
        self.encode(&mut buf);
        buf
    }

    pub fn from_bytes(mut bytes: &[u8]) -> TypesResult<Self> {
        Ok(Self::decode(&mut bytes)?)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, RlpEncodable, RlpDecodable)]
pub struct DagBlock {
    pub pivot: Hash,
    pub level: Level,
    pub timestamp: u64,
    pub vdf_bytes: Vec<u8>,
    pub tips: Vec<Hash>,
    pub transactions: Vec<Hash>,
    pub gas_estimations: Vec<u64>,
    pub v: u64,
    pub r: [u8; 32],
    pub s: [u8; 32],
}

impl DagBlock {
    /// Keccak-256 of the full signed RLP — the block's identity everywhere
    /// else in the core (level index, non-final set, `dag_blocks` column).
    pub fn hash(&self) -> Hash {
        let mut buf = Vec::with_capacity(self.length());
        self.encode(&mut buf);
        let mut hasher = Keccak256::new();
        hasher.update(&buf);
        hasher.finalize().into()
    }

    /// Keccak-256 over the unsigned fields — what `signature` actually
    /// covers and what sender recovery must be checked against.
    pub fn signing_hash(&self) -> Hash {
        #[derive(RlpEncodable)]
        struct Unsigned<'a> {
            pivot: Hash,
            level: Level,
            timestamp: u64,
            vdf_bytes: &'a [u8],
            tips: &'a [Hash],
            transactions: &'a [Hash],
            gas_estimations: &'a [u64],
        }
        let mut buf = Vec::new();
        Unsigned {
            pivot: self.pivot,
            level: self.level,
            timestamp: self.timestamp,
            vdf_bytes: &self.vdf_bytes,
            tips: &self.tips,
            transactions: &self.transactions,
            gas_estimations: &self.gas_estimations,
        }
        .encode(&mut buf);
        let mut hasher = Keccak256::new();
        hasher.update(&buf);
        hasher.finalize().into()
    }

    pub fn vdf(&self) -> TypesResult<VdfProof> {
        VdfProof::from_bytes(&self.vdf_bytes)
    }

    /// Structural invariants checkable without external state (DPoS
    /// eligibility, VDF verification and sortition-parameter lookups happen
    /// in `dag-engine`, which owns those collaborators).
    pub fn check_structure(&self) -> TypesResult<()> {
        if self.transactions.len() != self.gas_estimations.len() {
            return Err(TypesError::MismatchedEstimations {
                tx_len: self.transactions.len(),
                gas_len: self.gas_estimations.len(),
            });
        }
        let unique_tips: HashSet<&Hash> = self.tips.iter().collect();
        if unique_tips.len() != self.tips.len() {
            return Err(TypesError::DuplicateEntry { field: "tips" });
        }
        let unique_txs: HashSet<&Hash> = self.transactions.iter().collect();
        if unique_txs.len() != self.transactions.len() {
            return Err(TypesError::DuplicateEntry { field: "transactions" });
        }
        Ok(())
    }

    pub fn total_gas_estimation(&self) -> u64 {
        self.gas_estimations.iter().sum()
    }

    pub fn decode_rlp(mut bytes: &[u8]) -> TypesResult<Self> {
        Ok(Self::decode(&mut bytes)?)
    }

    pub fn encode_rlp(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.length());
        self.encode(&mut buf);
        buf
    }
}

/// Recover the block's proposer address from `signature` (supplied by the
/// caller via `core-crypto`, over [`DagBlock::signing_hash`] with
/// `chain_id = 0` — DAG blocks are not cross-chain replayable).
pub type SenderRecoveryFn = fn(&Hash, &DagBlockSignatureParts) -> Option<Address>;

#[derive(Clone, Copy, Debug)]
pub struct DagBlockSignatureParts {
    pub v: u64,
    pub r: [u8; 32],
    pub s: [u8; 32],
}

impl DagBlock {
    pub fn signature_parts(&self) -> DagBlockSignatureParts {
        DagBlockSignatureParts { v: self.v, r: self.r, s: self.s }
    }
}
