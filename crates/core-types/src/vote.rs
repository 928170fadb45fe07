//! PBFT vote wire type:
//! `[block_hash, period, round, step, weight?, vrf_proof, signature]`.

use alloy_rlp::{Decodable, Encodable, RlpDecodable, RlpEncodable};
use sha3::{Digest, Keccak256};

use crate::error::TypesResult;
use crate::primitives::{Hash, Period, NULL_HASH};
use crate::rlp_util::OptWeight;

/// Beyond this step, the value fed into the VRF sortition input collapses
/// to a fixed step (preserving even/odd parity so `next`'s even/odd framing
/// still applies) rather than growing unboundedly — otherwise a stalled
/// round that never certifies would grow the VRF input space without
/// bound. The exact cutoff is an implementation choice, not a protocol
/// constant derived elsewhere.
pub const VRF_SORTITION_STEP_CAP: u64 = 14;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u64)]
pub enum VoteType {
    Propose = 1,
    Soft = 2,
    Cert = 3,
    Next = 4,
}

/// Classify a raw `step` value into its vote type. Steps `>= 4` are all
/// `next` votes (round-extension steps alternate even/odd between
/// `next (even)` and `next (odd)`).
pub fn classify_step(step: u64) -> VoteType {
    match step {
        1 => VoteType::Propose,
        2 => VoteType::Soft,
        3 => VoteType::Cert,
        _ => VoteType::Next,
    }
}

/// The step value used as VRF sortition input: equal to `step` below the
/// cap, collapsed to the capped value (parity-preserved) above it.
pub fn vrf_sortition_step(step: u64) -> u64 {
    if step <= VRF_SORTITION_STEP_CAP {
        return step;
    }
    let parity = step % 2;
    if VRF_SORTITION_STEP_CAP % 2 == parity {
        VRF_SORTITION_STEP_CAP
    } else {
        VRF_SORTITION_STEP_CAP - 1
    }
}

#[derive(Clone, Debug, PartialEq, Eq, RlpEncodable, RlpDecodable)]
pub struct Vote {
    pub block_hash: Hash,
    pub period: Period,
    pub round: u64,
    pub step: u64,
    pub weight: OptWeight,
    pub vrf_proof: Vec<u8>,
    pub v: u64,
    pub r: [u8; 32],
    pub s: [u8; 32],
}

impl Vote {
    pub fn vote_type(&self) -> VoteType {
        classify_step(self.step)
    }

    pub fn is_null_vote(&self) -> bool {
        self.block_hash == NULL_HASH
    }

    /// `cert` and `propose` may only vote for concrete hashes; `soft` votes
    /// always target a concrete block too. Only `next` may target the null
    /// hash.
    pub fn respects_null_hash_rule(&self) -> bool {
        match self.vote_type() {
            VoteType::Next => true,
            VoteType::Propose | VoteType::Soft | VoteType::Cert => !self.is_null_vote(),
        }
    }

    /// Keccak-256 of the full signed RLP. Used as the vote's identity in
    /// the vote manager's indexes and the double-voting index key.
    pub fn hash(&self) -> Hash {
        let mut buf = Vec::with_capacity(self.length());
        self.encode(&mut buf);
        let mut hasher = Keccak256::new();
        hasher.update(&buf);
        hasher.finalize().into()
    }

    /// Keccak-256 over the unsigned fields — what `signature` covers and
    /// what the VRF proof is checked against together with the voter's
    /// public key.
    pub fn signing_hash(&self) -> Hash {
        #[derive(RlpEncodable)]
        struct Unsigned<'a> {
            block_hash: Hash,
            period: Period,
            round: u64,
            step: u64,
            weight: OptWeight,
            vrf_proof: &'a [u8],
        }
        let mut buf = Vec::new();
        Unsigned {
            block_hash: self.block_hash,
            period: self.period,
            round: self.round,
            step: self.step,
            weight: self.weight,
            vrf_proof: &self.vrf_proof,
        }
        .encode(&mut buf);
        let mut hasher = Keccak256::new();
        hasher.update(&buf);
        hasher.finalize().into()
    }

    /// The key identifying "the same vote slot" for double-vote detection:
    /// `(voter, period, round, step)` — two votes sharing this key but
    /// differing in `block_hash` are double votes.
    pub fn double_vote_key(&self, voter: crate::primitives::Address) -> DoubleVoteKey {
        DoubleVoteKey { voter, period: self.period, round: self.round, step: self.step }
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

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DoubleVoteKey {
    pub voter: crate::primitives::Address,
    pub period: Period,
    pub round: u64,
    pub step: u64,
}

/// A bundle of votes sharing a key, used for `votes_next_previous_round` and
/// `reward_votes` persistence.
#[derive(Clone, Debug, Default, PartialEq, Eq, RlpEncodable, RlpDecodable)]
pub struct VoteBundle {
    pub votes: Vec<Vote>,
}

impl VoteBundle {
    pub fn aggregate_weight(&self) -> u64 {
        self.votes.iter().filter_map(|v| v.weight.0).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(step: u64, block_hash: Hash) -> Vote {
        Vote {
            block_hash,
            period: 3,
            round: 1,
            step,
            weight: OptWeight(Some(5)),
            vrf_proof: vec![1, 2, 3],
            v: 27,
            r: [1u8; 32],
            s: [2u8; 32],
        }
    }

    #[test]
    fn classifies_step_correctly() {
        assert_eq!(classify_step(1), VoteType::Propose);
        assert_eq!(classify_step(2), VoteType::Soft);
        assert_eq!(classify_step(3), VoteType::Cert);
        assert_eq!(classify_step(4), VoteType::Next);
        assert_eq!(classify_step(101), VoteType::Next);
    }

    #[test]
    fn next_votes_may_be_null_others_may_not() {
        assert!(sample(4, NULL_HASH).respects_null_hash_rule());
        assert!(!sample(3, NULL_HASH).respects_null_hash_rule());
        assert!(!sample(2, NULL_HASH).respects_null_hash_rule());
        assert!(!sample(1, NULL_HASH).respects_null_hash_rule());
    }

    #[test]
    fn vrf_step_collapses_above_cap_preserving_parity() {
        let far = vrf_sortition_step(1001);
        assert!(far <= VRF_SORTITION_STEP_CAP);
        assert_eq!(far % 2, 1001 % 2);
    }

    #[test]
    fn rlp_roundtrip() {
        let vote = sample(3, [9u8; 32]);
        let encoded = vote.encode_rlp();
        let decoded = Vote::decode_rlp(&encoded).unwrap();
        assert_eq!(vote, decoded);
    }

    #[test]
    fn double_vote_key_ignores_block_hash() {
        let a = sample(3, [1u8; 32]);
        let b = sample(3, [2u8; 32]);
        let voter = [7u8; 20];
        assert_eq!(a.double_vote_key(voter), b.double_vote_key(voter));
        assert_ne!(a.hash(), b.hash());
    }
}
