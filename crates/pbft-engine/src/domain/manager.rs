//! `PbftManager`: owns the round/step FSM state and the pure decision
//! logic for each step — spec.md §4.3's step table and round-advance
//! rules. The async driver loop (`driver.rs`) calls into this to decide
//! what to do and feeds back what it observed; no I/O or sleeping happens
//! here.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use core_crypto::ecdsa::Secp256k1KeyPair;
use core_crypto::vrf::{output_to_threshold, VrfKeyPair, VrfProof};
use core_types::rlp_util::OptWeight;
use core_types::{vrf_sortition_step, Address, Hash, Period, Vote, NULL_HASH};

use crate::config::PbftConfig;
use crate::domain::quorum::two_t_plus_one;
use crate::domain::state::{PbftStep, RoundState};
use crate::error::{PbftError, PbftResult};
use crate::ports::outbound::{DagCandidateGateway, DposGateway};

/// The sortition message a step-eligibility VRF proof is taken over.
/// Mirrors `dag-engine`'s `sortition_message` shape but keys on
/// `(period, round, step)` rather than DAG level.
pub fn step_sortition_message(period: Period, round: u64, step: u64) -> Vec<u8> {
    let collapsed = vrf_sortition_step(step);
    let mut buf = Vec::with_capacity(24);
    buf.extend_from_slice(&period.to_be_bytes());
    buf.extend_from_slice(&round.to_be_bytes());
    buf.extend_from_slice(&collapsed.to_be_bytes());
    buf
}

/// Stake-weighted VRF eligibility: a simplified single-draw threshold
/// (not a full binomial CDF) comparing the VRF output, read as a
/// fraction of the output space, against this voter's share of the
/// target committee. `total_eligible_votes` is the per-period DPoS
/// total; `voter_weight` this voter's share of it.
///
/// Open Question decision (see `DESIGN.md`): the source's exact
/// committee-sortition distribution is not specified closely enough to
/// reproduce bit-for-bit, so this core uses the threshold-comparison
/// form already established for DAG block sortition rather than
/// inventing a binomial sampler.
pub fn is_sortition_eligible(
    vrf_output: &[u8; 32],
    voter_weight: u64,
    total_eligible_votes: u64,
    committee_size: u32,
) -> bool {
    if voter_weight == 0 || total_eligible_votes == 0 {
        return false;
    }
    let threshold = output_to_threshold(vrf_output);
    let share = (committee_size as u128) * (voter_weight as u128);
    let scaled = (u64::MAX as u128) * share / (total_eligible_votes as u128);
    threshold as u128 <= scaled
}

pub struct PbftManager {
    state: RwLock<RoundState>,
    /// The concrete hash certified so far per period, for fork detection
    /// (spec.md §8 property 3: at most one certification per period).
    certified: RwLock<HashMap<Period, Hash>>,
    dpos: Arc<dyn DposGateway>,
    dag: Arc<dyn DagCandidateGateway>,
    signer: Secp256k1KeyPair,
    vrf: VrfKeyPair,
    config: PbftConfig,
}

impl PbftManager {
    pub fn new(
        genesis_period: Period,
        dpos: Arc<dyn DposGateway>,
        dag: Arc<dyn DagCandidateGateway>,
        signer: Secp256k1KeyPair,
        vrf: VrfKeyPair,
        config: PbftConfig,
    ) -> Self {
        Self {
            state: RwLock::new(RoundState::genesis(genesis_period)),
            certified: RwLock::new(HashMap::new()),
            dpos,
            dag,
            signer,
            vrf,
            config,
        }
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    pub fn state(&self) -> RoundState {
        self.state.read().clone()
    }

    pub fn config(&self) -> &PbftConfig {
        &self.config
    }

    /// `(eligible, vrf_proof)` for this node at `(period, round, step)`.
    /// Every step in the table is individually sortition-gated; `driver.rs`
    /// calls this before casting a `soft`/`cert`/`next` vote just as
    /// `decide_propose` does internally for `propose`.
    pub fn eligibility(&self, period: Period, round: u64, step: u64) -> (bool, VrfProof) {
        let message = step_sortition_message(period, round, step);
        let proof = self.vrf.prove(&message);
        let weight = self.dpos.vote_weight(&self.address(), period);
        let total = self.dpos.total_eligible_votes(period);
        let eligible = is_sortition_eligible(&proof.output, weight, total, self.config.committee_size);
        (eligible, proof)
    }

    /// `propose` step entry action: if eligible, the locally-selected
    /// anchor candidate (heaviest DAG block under the previous anchor's
    /// pivot); `None` otherwise.
    pub fn decide_propose(&self, previous_anchor: Hash) -> Option<(Hash, VrfProof)> {
        let (period, round) = {
            let state = self.state.read();
            (state.period, state.round)
        };
        let (eligible, proof) = self.eligibility(period, round, PbftStep::PROPOSE.0);
        if !eligible {
            return None;
        }
        self.dag.heaviest_candidate(previous_anchor).map(|hash| (hash, proof))
    }

    /// `soft` step entry action: the lowest-hash buildable block among
    /// `propose_candidates`, or the round's carried `next` value if one
    /// was set and is not the null carry.
    pub fn decide_soft(&self, previous_anchor: Hash, propose_candidates: &[Hash]) -> Option<Hash> {
        let state = self.state.read();
        if let Some(carried) = state.carried_next_value {
            if carried != NULL_HASH {
                return Some(carried);
            }
        }
        drop(state);
        propose_candidates
            .iter()
            .filter(|hash| self.dag.is_buildable(hash, &previous_anchor))
            .min()
            .copied()
    }

    /// `cert` step entry action: cert-vote for `soft_quorum_value` iff it
    /// is locally buildable.
    pub fn decide_cert(&self, previous_anchor: Hash, soft_quorum_value: Hash) -> Option<Hash> {
        self.dag.is_buildable(&soft_quorum_value, &previous_anchor).then_some(soft_quorum_value)
    }

    /// `next (even)`/`next (odd)` entry action: next-vote for the
    /// soft/cert-voted value respectively, else the null hash.
    pub fn decide_next(&self) -> Hash {
        let state = self.state.read();
        if state.step.is_next_even() {
            state.soft_value.unwrap_or(NULL_HASH)
        } else {
            state.cert_value.unwrap_or(NULL_HASH)
        }
    }

    pub fn record_soft_value(&self, value: Hash) {
        self.state.write().soft_value = Some(value);
    }

    pub fn record_cert_value(&self, value: Hash) {
        self.state.write().cert_value = Some(value);
    }

    pub fn advance_step(&self) {
        self.state.write().advance_step();
    }

    pub fn advance_round(&self, carried_value: Hash) {
        self.state.write().advance_round(carried_value);
    }

    pub fn two_t_plus_one_weight(&self, period: Period) -> u64 {
        two_t_plus_one(self.dpos.total_eligible_votes(period))
    }

    /// Record a `2t+1 cert` observation for `hash` at `period`. Returns
    /// `Err(ChainFork)` — non-fatal to this node — if a *different* hash
    /// was already certified for the same period.
    pub fn observe_certification(&self, period: Period, hash: Hash) -> PbftResult<()> {
        let mut certified = self.certified.write();
        match certified.get(&period) {
            Some(existing) if *existing != hash => {
                Err(PbftError::ChainFork { period, canonical: *existing, other: hash })
            }
            Some(_) => Ok(()),
            None => {
                certified.insert(period, hash);
                Ok(())
            }
        }
    }

    /// Reset to round 1 / `propose` for the next period after
    /// finalization; drops certification bookkeeping for the finalized
    /// period and anything older (nothing references it anymore).
    pub fn finalize_period(&self) {
        let mut state = self.state.write();
        let finalized = state.period;
        state.advance_period();
        drop(state);
        self.certified.write().retain(|period, _| *period > finalized);
    }

    pub fn should_rebroadcast_next(&self) -> bool {
        self.state.read().rounds_without_certification >= self.config.run_count_votes
    }

    /// Build and sign a vote for `block_hash` at `(period, round, step)`.
    /// `weight` is left unset (`OptWeight(None)`) — vote-manager fills it
    /// in once it checks the voter's DPoS stake at verification time.
    pub fn cast_vote(&self, period: Period, round: u64, step: u64, block_hash: Hash, vrf_proof: VrfProof) -> Vote {
        let mut vote = Vote {
            block_hash,
            period,
            round,
            step,
            weight: OptWeight(None),
            vrf_proof: encode_vrf_proof(&vrf_proof),
            v: 0,
            r: [0u8; 32],
            s: [0u8; 32],
        };
        let signing_hash = vote.signing_hash();
        let sig = self.signer.sign_prehash(&signing_hash, 0);
        vote.v = sig.v;
        vote.r = sig.r;
        vote.s = sig.s;
        vote
    }
}

/// `output(32) || proof(64)` — the wire encoding of a VRF proof inside a
/// vote's `vrf_proof` byte string.
pub fn encode_vrf_proof(proof: &VrfProof) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(96);
    bytes.extend_from_slice(&proof.output);
    bytes.extend_from_slice(&proof.proof);
    bytes
}

pub fn decode_vrf_proof(bytes: &[u8]) -> Option<VrfProof> {
    if bytes.len() != 96 {
        return None;
    }
    let mut output = [0u8; 32];
    let mut proof = [0u8; 64];
    output.copy_from_slice(&bytes[..32]);
    proof.copy_from_slice(&bytes[32..]);
    Some(VrfProof { output, proof })
}
