//! `VoteManager`: signature/VRF verification pipeline for incoming votes,
//! `2t+1` quorum queries, and the `pbft-engine::VoteQuorumGateway`
//! implementation the PBFT driver calls out through — spec.md §4.4.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::warn;

use core_bus::{CoreEvent, EventBus};
use core_crypto::ecdsa::RecoverableSignature;
use core_types::rlp_util::OptWeight;
use core_types::{Address, Hash, Period, Vote, VoteBundle};
use pbft_engine::{decode_vrf_proof, step_sortition_message, two_t_plus_one};

use crate::config::VoteManagerConfig;
use crate::domain::index::VerifiedIndex;
use crate::error::{VoteError, VoteResult};
use crate::ports::outbound::{DposGateway, ValidatorKeyGateway};

/// Votes are signed with `chain_id = 0` (no EIP-155 folding) — they are
/// never replayed cross-chain the way transactions are.
const VOTE_CHAIN_ID: u64 = 0;

pub struct VoteManager {
    index: RwLock<VerifiedIndex>,
    dpos: Arc<dyn DposGateway>,
    validators: Arc<dyn ValidatorKeyGateway>,
    bus: Arc<EventBus>,
    config: VoteManagerConfig,
}

impl VoteManager {
    pub fn new(
        dpos: Arc<dyn DposGateway>,
        validators: Arc<dyn ValidatorKeyGateway>,
        bus: Arc<EventBus>,
        config: VoteManagerConfig,
    ) -> Self {
        Self { index: RwLock::new(VerifiedIndex::new()), dpos, validators, bus, config }
    }

    /// Verify `vote`'s signature, VRF sortition proof and DPoS weight,
    /// fill in its `weight` field, and index it. Returns the recovered
    /// voter address on success.
    pub fn verify_and_index(&self, mut vote: Vote) -> VoteResult<Address> {
        let vote_hash = vote.hash();
        if self.index.read().is_known(&vote_hash) {
            return Err(VoteError::AlreadyKnown(vote_hash));
        }
        if !vote.respects_null_hash_rule() {
            return Err(VoteError::NullHashViolation(vote_hash));
        }

        let sig = RecoverableSignature { r: vote.r, s: vote.s, v: vote.v };
        let voter = sig
            .recover_address(&vote.signing_hash(), VOTE_CHAIN_ID)
            .map_err(|_| VoteError::InvalidSignature(vote_hash))?;

        let vrf_key =
            self.validators.vrf_public_key(&voter, vote.period).ok_or(VoteError::UnknownVoter(vote_hash))?;
        let proof = decode_vrf_proof(&vote.vrf_proof).ok_or(VoteError::InvalidVrfProof(vote_hash))?;
        let message = step_sortition_message(vote.period, vote.round, vote.step);
        vrf_key.verify(&message, &proof).map_err(|_| VoteError::InvalidVrfProof(vote_hash))?;

        let weight = self.dpos.vote_weight(&voter, vote.period);
        if weight == 0 {
            return Err(VoteError::NotEligible(vote_hash));
        }
        vote.weight = OptWeight(Some(weight));

        match self.index.write().insert(vote.clone(), voter) {
            Ok(()) => Ok(voter),
            Err(VoteError::DoubleVote(h)) => {
                self.bus.publish(CoreEvent::Equivocation {
                    period: vote.period,
                    round: vote.round,
                    step: vote.step,
                });
                warn!(?voter, period = vote.period, round = vote.round, step = vote.step, "double vote detected");
                Err(VoteError::DoubleVote(h))
            }
            Err(other) => Err(other),
        }
    }

    pub fn quorum_value(&self, period: Period, round: u64, step: u64) -> Option<Hash> {
        let required = two_t_plus_one(self.dpos.total_eligible_votes(period));
        self.index.read().quorum_value(period, round, step, required)
    }

    pub fn propose_candidates(&self, period: Period, round: u64) -> Vec<Hash> {
        self.index.read().propose_candidates(period, round)
    }

    pub fn previous_round_next_bundle(&self, period: Period, round: u64) -> Option<VoteBundle> {
        if round == 0 {
            return None;
        }
        let required = two_t_plus_one(self.dpos.total_eligible_votes(period));
        self.index.read().quorum_next_bundle(period, round - 1, required)
    }

    pub fn reward_votes_for_period(&self, period: Period) -> Option<VoteBundle> {
        self.index.read().reward_votes_for_period(period)
    }

    /// Bound memory for a period whose round keeps advancing under the
    /// liveness guardrail; called by `core-node`'s wiring after every
    /// round advance.
    pub fn cleanup(&self, current_period: Period, current_round: u64) {
        self.index.write().cleanup(current_period, current_round, self.config.round_retention);
    }

    /// Drop reward-vote bookkeeping for periods before `period`, once the
    /// period finalizer has consumed them into its rewards stats.
    pub fn drop_reward_votes_before(&self, period: Period) {
        self.index.write().drop_reward_votes_before(period);
    }

    pub fn len(&self) -> usize {
        self.index.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.read().is_empty()
    }
}

impl crate::ports::inbound::VoteInbound for VoteManager {
    /// A gossiped vote: verify and index it like any other, publish it
    /// onward only if this is the first time we've seen it (re-gossip of
    /// an already-indexed vote is silent, not an error).
    fn on_vote(&self, vote: Vote, peer: &str) -> VoteResult<()> {
        match self.verify_and_index(vote.clone()) {
            Ok(_voter) => {
                self.bus.publish(CoreEvent::VoteReady(vote));
                Ok(())
            }
            Err(VoteError::AlreadyKnown(_)) => Ok(()),
            Err(err) => {
                warn!(peer, error = %err, "rejected gossiped vote");
                Err(err)
            }
        }
    }

    /// A votes-bundle (next-votes or reward-votes) received as a unit:
    /// each member vote is verified/indexed independently. A bundle
    /// partially composed of already-known or double-voting entries still
    /// indexes every new, valid member rather than rejecting the whole
    /// bundle on the first bad entry.
    fn on_votes_bundle(
        &self,
        _topic: core_bus::VoteBundleTopic,
        bundle: VoteBundle,
        peer: &str,
    ) -> VoteResult<()> {
        let mut last_err = None;
        for vote in bundle.votes {
            if let Err(err) = self.on_vote(vote, peer) {
                last_err = Some(err);
            }
        }
        match last_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl pbft_engine::VoteQuorumGateway for VoteManager {
    /// A locally-cast vote is self-verified exactly like a gossiped one
    /// (catches signing-key/period mismatches early) and broadcast only
    /// once indexing succeeds.
    fn submit_local_vote(&self, vote: Vote) {
        match self.verify_and_index(vote.clone()) {
            Ok(_voter) => {
                self.bus.publish(CoreEvent::VoteReady(vote));
            }
            Err(err) => {
                warn!(error = %err, "locally cast vote failed self-verification");
            }
        }
    }

    fn quorum_value(&self, period: Period, round: u64, step: u64) -> Option<Hash> {
        self.quorum_value(period, round, step)
    }

    fn propose_candidates(&self, period: Period, round: u64) -> Vec<Hash> {
        self.propose_candidates(period, round)
    }

    fn previous_round_next_bundle(&self, period: Period, round: u64) -> Option<VoteBundle> {
        self.previous_round_next_bundle(period, round)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_crypto::ecdsa::Secp256k1KeyPair;
    use core_crypto::vrf::VrfKeyPair;

    struct FixedDpos {
        weight: u64,
        total: u64,
    }
    impl DposGateway for FixedDpos {
        fn vote_weight(&self, _voter: &Address, _period: Period) -> u64 {
            self.weight
        }
        fn total_eligible_votes(&self, _period: Period) -> u64 {
            self.total
        }
    }

    struct FixedValidators(core_crypto::vrf::VrfPublicKey);
    impl ValidatorKeyGateway for FixedValidators {
        fn vrf_public_key(&self, _voter: &Address, _period: Period) -> Option<core_crypto::vrf::VrfPublicKey> {
            Some(self.0)
        }
    }

    fn cast_vote(signer: &Secp256k1KeyPair, vrf: &VrfKeyPair, period: Period, round: u64, step: u64, block_hash: Hash) -> Vote {
        let message = step_sortition_message(period, round, step);
        let proof = vrf.prove(&message);
        let mut vote = Vote {
            block_hash,
            period,
            round,
            step,
            weight: OptWeight(None),
            vrf_proof: pbft_engine::encode_vrf_proof(&proof),
            v: 0,
            r: [0u8; 32],
            s: [0u8; 32],
        };
        let sig = signer.sign_prehash(&vote.signing_hash(), VOTE_CHAIN_ID);
        vote.v = sig.v;
        vote.r = sig.r;
        vote.s = sig.s;
        vote
    }

    fn manager(weight: u64, total: u64, vrf_public: core_crypto::vrf::VrfPublicKey) -> VoteManager {
        VoteManager::new(
            Arc::new(FixedDpos { weight, total }),
            Arc::new(FixedValidators(vrf_public)),
            Arc::new(EventBus::new()),
            VoteManagerConfig::default(),
        )
    }

    #[test]
    fn verifies_signature_vrf_and_fills_in_weight() {
        let signer = Secp256k1KeyPair::generate();
        let vrf = VrfKeyPair::generate();
        let mgr = manager(7, 21, vrf.public());
        let vote = cast_vote(&signer, &vrf, 1, 1, 3, [9u8; 32]);
        let voter = mgr.verify_and_index(vote).unwrap();
        assert_eq!(voter, signer.address());
        assert_eq!(mgr.len(), 1);
    }

    #[test]
    fn zero_weight_voter_is_rejected() {
        let signer = Secp256k1KeyPair::generate();
        let vrf = VrfKeyPair::generate();
        let mgr = manager(0, 21, vrf.public());
        let vote = cast_vote(&signer, &vrf, 1, 1, 3, [9u8; 32]);
        assert!(matches!(mgr.verify_and_index(vote), Err(VoteError::NotEligible(_))));
    }

    #[test]
    fn quorum_reached_once_weight_crosses_two_t_plus_one() {
        let vrf = VrfKeyPair::generate();
        let mgr = manager(15, 21, vrf.public());
        let signer = Secp256k1KeyPair::generate();
        let vote = cast_vote(&signer, &vrf, 1, 1, 3, [9u8; 32]);
        mgr.verify_and_index(vote).unwrap();
        assert_eq!(mgr.quorum_value(1, 1, 3), Some([9u8; 32]));
    }

    #[test]
    fn double_vote_is_rejected_and_does_not_corrupt_the_first() {
        let signer = Secp256k1KeyPair::generate();
        let vrf = VrfKeyPair::generate();
        let mgr = manager(7, 21, vrf.public());
        let first = cast_vote(&signer, &vrf, 1, 1, 3, [1u8; 32]);
        mgr.verify_and_index(first).unwrap();
        let second = cast_vote(&signer, &vrf, 1, 1, 3, [2u8; 32]);
        assert!(matches!(mgr.verify_and_index(second), Err(VoteError::DoubleVote(_))));
        assert_eq!(mgr.len(), 1);
    }

    #[test]
    fn null_hash_is_rejected_outside_next_step() {
        let signer = Secp256k1KeyPair::generate();
        let vrf = VrfKeyPair::generate();
        let mgr = manager(7, 21, vrf.public());
        let vote = cast_vote(&signer, &vrf, 1, 1, 3, core_types::NULL_HASH);
        assert!(matches!(mgr.verify_and_index(vote), Err(VoteError::NullHashViolation(_))));
    }
}
