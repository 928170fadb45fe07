//! Driven ports: collaborators the PBFT driver calls out through. Vote
//! verification/aggregation lives entirely in `vote-manager` — this crate
//! only asks it for quorum bundles and hands it locally-cast votes to
//! verify and broadcast.

use core_types::{Address, Hash, Period, VoteBundle};

/// The slice of `StateAPI`/DPoS accounting the round/step machine needs:
/// per-voter weight and the period total, used for both `2t+1` and
/// step-eligibility sortition.
pub trait DposGateway: Send + Sync {
    fn vote_weight(&self, voter: &Address, period: Period) -> u64;
    fn total_eligible_votes(&self, period: Period) -> u64;
}

/// The slice of the DAG layer the PBFT driver needs: a proposal candidate
/// under the previous anchor, and a buildability check (DAG-available,
/// chain-of-parents back to the previous anchor) before cert-voting.
pub trait DagCandidateGateway: Send + Sync {
    /// The locally-selected anchor candidate: the heaviest DAG block under
    /// the ghost-path pivot of `previous_anchor`.
    fn heaviest_candidate(&self, previous_anchor: Hash) -> Option<Hash>;
    fn is_buildable(&self, block_hash: &Hash, previous_anchor: &Hash) -> bool;
}

/// The vote manager's interface as seen from the PBFT driver: hand it a
/// locally-cast vote to verify/index/broadcast, and query its quorum
/// index for threshold detection.
pub trait VoteQuorumGateway: Send + Sync {
    fn submit_local_vote(&self, vote: core_types::Vote);
    /// The block hash (possibly the null hash, for `next`) that has
    /// reached `2t+1` aggregate weight at `(period, round, step)`, if
    /// any. Vote-manager owns the per-hash aggregation; the driver only
    /// ever needs to know *whether* and *for what* a step's quorum fired.
    fn quorum_value(&self, period: Period, round: u64, step: u64) -> Option<Hash>;
    /// Raw received `propose` votes for `(period, round)`, for the `soft`
    /// step's self-verifiable lowest-hash selection.
    fn propose_candidates(&self, period: Period, round: u64) -> Vec<Hash>;
    /// The previous round's `next` quorum bundle, used to rebroadcast
    /// under the liveness guardrail.
    fn previous_round_next_bundle(&self, period: Period, round: u64) -> Option<VoteBundle>;
}

/// The chain-head query the driver needs to select and validate anchors
/// relative to the previously finalized period.
pub trait ChainGateway: Send + Sync {
    fn previous_anchor(&self, period: Period) -> Hash;
}

/// The period finalizer's interface as seen by the PBFT driver: once a
/// `2t+1 cert` quorum is observed for an anchor, the driver hands off to
/// whatever subsystem actually finalizes the period (sub-DAG collection,
/// execution, atomic DB batch, chain-head advance) — `period-finalizer`,
/// composed with this crate only through `core-node`'s wiring.
#[async_trait::async_trait]
pub trait FinalizationGateway: Send + Sync {
    /// Finalize `period`, anchored at `anchor_hash` (the `2t+1`-certified
    /// DAG block). Returns once the period's DB batch has committed and
    /// the chain head has advanced — the driver moves on to the next
    /// period only after this resolves.
    async fn finalize_period(&self, period: Period, round: u64, anchor_hash: Hash);
}
