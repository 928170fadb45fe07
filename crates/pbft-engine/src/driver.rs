//! The async round/step driver loop: the only place in this crate that
//! sleeps, selects, or touches wall-clock time. Reads `RoundClock`
//! timeouts, calls into `PbftManager`'s pure decisions, casts and submits
//! votes through `VoteQuorumGateway`, and hands off to `period-finalizer`
//! (via `FinalizationGateway`) once a `cert` quorum certifies a period.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::Notify;
use tracing::{debug, info, warn};

use core_bus::{CoreEvent, EventBus, VoteBundleTopic};
use core_types::{Hash, Period, NULL_HASH};

use crate::domain::chain::PbftChain;
use crate::domain::manager::PbftManager;
use crate::domain::round_clock::RoundClock;
use crate::domain::state::PbftStep;
use crate::error::PbftResult;
use crate::ports::inbound::PbftInbound;
use crate::ports::outbound::{FinalizationGateway, VoteQuorumGateway};

/// What one pass through `step_once` did, surfaced for tests and for
/// `run`'s loop-control decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// Cast (or attempted to cast) the current step's vote; nothing else
    /// changed yet.
    Voted,
    /// This node is not in the sortition committee for this step; nothing
    /// was cast.
    NotEligible,
    /// A `cert` quorum certified the period; finalization has been
    /// handed off and the manager has rolled over to the next period.
    PeriodFinalized,
    /// A `next` quorum carried a value forward; the round advanced.
    RoundAdvanced,
    /// No quorum yet and the step timed out; advanced to the next step
    /// within the same round.
    StepAdvanced,
    /// Neither a quorum nor a timeout — nothing to do this tick.
    Idle,
}

pub struct PbftDriver {
    manager: Arc<PbftManager>,
    chain: Arc<PbftChain>,
    votes: Arc<dyn VoteQuorumGateway>,
    finalizer: Arc<dyn FinalizationGateway>,
    bus: Arc<EventBus>,
    clock: Mutex<RoundClock>,
    wake: Notify,
}

impl PbftDriver {
    pub fn new(
        manager: Arc<PbftManager>,
        chain: Arc<PbftChain>,
        votes: Arc<dyn VoteQuorumGateway>,
        finalizer: Arc<dyn FinalizationGateway>,
        bus: Arc<EventBus>,
    ) -> Self {
        let config = manager.config();
        let clock = RoundClock::new(config.lambda_ms_min, config.lambda_ms_max);
        Self { manager, chain, votes, finalizer, bus, clock: Mutex::new(clock), wake: Notify::new() }
    }

    pub fn manager(&self) -> &Arc<PbftManager> {
        &self.manager
    }

    pub fn chain(&self) -> &Arc<PbftChain> {
        &self.chain
    }

    /// Drive rounds/steps forever, sleeping until either the current
    /// step's `lambda_ms` elapses or something calls [`Self::wake_up`].
    pub async fn run(&self) {
        loop {
            let timeout = { self.clock.lock().step_timeout() };
            tokio::select! {
                _ = tokio::time::sleep(timeout) => {}
                _ = self.wake.notified() => {}
            }
            self.step_once().await;
        }
    }

    /// One tick: cast this step's vote if not already cast, then check
    /// for quorum/timeout transitions. Idempotent to call repeatedly
    /// within the same step — `cast_if_needed` only casts once per
    /// `(period, round, step)` because `RoundState` tracks whether this
    /// node has already voted via `soft_value`/`cert_value`, and
    /// `propose`/`next` steps are cheap to re-cast (the gateway dedupes).
    pub async fn step_once(&self) -> StepOutcome {
        let state = self.manager.state();
        let previous_anchor = self.chain.previous_anchor(state.period);

        let voted = self.cast_step_vote(&state, previous_anchor);

        if let Some(outcome) = self.check_cert_quorum(state.period, state.round).await {
            return outcome;
        }

        if state.step.kind() == core_types::VoteType::Next {
            if let Some(carried) = self.votes.quorum_value(state.period, state.round, state.step.0) {
                self.manager.advance_round(carried);
                self.clock.lock().start_round();
                info!(period = state.period, round = state.round + 1, "round advanced on next quorum");
                return StepOutcome::RoundAdvanced;
            }
        }

        let expired = { self.clock.lock().step_expired() };
        if expired {
            self.manager.advance_step();
            self.clock.lock().start_step();
            if self.manager.should_rebroadcast_next() {
                self.rebroadcast_next_votes(state.period, state.round).await;
            }
            return StepOutcome::StepAdvanced;
        }

        if voted {
            StepOutcome::Voted
        } else {
            StepOutcome::Idle
        }
    }

    fn cast_step_vote(&self, state: &crate::domain::state::RoundState, previous_anchor: Hash) -> bool {
        let (period, round, step) = (state.period, state.round, state.step);
        match step.kind() {
            core_types::VoteType::Propose => match self.manager.decide_propose(previous_anchor) {
                Some((hash, proof)) => {
                    self.submit(period, round, step.0, hash, proof);
                    true
                }
                None => false,
            },
            core_types::VoteType::Soft => {
                let candidates = self.votes.propose_candidates(period, round);
                match self.manager.decide_soft(previous_anchor, &candidates) {
                    Some(value) => {
                        self.manager.record_soft_value(value);
                        let (eligible, proof) = self.manager.eligibility(period, round, step.0);
                        if eligible {
                            self.submit(period, round, step.0, value, proof);
                        }
                        eligible
                    }
                    None => false,
                }
            }
            core_types::VoteType::Cert => {
                match self.votes.quorum_value(period, round, PbftStep::SOFT.0) {
                    Some(soft_value) => match self.manager.decide_cert(previous_anchor, soft_value) {
                        Some(value) => {
                            self.manager.record_cert_value(value);
                            let (eligible, proof) = self.manager.eligibility(period, round, step.0);
                            if eligible {
                                self.submit(period, round, step.0, value, proof);
                            }
                            eligible
                        }
                        None => false,
                    },
                    None => false,
                }
            }
            core_types::VoteType::Next => {
                let value = self.manager.decide_next();
                let (eligible, proof) = self.manager.eligibility(period, round, step.0);
                if eligible {
                    self.submit(period, round, step.0, value, proof);
                }
                eligible
            }
        }
    }

    fn submit(&self, period: Period, round: u64, step: u64, block_hash: Hash, proof: core_crypto::vrf::VrfProof) {
        let vote = self.manager.cast_vote(period, round, step, block_hash, proof);
        debug!(period, round, step, ?block_hash, "cast vote");
        self.votes.submit_local_vote(vote);
    }

    /// `cert` quorum can arrive for a `period` regardless of which step
    /// this node itself is in — certification votes keep propagating
    /// after the proposing window, so this checks the cert step's quorum
    /// every tick, not only while this node is locally on `cert`.
    async fn check_cert_quorum(&self, period: Period, round: u64) -> Option<StepOutcome> {
        let hash = self.votes.quorum_value(period, round, PbftStep::CERT.0)?;
        if hash == NULL_HASH {
            return None;
        }
        match self.manager.observe_certification(period, hash) {
            Ok(()) => {
                info!(period, round, anchor = ?hash, "period certified");
                self.finalizer.finalize_period(period, round, hash).await;
                self.manager.finalize_period();
                self.clock.lock().start_round();
                Some(StepOutcome::PeriodFinalized)
            }
            Err(err) => {
                warn!(%err, "continuing with locally-canonical certification");
                None
            }
        }
    }

    async fn rebroadcast_next_votes(&self, period: Period, round: u64) {
        if let Some(bundle) = self.votes.previous_round_next_bundle(period, round) {
            self.bus.publish(CoreEvent::VotesBundleReady { topic: VoteBundleTopic::NextVotes, bundle });
        }
    }
}

impl PbftInbound for PbftDriver {
    fn on_pbft_block(&self, block: core_types::PbftBlock, peer: &str) -> PbftResult<()> {
        debug!(peer, period = block.period, "received pbft block");
        Ok(())
    }

    fn wake_up(&self) {
        self.wake.notify_one();
    }
}
