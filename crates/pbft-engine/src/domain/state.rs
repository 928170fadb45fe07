//! The `(period, round, step)` tuple and the values a round carries
//! forward across steps — spec.md §4.3's five-row step table.

use core_types::{classify_step, Hash, Period, VoteType, NULL_HASH};

/// Raw step number, interpreted via [`core_types::classify_step`]. Steps
/// `>= 4` are all `next`, alternating even/odd by parity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PbftStep(pub u64);

impl PbftStep {
    pub const PROPOSE: PbftStep = PbftStep(1);
    pub const SOFT: PbftStep = PbftStep(2);
    pub const CERT: PbftStep = PbftStep(3);

    pub fn kind(self) -> VoteType {
        classify_step(self.0)
    }

    pub fn is_next_even(self) -> bool {
        self.kind() == VoteType::Next && self.0 % 2 == 0
    }

    pub fn is_next_odd(self) -> bool {
        self.kind() == VoteType::Next && self.0 % 2 == 1
    }

    /// The next step in sequence: `propose -> soft -> cert -> next(4) ->
    /// next(5) -> ...`, never wrapping back to `propose` within a round —
    /// only `start_round` does that.
    pub fn successor(self) -> PbftStep {
        PbftStep(self.0 + 1)
    }
}

/// The PBFT driver's working state for the period currently being decided.
/// Owned behind a lock by `PbftManager`; `round_clock` is tracked
/// alongside it by the driver loop.
#[derive(Clone, Debug)]
pub struct RoundState {
    pub period: Period,
    pub round: u64,
    pub step: PbftStep,
    /// This node's own `soft`-voted value for the current round, if any.
    pub soft_value: Option<Hash>,
    /// This node's own `cert`-voted value for the current round, if any.
    pub cert_value: Option<Hash>,
    /// The value carried forward by the previous round's `2t+1 next`
    /// quorum — biases the `soft` step per the step table's "or for the
    /// value of a next-voted block from a previous round" clause.
    /// `Some(NULL_HASH)` denotes an explicit null carry, distinct from
    /// `None` (no quorum yet observed for any value).
    pub carried_next_value: Option<Hash>,
    /// Consecutive rounds since this period's last certification attempt
    /// made it past `cert`, for the liveness guardrail.
    pub rounds_without_certification: u32,
}

impl RoundState {
    pub fn genesis(period: Period) -> Self {
        Self {
            period,
            round: 1,
            step: PbftStep::PROPOSE,
            soft_value: None,
            cert_value: None,
            carried_next_value: None,
            rounds_without_certification: 0,
        }
    }

    /// Advance to a new round within the same period, carrying `V` from
    /// the triggering `2t+1 next` quorum (spec.md §4.3: "carry V as the
    /// previous round next-voted value").
    pub fn advance_round(&mut self, carried_value: Hash) {
        self.round += 1;
        self.step = PbftStep::PROPOSE;
        self.soft_value = None;
        self.cert_value = None;
        self.carried_next_value = Some(carried_value);
        self.rounds_without_certification += 1;
    }

    /// Reset to round 1, `propose`, for the next period after a
    /// certification.
    pub fn advance_period(&mut self) {
        self.period += 1;
        self.round = 1;
        self.step = PbftStep::PROPOSE;
        self.soft_value = None;
        self.cert_value = None;
        self.carried_next_value = None;
        self.rounds_without_certification = 0;
    }

    pub fn advance_step(&mut self) {
        self.step = self.step.successor();
    }

    pub fn is_null_carry(&self) -> bool {
        self.carried_next_value == Some(NULL_HASH)
    }
}
