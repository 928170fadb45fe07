//! The verified-vote index: one of spec.md §5's three named shared
//! resources. Keyed by `(period, round, step)` slot, then by the block
//! hash being voted for, aggregating into a [`VoteBundle`] per value so
//! `2t+1` detection is just a weight sum per value.

use std::collections::{HashMap, HashSet};

use core_types::{classify_step, Address, DoubleVoteKey, Hash, Period, Vote, VoteBundle, VoteType};

use crate::error::VoteError;

type SlotKey = (Period, u64, u64);

#[derive(Default)]
pub struct VerifiedIndex {
    seen: HashSet<Hash>,
    by_slot: HashMap<SlotKey, HashMap<Hash, VoteBundle>>,
    double_vote: HashMap<DoubleVoteKey, Hash>,
    reward_votes: HashMap<Period, VoteBundle>,
}

impl VerifiedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_known(&self, vote_hash: &Hash) -> bool {
        self.seen.contains(vote_hash)
    }

    /// Insert an already-verified, weighted vote. Returns
    /// `Err(VoteError::DoubleVote)` — without inserting — if `voter`
    /// already has a *different* vote recorded for this vote's
    /// `(period, round, step)` slot.
    pub fn insert(&mut self, vote: Vote, voter: Address) -> Result<(), VoteError> {
        let vote_hash = vote.hash();
        if self.seen.contains(&vote_hash) {
            return Err(VoteError::AlreadyKnown(vote_hash));
        }

        let key = vote.double_vote_key(voter);
        match self.double_vote.get(&key) {
            Some(existing) if *existing != vote.block_hash => {
                return Err(VoteError::DoubleVote(vote_hash));
            }
            _ => {
                self.double_vote.insert(key, vote.block_hash);
            }
        }

        self.seen.insert(vote_hash);
        if vote.vote_type() == VoteType::Cert {
            self.reward_votes.entry(vote.period).or_default().votes.push(vote.clone());
        }

        let slot = (vote.period, vote.round, vote.step);
        self.by_slot.entry(slot).or_default().entry(vote.block_hash).or_default().votes.push(vote);
        Ok(())
    }

    /// The block hash whose aggregate weight at `(period, round, step)`
    /// reaches `required_weight` (the caller's `2t+1`), if any.
    pub fn quorum_value(&self, period: Period, round: u64, step: u64, required_weight: u64) -> Option<Hash> {
        let bundles = self.by_slot.get(&(period, round, step))?;
        bundles
            .iter()
            .find(|(_, bundle)| bundle.aggregate_weight() >= required_weight)
            .map(|(hash, _)| *hash)
    }

    /// Distinct block hashes proposed at `(period, round)`'s `propose`
    /// step, for the `soft` step's lowest-hash selection.
    pub fn propose_candidates(&self, period: Period, round: u64) -> Vec<Hash> {
        self.by_slot.get(&(period, round, 1)).map(|m| m.keys().copied().collect()).unwrap_or_default()
    }

    /// The `next`-step bundle at `round` that reached quorum for a
    /// non-null value, searching the highest step first (the most recent
    /// attempt within that round).
    pub fn quorum_next_bundle(&self, period: Period, round: u64, required_weight: u64) -> Option<VoteBundle> {
        let mut best: Option<(u64, &VoteBundle)> = None;
        for (&(p, r, step), bundles) in self.by_slot.iter() {
            if p != period || r != round || classify_step(step) != VoteType::Next {
                continue;
            }
            for (hash, bundle) in bundles.iter() {
                if *hash == core_types::NULL_HASH {
                    continue;
                }
                if bundle.aggregate_weight() < required_weight {
                    continue;
                }
                if best.map(|(s, _)| step > s).unwrap_or(true) {
                    best = Some((step, bundle));
                }
            }
        }
        best.map(|(_, bundle)| bundle.clone())
    }

    pub fn reward_votes_for_period(&self, period: Period) -> Option<VoteBundle> {
        self.reward_votes.get(&period).cloned()
    }

    /// Drop every slot whose `(period, round)` is no longer relevant:
    /// periods below `current_period`, and rounds more than
    /// `round_retention` behind `current_round` within `current_period`.
    /// Reward votes for finalized periods are pruned separately by the
    /// caller once consumed (they outlive the round bookkeeping).
    pub fn cleanup(&mut self, current_period: Period, current_round: u64, round_retention: u64) {
        self.by_slot.retain(|&(period, round, _), _| {
            period == current_period && round.saturating_add(round_retention) >= current_round
        });
        self.double_vote.retain(|key, _| {
            key.period == current_period && key.round.saturating_add(round_retention) >= current_round
        });
    }

    pub fn drop_reward_votes_before(&mut self, period: Period) {
        self.reward_votes.retain(|&p, _| p >= period);
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
