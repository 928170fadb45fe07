//! DAG-layer configuration: `spec.md` §6 `dag.*` plus the frontier-selection
//! and proposer knobs the DAG manager and proposer need directly rather
//! than through the PBFT config section.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct DagConfig {
    /// `dag.gas_limit`: sum of `gas_estimations` a DAG block may not exceed.
    pub gas_limit: u64,
    /// `dag.max_levels_per_period`: band width of `ProposalPeriodMap`.
    pub max_levels_per_period: u64,
    /// `pbft.ghost_path_move_back`: how many steps the heaviest-past pivot
    /// walks back toward the anchor.
    pub ghost_path_move_back: u32,
    /// `block_proposer.shard` / implicit total shard count: a proposer only
    /// packs transactions where `hash(tx) mod shard_count == shard`.
    pub shard: u64,
    pub shard_count: u64,
    /// `block_proposer.transaction_limit`.
    pub transaction_limit: usize,
    /// `block_proposer.min_proposal_delay`, milliseconds.
    pub min_proposal_delay_ms: u64,
    /// `sortition.vdf`'s `max_num_tries` bound on stale-class retries before
    /// the proposer backs off.
    pub max_num_tries: u32,
}

impl Default for DagConfig {
    fn default() -> Self {
        Self {
            gas_limit: 15_000_000,
            max_levels_per_period: 100,
            ghost_path_move_back: 1,
            shard: 0,
            shard_count: 1,
            transaction_limit: 2_000,
            min_proposal_delay_ms: 125,
            max_num_tries: 5,
        }
    }
}

impl DagConfig {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.max_levels_per_period == 0 {
            return Err("dag.max_levels_per_period must be non-zero");
        }
        if self.shard_count == 0 {
            return Err("block_proposer shard_count must be non-zero");
        }
        if self.shard >= self.shard_count {
            return Err("block_proposer.shard must be < shard_count");
        }
        if self.gas_limit == 0 {
            return Err("dag.gas_limit must be non-zero");
        }
        Ok(())
    }
}
