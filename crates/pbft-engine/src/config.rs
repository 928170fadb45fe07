//! `pbft.*` configuration — spec.md §6.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PbftConfig {
    /// Minimum step floor; the round clock's only source of timeouts never
    /// fires below this.
    pub lambda_ms_min: u64,
    /// The doubling cap: `lambda_ms` for a step never exceeds this value.
    /// Not separately named in the enumerated config, but the table is
    /// explicit that the doubling is bounded by "a configurable maximum" —
    /// surfaced as its own field rather than silently hardcoded.
    pub lambda_ms_max: u64,
    /// Target PBFT committee size for step-eligibility sortition.
    pub committee_size: u32,
    /// Target number of eligible block proposers per round.
    pub number_of_proposers: u32,
    /// Max DAG blocks a single period's sub-DAG may include.
    pub dag_blocks_size: u64,
    pub ghost_path_move_back: u32,
    /// Rounds without certification before the liveness guardrail
    /// rebroadcasts the most recent next-votes bundle.
    pub run_count_votes: u32,
    pub chain_id: u64,
}

impl Default for PbftConfig {
    fn default() -> Self {
        Self {
            lambda_ms_min: 1_500,
            lambda_ms_max: 60_000,
            committee_size: 20,
            number_of_proposers: 20,
            dag_blocks_size: 50,
            ghost_path_move_back: 1,
            run_count_votes: 10,
            chain_id: 1,
        }
    }
}

impl PbftConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.lambda_ms_min == 0 {
            return Err("lambda_ms_min must be non-zero".into());
        }
        if self.lambda_ms_max < self.lambda_ms_min {
            return Err("lambda_ms_max must be >= lambda_ms_min".into());
        }
        if self.committee_size == 0 {
            return Err("committee_size must be non-zero".into());
        }
        if self.run_count_votes == 0 {
            return Err("run_count_votes must be non-zero".into());
        }
        Ok(())
    }
}
