//! `vote_manager.*` configuration — spec.md §6.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteManagerConfig {
    /// Rounds of history, per period, `cleanup` retains below the current
    /// round before discarding a period/round slot's verified index —
    /// bounds memory for periods stuck re-rounding under the liveness
    /// guardrail.
    pub round_retention: u64,
}

impl Default for VoteManagerConfig {
    fn default() -> Self {
        Self { round_retention: 3 }
    }
}

impl VoteManagerConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.round_retention == 0 {
            return Err("round_retention must be non-zero".into());
        }
        Ok(())
    }
}
