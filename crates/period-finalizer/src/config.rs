use core_types::Period;
use serde::{Deserialize, Serialize};

/// `final_chain.*` settings the finalizer needs directly, rather than
/// through `pbft.*` or `dag.*` sections those other crates already own.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalizerConfig {
    /// `final_chain.replay_protection_service.range`: trailing period
    /// window a sender's nonce watermark is rolled forward over.
    pub replay_protection_range: u64,
    /// First period at which `ChainHead::second_last_pbft_block` starts
    /// being populated. `None` means the pillar-chain fork never
    /// activates on this chain.
    pub pillar_fork_activation_period: Option<Period>,
    /// `dag.gas_limit`, mirrored from the DAG layer's own config so the
    /// sortition controller can compute this period's observed
    /// transaction efficiency without this crate depending on
    /// `dag-engine`'s config section directly.
    pub dag_gas_limit: u64,
}

impl Default for FinalizerConfig {
    fn default() -> Self {
        Self {
            replay_protection_range: 5,
            pillar_fork_activation_period: None,
            dag_gas_limit: 15_000_000,
        }
    }
}

impl FinalizerConfig {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.replay_protection_range == 0 {
            return Err("final_chain.replay_protection_service.range must be non-zero");
        }
        Ok(())
    }

    pub fn fork_active(&self, period: Period) -> bool {
        self.pillar_fork_activation_period.map(|activation| period >= activation).unwrap_or(false)
    }
}
