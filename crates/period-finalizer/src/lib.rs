//! # period-finalizer
//!
//! Sub-DAG collection, transaction ordering, state transition, rewards
//! tally and the atomic multi-column period commit — spec.md §4.4.
//! Implements both `pbft_engine::FinalizationGateway` (the live-consensus
//! path) and this crate's own [`ports::PeriodFinalizerInbound`] (the sync
//! catch-up path).

pub mod config;
pub mod domain;
pub mod error;
pub mod ports;

pub use config::FinalizerConfig;
pub use domain::{
    collect_sub_dag, is_stale_nonce, order_and_dedupe_transactions, order_hash, read_watermark,
    roll_window, sender_period_key, tally_rewards, PeriodFinalizer, ReplayProtectionOp,
    RewardsStats, Supervisor, SupervisorState,
};
pub use error::{FinalizeError, FinalizeResult};
pub use ports::{PeriodFinalizerInbound, PeriodHeader, StateApiGateway, StateTransitionOutcome, TransactionPoolGateway};
