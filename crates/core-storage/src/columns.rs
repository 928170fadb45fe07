//! Logical persistence columns, one RocksDB column family each, per
//! the persistence layer.

/// `hash -> DagBlock RLP`
pub const CF_DAG_BLOCKS: &str = "dag_blocks";
/// `period -> ordered list of hashes`
pub const CF_DAG_BLOCKS_BY_PERIOD: &str = "dag_blocks_by_period";
/// `hash -> tx RLP`
pub const CF_TRANSACTIONS: &str = "transactions";
/// `hash -> (period, position)`
pub const CF_TRANSACTION_LOCATION: &str = "transaction_location";
/// `hash -> PbftBlock RLP`
pub const CF_PBFT_BLOCKS: &str = "pbft_blocks";
/// `period -> PeriodData RLP`
pub const CF_PERIOD_DATA: &str = "period_data";
/// `0 -> head JSON/RLP`
pub const CF_PBFT_HEAD: &str = "pbft_head";
/// `(period, round, step, block_hash) -> vote bundle`
pub const CF_VOTES_NEXT_PREVIOUS_ROUND: &str = "votes_next_previous_round";
/// `period -> vote bundle`
pub const CF_REWARD_VOTES: &str = "reward_votes";
/// `level -> period`
pub const CF_PROPOSAL_PERIOD_DAG_LEVELS: &str = "proposal_period_dag_levels";
/// `period -> SortitionParams`
pub const CF_SORTITION_PARAMS: &str = "sortition_params";
/// per-sender nonce watermarks, scoped to the replay-protection sliding
/// window.
pub const CF_REPLAY_PROTECTION: &str = "final_chain_replay_protection";
/// `period -> bincode(RewardsStats)`: local bookkeeping sidecar, not part
/// of `PeriodData`'s RLP (spec.md doesn't specify a rewards-stats wire
/// encoding).
pub const CF_REWARDS_STATS: &str = "rewards_stats";

pub const ALL_COLUMN_FAMILIES: &[&str] = &[
    CF_DAG_BLOCKS,
    CF_DAG_BLOCKS_BY_PERIOD,
    CF_TRANSACTIONS,
    CF_TRANSACTION_LOCATION,
    CF_PBFT_BLOCKS,
    CF_PERIOD_DATA,
    CF_PBFT_HEAD,
    CF_VOTES_NEXT_PREVIOUS_ROUND,
    CF_REWARD_VOTES,
    CF_PROPOSAL_PERIOD_DAG_LEVELS,
    CF_SORTITION_PARAMS,
    CF_REPLAY_PROTECTION,
    CF_REWARDS_STATS,
];
