//! # core-types
//!
//! Wire and domain types shared by every engine crate: `DagBlock`,
//! `Transaction`, `Vote`, `PbftBlock`, `PeriodData`, `SortitionParams`, and
//! the `PbftChain` head tuple, plus the RLP codec helpers the derive macro
//! does not cover.

pub mod chain_head;
pub mod dag_block;
pub mod error;
pub mod period_data;
pub mod pbft_block;
pub mod primitives;
pub mod rlp_util;
pub mod sortition_params;
pub mod transaction;
pub mod vote;

pub use chain_head::ChainHead;
pub use dag_block::{DagBlock, VdfProof};
pub use error::{TypesError, TypesResult};
pub use pbft_block::{PbftBlock, PbftExtraData};
pub use period_data::PeriodData;
pub use primitives::{Address, Hash, Level, Period, NULL_HASH};
pub use sortition_params::{SortitionParams, VdfClass};
pub use transaction::Transaction;
pub use vote::{classify_step, vrf_sortition_step, DoubleVoteKey, Vote, VoteBundle, VoteType};
