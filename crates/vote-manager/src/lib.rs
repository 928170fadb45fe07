//! # vote-manager
//!
//! Vote verification (signature + VRF sortition + DPoS weight), `2t+1`
//! quorum aggregation, double-vote detection, and reward-vote bookkeeping
//! — spec.md §4.4. Implements `pbft_engine::VoteQuorumGateway`, the port
//! the PBFT driver calls out through.

pub mod config;
pub mod domain;
pub mod error;
pub mod ports;

pub use config::VoteManagerConfig;
pub use domain::{VerifiedIndex, VoteManager};
pub use error::{VoteError, VoteResult};
pub use ports::{DposGateway, ValidatorKeyGateway, VoteInbound};
