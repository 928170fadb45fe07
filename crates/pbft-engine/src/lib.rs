//! # pbft-engine
//!
//! The periodic PBFT total-ordering layer: round/step state machine,
//! quorum detection, and the async driver loop that turns `PbftManager`'s
//! pure decisions into cast votes and, on certification, a finalized
//! anchor — spec.md §4.3.

pub mod config;
pub mod domain;
pub mod driver;
pub mod error;
pub mod ports;

pub use config::PbftConfig;
pub use domain::{
    decode_vrf_proof, encode_vrf_proof, is_sortition_eligible, quorum_reached, step_sortition_message,
    two_t_plus_one, PbftChain, PbftManager, PbftStep, RoundClock, RoundState,
};
pub use driver::PbftDriver;
pub use error::{PbftError, PbftResult};
pub use ports::{ChainGateway, DagCandidateGateway, DposGateway, FinalizationGateway, PbftInbound, VoteQuorumGateway};
