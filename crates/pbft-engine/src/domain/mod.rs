//! Pure FSM logic: no I/O, no async, no storage handles. `manager.rs`
//! composes these into the stateful `PbftManager` the driver loop drives.

pub mod chain;
pub mod manager;
pub mod quorum;
pub mod round_clock;
pub mod state;

pub use chain::PbftChain;
pub use manager::{
    decode_vrf_proof, encode_vrf_proof, is_sortition_eligible, step_sortition_message, PbftManager,
};
pub use quorum::{quorum_reached, two_t_plus_one};
pub use round_clock::RoundClock;
pub use state::{PbftStep, RoundState};
