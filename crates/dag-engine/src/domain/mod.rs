//! Pure domain logic: no I/O, no async, no storage handles. `manager.rs`
//! composes these into the stateful `DagManager` the rest of the crate
//! drives.

pub mod admission;
pub mod frontier;
pub mod level_index;
pub mod manager;
pub mod proposal_period;

pub use admission::{AdmissionState, DagBlockRecord};
pub use frontier::{select_frontier, Frontier};
pub use level_index::NonFinalSet;
pub use manager::{sortition_message, vdf_seed, AdmissionOutcome, DagManager, PeriodContext};
pub use proposal_period::ProposalPeriodMap;
