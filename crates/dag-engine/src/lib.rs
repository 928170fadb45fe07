//! # dag-engine
//!
//! The DAG block layer: admission (`DagManager::admit`), the non-final
//! working set and level index, ghost-path frontier selection, the
//! level→period mapping, and the VDF/VRF-sortition block proposer.
//!
//! `domain/` holds pure logic with no I/O; `ports/` defines the trait
//! surface `core-node` implements (outbound) and drives (inbound).

pub mod config;
pub mod domain;
pub mod error;
pub mod ports;
pub mod proposer;

pub use config::DagConfig;
pub use domain::{
    sortition_message, vdf_seed, AdmissionOutcome, AdmissionState, DagBlockRecord, DagManager,
    Frontier, NonFinalSet, PeriodContext, ProposalPeriodMap,
};
pub use error::{DagError, DagResult};
pub use ports::{DagInbound, DposGateway, FinalizedDagGateway, MempoolGateway};
pub use proposer::{DagBlockProposer, ProposeOutcome};
