//! Adapters wiring the out-of-scope collaborators (DPoS accounting,
//! mempool internals, the state-transition engine, the already-finalized
//! DAG index, PBFT's view of the DAG layer) to the ports each engine
//! crate declares. None of these model real subsystems — they are the
//! minimum needed to drive the consensus core end to end, documented as
//! placeholders in `DESIGN.md`.

pub mod dag_candidate;
pub mod finalized_dag;
pub mod genesis_dpos;
pub mod mempool;
pub mod state_api;

pub use dag_candidate::DagCandidateAdapter;
pub use finalized_dag::StorageFinalizedDag;
pub use genesis_dpos::GenesisDpos;
pub use mempool::InMemoryMempool;
pub use state_api::NoopStateApi;
