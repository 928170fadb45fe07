//! # sync-queue
//!
//! Period-ordered sync catch-up queue plus the sortition-parameter
//! controller that retargets `vrf_threshold_upper` against observed DAG
//! throughput — spec.md §4.5.

pub mod config;
pub mod domain;
pub mod error;
pub mod ports;

pub use config::SortitionControllerConfig;
pub use domain::{QueueEntry, SortitionController, SyncQueue};
pub use error::{SyncQueueError, SyncQueueResult};
pub use ports::SyncQueueInbound;
