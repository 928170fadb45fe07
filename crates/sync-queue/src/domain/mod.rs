pub mod queue;
pub mod sortition_controller;

pub use queue::{QueueEntry, SyncQueue};
pub use sortition_controller::SortitionController;
