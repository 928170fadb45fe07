use thiserror::Error;

/// Sync-queue failures are all local bookkeeping violations; none of them
/// are terminal for the node the way a consensus disagreement is — a
/// rejected push just means the peer layer should try a different period
/// or node.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SyncQueueError {
    #[error("period {offered} is not the expected next period {expected}")]
    OutOfOrder { offered: u64, expected: u64 },
}

pub type SyncQueueResult<T> = Result<T, SyncQueueError>;
