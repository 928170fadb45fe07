//! Per-sender nonce watermark bookkeeping: a nonce at or below a sender's
//! watermark is a replay and must be rejected at insertion (mempool/DAG
//! admission, out of scope here). The finalizer's job is narrower: roll
//! the trailing window forward as periods commit and persist it.

use std::collections::HashMap;

use core_storage::columns::CF_REPLAY_PROTECTION;
use core_storage::ColumnStore;
use core_types::{Address, Period, Transaction};

/// `CF_REPLAY_PROTECTION` key for one `(sender, period)` entry: the sender's
/// 20 address bytes followed by the period's big-endian 8 bytes. Shared by
/// the finalizer's window roll-forward and the mempool's watermark lookup so
/// both sides agree on where a sender's nonce history lives.
pub fn sender_period_key(sender: &Address, period: Period) -> Vec<u8> {
    let mut key = Vec::with_capacity(28);
    key.extend_from_slice(sender);
    key.extend_from_slice(&period.to_be_bytes());
    key
}

/// One column write/delete the caller folds into its atomic period-commit
/// batch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReplayProtectionOp {
    /// `(sender, period) -> max_nonce` for a period newly inside the
    /// window.
    Put { sender: Address, period: Period, max_nonce: u64 },
    /// `(sender, period)` aged out of the trailing `range`.
    Delete { sender: Address, period: Period },
}

/// From a period's ordered transactions, compute this period's per-sender
/// max-nonce entries plus the deletions needed to age `period - range` (and
/// anything `existing_periods` still holds older than that) out of the
/// window.
pub fn roll_window(
    transactions: &[Transaction],
    senders: &[Address],
    period: Period,
    range: u64,
    existing_periods: impl Fn(&Address) -> Vec<Period>,
) -> Vec<ReplayProtectionOp> {
    let mut max_nonce_this_period: HashMap<Address, u64> = HashMap::new();
    for (tx, sender) in transactions.iter().zip(senders.iter()) {
        let entry = max_nonce_this_period.entry(*sender).or_insert(0);
        *entry = (*entry).max(tx.nonce);
    }

    let cutoff = period.saturating_sub(range);
    let mut ops = Vec::new();
    for (sender, max_nonce) in &max_nonce_this_period {
        ops.push(ReplayProtectionOp::Put { sender: *sender, period, max_nonce: *max_nonce });
        for stale_period in existing_periods(sender) {
            if stale_period <= cutoff {
                ops.push(ReplayProtectionOp::Delete { sender: *sender, period: stale_period });
            }
        }
    }
    ops
}

/// A sender's replay-protection watermark as of `current_period`: the
/// highest nonce stored for that sender across the trailing `range` periods,
/// or `None` if the sender has no entry in the window at all. A transaction
/// whose nonce is at or below a `Some` watermark is a replay and must be
/// rejected at admission — `roll_window` only ever extends this watermark
/// forward, so a nonce that has ever cleared a finalized period can never be
/// reused.
pub fn read_watermark(store: &ColumnStore, sender: &Address, current_period: Period, range: u64) -> Option<u64> {
    let earliest = current_period.saturating_sub(range);
    (earliest..=current_period)
        .filter_map(|period| {
            store
                .get(CF_REPLAY_PROTECTION, &sender_period_key(sender, period))
                .ok()
                .flatten()
        })
        .filter_map(|bytes| <[u8; 8]>::try_from(bytes.as_slice()).ok())
        .map(u64::from_be_bytes)
        .max()
}

/// `true` when `nonce` has already been consumed by a finalized transaction
/// from the same sender within the trailing window, i.e. admitting it would
/// be a replay. A sender with no watermark yet has never transacted in the
/// window, so every nonce is fresh.
pub fn is_stale_nonce(nonce: u64, watermark: Option<u64>) -> bool {
    matches!(watermark, Some(max) if nonce <= max)
}
