//! `NoopStateApi`: a placeholder for the out-of-scope state-transition
//! engine. Deterministic given a period's header and ordered
//! transactions, so every honest node computes the same `state_root`
//! despite not actually executing anything — enough to exercise the
//! finalizer's commit path without a real ledger.

use async_trait::async_trait;

use core_crypto::hashing::keccak256_concat;
use core_types::{DagBlock, Transaction};

use period_finalizer::{FinalizeResult, PeriodHeader, StateApiGateway, StateTransitionOutcome};

pub struct NoopStateApi;

#[async_trait]
impl StateApiGateway for NoopStateApi {
    async fn transition_state(
        &self,
        header: &PeriodHeader,
        transactions: &[Transaction],
        _dag_blocks: &[DagBlock],
    ) -> FinalizeResult<StateTransitionOutcome> {
        let period_bytes = header.period.to_be_bytes();
        let timestamp_bytes = header.timestamp.to_be_bytes();
        let receipt_hashes: Vec<_> = transactions.iter().map(|tx| tx.hash()).collect();
        let mut parts: Vec<&[u8]> = vec![&period_bytes, &header.anchor_hash, &timestamp_bytes];
        for hash in &receipt_hashes {
            parts.push(hash);
        }
        let state_root = keccak256_concat(&parts);
        Ok(StateTransitionOutcome { state_root, receipt_hashes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::NULL_HASH;

    #[tokio::test]
    async fn empty_period_is_deterministic() {
        let header = PeriodHeader { period: 1, anchor_hash: NULL_HASH, timestamp: 0 };
        let a = NoopStateApi.transition_state(&header, &[], &[]).await.unwrap();
        let b = NoopStateApi.transition_state(&header, &[], &[]).await.unwrap();
        assert_eq!(a.state_root, b.state_root);
        assert!(a.receipt_hashes.is_empty());
    }
}
