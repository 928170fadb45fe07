//! `InMemoryMempool`: the admission-only transaction pool stand-in.
//! Transaction-pool internals (fee markets, eviction, replacement) are
//! out of scope for this core — this adapter only tracks "known,
//! admitted, available for packing" and hands bodies back by hash, after
//! rejecting transactions that replay a nonce the finalizer has already
//! rolled into the replay-protection window (spec.md §4.4).

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use parking_lot::RwLock;
use thiserror::Error;

use core_crypto::ecdsa::RecoverableSignature;
use core_storage::ColumnStore;
use core_types::{Address, Hash, Transaction};
use pbft_engine::PbftChain;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MempoolError {
    #[error("transaction {0:?} signature does not recover to a sender")]
    InvalidSignature(Hash),
    #[error("transaction {0:?} nonce {nonce} is at or below sender's replay-protection watermark {watermark}", nonce = .1, watermark = .2)]
    StaleNonce(Hash, u64, u64),
}

pub struct InMemoryMempool {
    transactions: RwLock<HashMap<Hash, Transaction>>,
    order: RwLock<VecDeque<Hash>>,
    store: Arc<ColumnStore>,
    chain: Arc<PbftChain>,
    replay_protection_range: u64,
}

impl InMemoryMempool {
    pub fn new(store: Arc<ColumnStore>, chain: Arc<PbftChain>, replay_protection_range: u64) -> Self {
        Self {
            transactions: RwLock::new(HashMap::new()),
            order: RwLock::new(VecDeque::new()),
            store,
            chain,
            replay_protection_range,
        }
    }

    /// Admit a transaction so the DAG layer and finalizer can resolve its
    /// hash to a body. Re-admitting an already-known hash is a no-op.
    /// Rejects a transaction whose nonce has already cleared a finalized
    /// period within the trailing replay-protection window.
    pub fn insert(&self, tx: Transaction) -> Result<Hash, MempoolError> {
        let hash = tx.hash();
        {
            let transactions = self.transactions.read();
            if transactions.contains_key(&hash) {
                return Ok(hash);
            }
        }

        let sig = RecoverableSignature { r: tx.r, s: tx.s, v: tx.v };
        let sender: Address = sig
            .recover_address(&tx.signing_hash(), tx.chain_id())
            .map_err(|_| MempoolError::InvalidSignature(hash))?;

        let watermark = period_finalizer::read_watermark(
            &self.store,
            &sender,
            self.chain.current_period(),
            self.replay_protection_range,
        );
        if period_finalizer::is_stale_nonce(tx.nonce, watermark) {
            return Err(MempoolError::StaleNonce(hash, tx.nonce, watermark.unwrap_or(0)));
        }

        let mut transactions = self.transactions.write();
        if transactions.contains_key(&hash) {
            return Ok(hash);
        }
        transactions.insert(hash, tx);
        self.order.write().push_back(hash);
        Ok(hash)
    }

    pub fn len(&self) -> usize {
        self.transactions.read().len()
    }
}

impl dag_engine::MempoolGateway for InMemoryMempool {
    fn is_known(&self, hash: &Hash) -> bool {
        self.transactions.read().contains_key(hash)
    }

    fn get(&self, hash: &Hash) -> Option<Transaction> {
        self.transactions.read().get(hash).cloned()
    }

    fn pack(&self, max_candidates: usize) -> Vec<(Hash, Transaction, u64)> {
        let transactions = self.transactions.read();
        self.order
            .read()
            .iter()
            .filter_map(|hash| transactions.get(hash).map(|tx| (*hash, tx.clone(), tx.gas_limit)))
            .take(max_candidates)
            .collect()
    }

    fn is_empty(&self) -> bool {
        self.transactions.read().is_empty()
    }
}

impl period_finalizer::TransactionPoolGateway for InMemoryMempool {
    fn get(&self, hash: &Hash) -> Option<Transaction> {
        self.transactions.read().get(hash).cloned()
    }
}
