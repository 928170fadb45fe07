//! `PeriodFinalizer`: the single serialized apply path spec.md §4.4
//! describes — sub-DAG collection, transaction ordering, state
//! transition, rewards tally, replay-protection roll-forward, and an
//! atomic multi-column DB commit. Implements both
//! `pbft_engine::FinalizationGateway` (the live-consensus path, driven by
//! the PBFT driver off a `2t+1 cert` quorum) and this crate's own
//! [`crate::ports::inbound::PeriodFinalizerInbound`] (the sync catch-up
//! path, driven off an already-assembled `PeriodData`).
//!
//! Lock order on the shared resources it touches mirrors spec.md §5:
//! chain-head, then verified-votes, then non-final-set. `core-node` wires
//! exactly one `PeriodFinalizer` and never calls it concurrently from two
//! tasks — the "serialized on a single apply path" guarantee lives in that
//! wiring, not in this struct.

use std::sync::Arc;

use alloy_rlp::Encodable;
use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::{error, info, instrument};

use core_bus::{CoreEvent, EventBus};
use core_crypto::ecdsa::{RecoverableSignature, Secp256k1KeyPair};
use core_storage::columns::{
    CF_DAG_BLOCKS, CF_DAG_BLOCKS_BY_PERIOD, CF_PBFT_BLOCKS, CF_PBFT_HEAD, CF_PERIOD_DATA,
    CF_REPLAY_PROTECTION, CF_REWARDS_STATS, CF_REWARD_VOTES, CF_TRANSACTIONS, CF_TRANSACTION_LOCATION,
};
use core_storage::{BatchOp, ColumnStore};
use core_types::rlp_util::OptWeight;
use core_types::{
    Address, ChainHead, DagBlock, Hash, PbftBlock, Period, PeriodData, Transaction, VoteBundle,
    NULL_HASH,
};
use dag_engine::{DagManager, FinalizedDagGateway, PeriodContext as DagPeriodContext};
use pbft_engine::{FinalizationGateway, PbftChain};
use sync_queue::SortitionController;
use vote_manager::VoteManager;

use crate::config::FinalizerConfig;
use crate::domain::replay_protection::{roll_window, sender_period_key, ReplayProtectionOp};
use crate::domain::rewards::{tally_rewards, RewardsStats};
use crate::domain::sub_dag::{collect_sub_dag, order_and_dedupe_transactions, order_hash, SubDagLookup};
use crate::domain::supervisor::Supervisor;
use crate::error::{FinalizeError, FinalizeResult};
use crate::ports::inbound::PeriodFinalizerInbound;
use crate::ports::outbound::{PeriodHeader, StateApiGateway, TransactionPoolGateway};

/// Borrows `DagManager`'s non-final set and a `FinalizedDagGateway` to
/// answer the BFS's two questions without this crate depending on
/// `core-storage`'s finalized-block index directly.
struct DagLookup<'a> {
    dag: &'a DagManager,
    finalized: &'a dyn FinalizedDagGateway,
}

impl<'a> SubDagLookup for DagLookup<'a> {
    fn get(&self, hash: &Hash) -> Option<DagBlock> {
        self.dag.get_block(hash)
    }
    fn is_finalized(&self, hash: &Hash) -> bool {
        self.finalized.is_finalized(hash)
    }
}

fn period_key(period: Period) -> [u8; 8] {
    period.to_be_bytes()
}

pub struct PeriodFinalizer {
    dag: Arc<DagManager>,
    finalized_gateway: Arc<dyn FinalizedDagGateway>,
    chain: Arc<PbftChain>,
    votes: Arc<VoteManager>,
    store: Arc<ColumnStore>,
    state_api: Arc<dyn StateApiGateway>,
    tx_pool: Arc<dyn TransactionPoolGateway>,
    sortition: Arc<Mutex<SortitionController>>,
    supervisor: Arc<Supervisor>,
    bus: Arc<EventBus>,
    config: FinalizerConfig,
    /// This node's PBFT block-signing identity. The anchor is certified
    /// by `2t+1` cert votes regardless of who assembles the `PbftBlock`
    /// record; every honest node independently builds and signs its own
    /// copy, and they are bit-identical but for this signature.
    signer: Secp256k1KeyPair,
}

impl PeriodFinalizer {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        dag: Arc<DagManager>,
        finalized_gateway: Arc<dyn FinalizedDagGateway>,
        chain: Arc<PbftChain>,
        votes: Arc<VoteManager>,
        store: Arc<ColumnStore>,
        state_api: Arc<dyn StateApiGateway>,
        tx_pool: Arc<dyn TransactionPoolGateway>,
        sortition: Arc<Mutex<SortitionController>>,
        supervisor: Arc<Supervisor>,
        bus: Arc<EventBus>,
        config: FinalizerConfig,
        signer: Secp256k1KeyPair,
    ) -> Self {
        Self {
            dag,
            finalized_gateway,
            chain,
            votes,
            store,
            state_api,
            tx_pool,
            sortition,
            supervisor,
            bus,
            config,
            signer,
        }
    }

    /// The deterministic core of §4.4, shared by both the live-consensus
    /// path (an anchor hash plus a `PbftBlock` this node must itself
    /// construct and sign elsewhere) and the sync-catch-up path (a
    /// `PbftBlock` received as-is from a peer). Returns the assembled
    /// `PeriodData` ready for the atomic commit, or a [`FinalizeError`].
    fn assemble(&self, pbft_block: &PbftBlock) -> FinalizeResult<(PeriodData, Vec<Transaction>)> {
        let period = pbft_block.period;
        let anchor = pbft_block.anchor_hash;

        let lookup = DagLookup { dag: self.dag.as_ref(), finalized: self.finalized_gateway.as_ref() };
        let ordered_blocks = if anchor == NULL_HASH {
            Vec::new()
        } else {
            collect_sub_dag(&lookup, anchor)?
        };

        let (ordered_hashes, _contributor_index) = order_and_dedupe_transactions(&ordered_blocks);
        let computed_order_hash = order_hash(&ordered_hashes);
        if computed_order_hash != pbft_block.order_hash {
            return Err(FinalizeError::OrderHashMismatch {
                period,
                expected: pbft_block.order_hash,
                computed: computed_order_hash,
            });
        }

        let mut transactions = Vec::with_capacity(ordered_hashes.len());
        for hash in &ordered_hashes {
            let tx = self.tx_pool.get(hash).ok_or(FinalizeError::MissingTransaction(*hash))?;
            transactions.push(tx);
        }

        let reward_votes = self.votes.reward_votes_for_period(period.saturating_sub(1));
        let period_data = PeriodData {
            pbft_block: pbft_block.clone(),
            dag_blocks: ordered_blocks,
            transactions: transactions.clone(),
            previous_period_cert_votes: reward_votes.map(|b| b.votes).unwrap_or_default(),
            optional_bonus_votes_count: OptWeight(None),
        };
        Ok((period_data, transactions))
    }

    /// Execute, tally rewards, roll the replay-protection window forward,
    /// and commit everything as one atomic batch. `period_data` must
    /// already carry a verified `order_hash`.
    async fn execute_and_commit(&self, period_data: PeriodData) -> FinalizeResult<ChainHead> {
        let period = period_data.period();
        let pbft_block = &period_data.pbft_block;
        let header = PeriodHeader { period, anchor_hash: pbft_block.anchor_hash, timestamp: pbft_block.timestamp };

        let outcome = self
            .state_api
            .transition_state(&header, &period_data.transactions, &period_data.dag_blocks)
            .await
            .map_err(|err| match err {
                FinalizeError::ConsensusError { .. } => err,
                other => FinalizeError::ConsensusError { period, reason: other.to_string() },
            })?;

        let reward_bundle = if period_data.previous_period_cert_votes.is_empty() {
            None
        } else {
            Some(VoteBundle { votes: period_data.previous_period_cert_votes.clone() })
        };
        let rewards = tally_rewards(&period_data.dag_blocks, reward_bundle.as_ref());

        let senders: Vec<Address> = period_data
            .transactions
            .iter()
            .map(|tx| {
                let sig = RecoverableSignature { r: tx.r, s: tx.s, v: tx.v };
                sig.recover_address(&tx.signing_hash(), tx.chain_id()).unwrap_or([0u8; 20])
            })
            .collect();
        let replay_ops = roll_window(
            &period_data.transactions,
            &senders,
            period,
            self.config.replay_protection_range,
            |sender| self.existing_replay_periods(sender, period),
        );

        let fork_active = self.config.fork_active(period);
        let block_hash = pbft_block.hash();
        let mut new_head = self.chain.head();
        new_head.advance(block_hash, pbft_block.anchor_hash, fork_active);

        let block_hashes: Vec<Hash> = period_data.dag_blocks.iter().map(|b| b.hash()).collect();
        self.write_batch(&period_data, &outcome.receipt_hashes, &replay_ops, &block_hashes, &new_head, &rewards)?;

        // The DB batch above is the durable commit; advancing the
        // in-memory `PbftChain` head here keeps it in sync for the
        // driver's next `current_period()`/`last_anchor()` reads. A crash
        // between these two lines is recovered by reloading the persisted
        // head at restart (`core-node`'s wiring), not by this call.
        self.chain.advance(block_hash, pbft_block.anchor_hash, fork_active);

        self.dag.remove_finalized(&block_hashes);
        let observed_gas_limit = self.config.dag_gas_limit.max(1);
        let new_params = {
            let mut controller = self.sortition.lock();
            controller.observe_period(period_data.transactions.len() as u64, observed_gas_limit)
        };
        self.dag.set_period_context(
            period,
            self.dag.max_level(),
            DagPeriodContext { params: new_params, salt: block_hash },
        );
        self.votes.drop_reward_votes_before(period);

        info!(period, anchor = ?pbft_block.anchor_hash, txs = period_data.transactions.len(), "period finalized");
        self.bus.publish(CoreEvent::PeriodFinalized {
            period_data: Box::new(period_data),
            head: new_head,
        });

        Ok(new_head)
    }

    fn existing_replay_periods(&self, sender: &Address, upto_period: Period) -> Vec<Period> {
        let cutoff = upto_period.saturating_sub(self.config.replay_protection_range * 2);
        (cutoff..upto_period)
            .filter(|candidate| {
                self.store.get(CF_REPLAY_PROTECTION, &sender_period_key(sender, *candidate)).ok().flatten().is_some()
            })
            .collect()
    }

    fn write_batch(
        &self,
        period_data: &PeriodData,
        receipt_hashes: &[Hash],
        replay_ops: &[ReplayProtectionOp],
        block_hashes: &[Hash],
        new_head: &ChainHead,
        rewards: &RewardsStats,
    ) -> FinalizeResult<()> {
        let period = period_data.period();
        let key = period_key(period);
        let pbft_hash = period_data.pbft_block.hash();
        let tx_hashes: Vec<Hash> = period_data.transactions.iter().map(|tx| tx.hash()).collect();
        let tx_locations: Vec<[u8; 16]> = (0..period_data.transactions.len())
            .map(|position| {
                let mut location = [0u8; 16];
                location[..8].copy_from_slice(&period.to_be_bytes());
                location[8..].copy_from_slice(&(position as u64).to_be_bytes());
                location
            })
            .collect();
        let mut ops = Vec::new();

        ops.push(BatchOp::Put {
            column: CF_PBFT_BLOCKS,
            key: pbft_hash.as_slice(),
            value: period_data.pbft_block.encode_rlp(),
        });
        ops.push(BatchOp::Put { column: CF_PERIOD_DATA, key: &key, value: period_data.encode_rlp() });
        ops.push(BatchOp::Put {
            column: CF_PBFT_HEAD,
            key: b"0",
            value: serde_json::to_vec(new_head).map_err(|e| {
                FinalizeError::Persistence(core_storage::StorageError::Io(e.to_string()))
            })?,
        });

        let mut by_period = Vec::with_capacity(block_hashes.len() * 32);
        for hash in block_hashes {
            by_period.extend_from_slice(hash);
        }
        for (block, hash) in period_data.dag_blocks.iter().zip(block_hashes.iter()) {
            ops.push(BatchOp::Put { column: CF_DAG_BLOCKS, key: hash.as_slice(), value: block.encode_rlp() });
        }
        ops.push(BatchOp::Put { column: CF_DAG_BLOCKS_BY_PERIOD, key: &key, value: by_period });

        for ((tx, tx_hash), location) in period_data.transactions.iter().zip(tx_hashes.iter()).zip(tx_locations.iter()) {
            ops.push(BatchOp::Put { column: CF_TRANSACTIONS, key: tx_hash.as_slice(), value: tx.encode_rlp() });
            ops.push(BatchOp::Put {
                column: CF_TRANSACTION_LOCATION,
                key: tx_hash.as_slice(),
                value: location.to_vec(),
            });
        }
        // Receipts are owned by the state-transition engine (out of scope);
        // the core only logs their count here, the StateAPI collaborator
        // persists/serves them to receipt-query subscribers.
        tracing::trace!(period, receipts = receipt_hashes.len(), "period receipts computed");

        if !period_data.previous_period_cert_votes.is_empty() {
            let bundle = VoteBundle { votes: period_data.previous_period_cert_votes.clone() };
            let mut buf = Vec::with_capacity(bundle.length());
            bundle.encode(&mut buf);
            ops.push(BatchOp::Put { column: CF_REWARD_VOTES, key: &key, value: buf });
        }

        ops.push(BatchOp::Put {
            column: CF_REWARDS_STATS,
            key: &key,
            value: bincode::serialize(rewards).map_err(core_storage::StorageError::from)?,
        });

        let keys_storage: Vec<Vec<u8>> = replay_ops
            .iter()
            .map(|op| match op {
                ReplayProtectionOp::Put { sender, period, .. } => sender_period_key(sender, *period),
                ReplayProtectionOp::Delete { sender, period } => sender_period_key(sender, *period),
            })
            .collect();
        for (op, key) in replay_ops.iter().zip(keys_storage.iter()) {
            match op {
                ReplayProtectionOp::Put { max_nonce, .. } => {
                    ops.push(BatchOp::Put { column: CF_REPLAY_PROTECTION, key, value: max_nonce.to_be_bytes().to_vec() });
                }
                ReplayProtectionOp::Delete { .. } => {
                    ops.push(BatchOp::Delete { column: CF_REPLAY_PROTECTION, key });
                }
            }
        }

        self.store.write_batch(ops)?;
        Ok(())
    }
}

#[async_trait]
impl FinalizationGateway for PeriodFinalizer {
    #[instrument(skip(self), fields(period, round, anchor = ?anchor_hash))]
    async fn finalize_period(&self, period: Period, round: u64, anchor_hash: Hash) {
        if self.supervisor.is_halted() {
            self.supervisor.suspend_forever().await;
            return;
        }

        let prev_hash = self.chain.head().last_pbft_block_hash;
        let lookup = DagLookup { dag: self.dag.as_ref(), finalized: self.finalized_gateway.as_ref() };
        let ordered_blocks = if anchor_hash == NULL_HASH {
            Ok(Vec::new())
        } else {
            collect_sub_dag(&lookup, anchor_hash)
        };

        let ordered_blocks = match ordered_blocks {
            Ok(blocks) => blocks,
            Err(err) if !err.is_terminal() => {
                error!(period, round, error = %err, "sub-dag collection incomplete, cannot finalize yet");
                return;
            }
            Err(err) => {
                self.supervisor.halt(err.to_string());
                self.supervisor.suspend_forever().await;
                return;
            }
        };

        let (ordered_hashes, _) = order_and_dedupe_transactions(&ordered_blocks);
        let order_hash_value = order_hash(&ordered_hashes);

        // The local `PbftBlock` is a derived record of the locally-run
        // algorithm, not an external input: its own `order_hash` and
        // `timestamp` are produced here rather than supplied by a peer,
        // so it always matches by construction.
        let mut pbft_block = PbftBlock {
            prev_block_hash: prev_hash,
            anchor_hash,
            order_hash: order_hash_value,
            period,
            timestamp: current_timestamp(),
            extra_data: core_types::rlp_util::OptBytes(None),
            v: 0,
            r: [0u8; 32],
            s: [0u8; 32],
        };
        let sig = self.signer.sign_prehash(&pbft_block.signing_hash(), 0);
        pbft_block.v = sig.v;
        pbft_block.r = sig.r;
        pbft_block.s = sig.s;

        match self.assemble(&pbft_block) {
            Ok((period_data, _)) => {
                if let Err(err) = self.execute_and_commit(period_data).await {
                    if err.is_terminal() {
                        error!(period, round, error = %err, "fatal finalization error, halting");
                        self.supervisor.halt(err.to_string());
                        self.supervisor.suspend_forever().await;
                    } else {
                        error!(period, round, error = %err, "transient finalization error, will retry");
                    }
                }
            }
            Err(err) if !err.is_terminal() => {
                error!(period, round, error = %err, "cannot assemble period yet");
            }
            Err(err) => {
                error!(period, round, error = %err, "fatal finalization error, halting");
                self.supervisor.halt(err.to_string());
                self.supervisor.suspend_forever().await;
            }
        }
    }
}

#[async_trait]
impl PeriodFinalizerInbound for PeriodFinalizer {
    /// Sync catch-up: `order_hash` is still recomputed and checked
    /// against the received `PbftBlock` even though the ordering itself
    /// is taken from the peer's `PeriodData` rather than re-derived from
    /// a local sub-DAG BFS.
    async fn finalize_period_data(&self, period_data: PeriodData) -> FinalizeResult<()> {
        let (ordered_hashes, _) = order_and_dedupe_transactions(&period_data.dag_blocks);
        let computed = order_hash(&ordered_hashes);
        if computed != period_data.pbft_block.order_hash {
            return Err(FinalizeError::OrderHashMismatch {
                period: period_data.period(),
                expected: period_data.pbft_block.order_hash,
                computed,
            });
        }
        self.execute_and_commit(period_data).await?;
        Ok(())
    }
}

fn current_timestamp() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
