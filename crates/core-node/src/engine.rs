//! `Engine`: the composition root spec.md §9 mandates in place of a
//! cyclic smart-pointer object graph — one struct owning every subsystem
//! directly, built once at bootstrap and driven by a handful of
//! long-running tasks for the lifetime of the node.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinSet;
use tracing::{info, warn};

use core_bus::{CoreEvent, EventBus, EventFilter};
use core_storage::ColumnStore;
use core_types::{ChainHead, SortitionParams, NULL_HASH};
use dag_engine::{DagBlockProposer, DagManager, PeriodContext, ProposeOutcome};
use pbft_engine::{PbftChain, PbftDriver, PbftManager};
use period_finalizer::{PeriodFinalizer, PeriodFinalizerInbound, Supervisor};
use sync_queue::{SortitionController, SyncQueue};
use vote_manager::VoteManager;

use crate::adapters::{DagCandidateAdapter, GenesisDpos, InMemoryMempool, NoopStateApi, StorageFinalizedDag};
use crate::config::EngineConfig;

/// Every subsystem the node owns, plus the shared collaborators wired
/// between them. Cloning an `Arc<Engine>` into each driving task is the
/// entire "how do components talk to each other" story outside of the
/// event bus.
pub struct Engine {
    pub config: EngineConfig,
    pub store: Arc<ColumnStore>,
    pub bus: Arc<EventBus>,
    pub dag: Arc<DagManager>,
    pub proposer: Arc<DagBlockProposer>,
    pub pbft_chain: Arc<PbftChain>,
    pub pbft_driver: Arc<PbftDriver>,
    pub votes: Arc<VoteManager>,
    pub finalizer: Arc<PeriodFinalizer>,
    pub supervisor: Arc<Supervisor>,
    pub mempool: Arc<InMemoryMempool>,
    pub sync_queue: Arc<SyncQueue>,
}

impl Engine {
    /// Wire every subsystem in dependency order: storage, the shared
    /// node identity, the out-of-scope-collaborator adapters, then the
    /// five engine crates, each handed exactly the `Arc<dyn Trait>`
    /// handles its ports declare.
    pub fn bootstrap(config: EngineConfig) -> anyhow::Result<Arc<Self>> {
        let store = Arc::new(ColumnStore::open(config.storage.clone())?);
        let bus = Arc::new(EventBus::new());

        // `Secp256k1KeyPair`/`VrfKeyPair` are not `Clone` — the PBFT
        // manager, the DAG proposer and the finalizer each need their own
        // owned instance of this node's signing/VRF identity, so every
        // one is re-derived from the same underlying bytes rather than
        // shared behind an `Arc` (which none of their constructors take).
        let signing_bytes = config.keystore.load_or_generate_secp256k1()?.to_bytes();
        let vrf_seed = config.keystore.vrf_seed_bytes()?;
        let pbft_vrf = core_crypto::vrf::VrfKeyPair::from_bytes(&vrf_seed)
            .map_err(|err| anyhow::anyhow!("deriving pbft vrf identity: {err}"))?;
        let proposer_vrf = core_crypto::vrf::VrfKeyPair::from_bytes(&vrf_seed)
            .map_err(|err| anyhow::anyhow!("deriving proposer vrf identity: {err}"))?;
        let proposer_signer = core_crypto::ecdsa::Secp256k1KeyPair::from_bytes(signing_bytes)
            .map_err(|err| anyhow::anyhow!("deriving proposer signing identity: {err}"))?;
        let pbft_signer = core_crypto::ecdsa::Secp256k1KeyPair::from_bytes(signing_bytes)
            .map_err(|err| anyhow::anyhow!("deriving pbft signing identity: {err}"))?;
        let finalizer_signer = core_crypto::ecdsa::Secp256k1KeyPair::from_bytes(signing_bytes)
            .map_err(|err| anyhow::anyhow!("deriving finalizer signing identity: {err}"))?;

        let dpos = Arc::new(GenesisDpos::from_config(&config.dpos)?);
        let finalized_dag = Arc::new(StorageFinalizedDag::new(store.clone()));

        let head = Self::load_chain_head(&store)?;
        let pbft_chain = Arc::new(PbftChain::from_head(head));

        let mempool = Arc::new(InMemoryMempool::new(
            store.clone(),
            pbft_chain.clone(),
            config.finalizer.replay_protection_range,
        ));

        let genesis_context = PeriodContext { params: SortitionParams::default(), salt: NULL_HASH };
        let dag = Arc::new(DagManager::new(
            config.dag.max_levels_per_period,
            config.dag.gas_limit,
            config.dag.ghost_path_move_back,
            genesis_context,
            dpos.clone() as Arc<dyn dag_engine::DposGateway>,
            mempool.clone() as Arc<dyn dag_engine::MempoolGateway>,
            finalized_dag.clone() as Arc<dyn dag_engine::FinalizedDagGateway>,
        ));

        let proposer = Arc::new(DagBlockProposer::new(
            dag.clone(),
            mempool.clone() as Arc<dyn dag_engine::MempoolGateway>,
            dpos.clone() as Arc<dyn dag_engine::DposGateway>,
            bus.clone(),
            proposer_signer,
            proposer_vrf,
            config.dag,
        ));

        let votes = Arc::new(VoteManager::new(
            dpos.clone() as Arc<dyn vote_manager::DposGateway>,
            dpos.clone() as Arc<dyn vote_manager::ValidatorKeyGateway>,
            bus.clone(),
            config.vote_manager.clone(),
        ));

        let dag_candidate = Arc::new(DagCandidateAdapter::new(dag.clone()));
        let pbft_manager = Arc::new(PbftManager::new(
            pbft_chain.current_period(),
            dpos.clone() as Arc<dyn pbft_engine::DposGateway>,
            dag_candidate as Arc<dyn pbft_engine::DagCandidateGateway>,
            pbft_signer,
            pbft_vrf,
            config.pbft,
        ));

        let sortition = Arc::new(Mutex::new(SortitionController::new(
            config.sortition.clone(),
            SortitionParams::default(),
        )));
        let supervisor = Arc::new(Supervisor::new());
        let finalizer = Arc::new(PeriodFinalizer::new(
            dag.clone(),
            finalized_dag as Arc<dyn dag_engine::FinalizedDagGateway>,
            pbft_chain.clone(),
            votes.clone(),
            store.clone(),
            Arc::new(NoopStateApi) as Arc<dyn period_finalizer::StateApiGateway>,
            mempool.clone() as Arc<dyn period_finalizer::TransactionPoolGateway>,
            sortition,
            supervisor.clone(),
            bus.clone(),
            config.finalizer.clone(),
            finalizer_signer,
        ));

        let pbft_driver = Arc::new(PbftDriver::new(
            pbft_manager,
            pbft_chain.clone(),
            votes.clone() as Arc<dyn pbft_engine::VoteQuorumGateway>,
            finalizer.clone() as Arc<dyn pbft_engine::FinalizationGateway>,
            bus.clone(),
        ));

        let sync_queue = Arc::new(SyncQueue::new(pbft_chain.current_period()));

        Ok(Arc::new(Self {
            config,
            store,
            bus,
            dag,
            proposer,
            pbft_chain,
            pbft_driver,
            votes,
            finalizer,
            supervisor,
            mempool,
            sync_queue,
        }))
    }

    fn load_chain_head(store: &ColumnStore) -> anyhow::Result<ChainHead> {
        match store.get(core_storage::columns::CF_PBFT_HEAD, b"0")? {
            Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
            None => Ok(ChainHead::genesis()),
        }
    }

    /// Spawn the node's long-running tasks into `set`: the PBFT
    /// round/step driver, the DAG proposal retry loop, the sync-queue
    /// drain loop, and an event-bus logger standing in for the
    /// out-of-scope peer layer. None of these are expected to return;
    /// the caller treats any completion as abnormal.
    pub fn spawn(self: &Arc<Self>, set: &mut JoinSet<()>) {
        self.spawn_pbft_driver(set);
        self.spawn_dag_proposer(set);
        self.spawn_sync_drain(set);
        self.spawn_event_logger(set);
    }

    fn spawn_pbft_driver(self: &Arc<Self>, set: &mut JoinSet<()>) {
        let driver = self.pbft_driver.clone();
        set.spawn(async move {
            driver.run().await;
        });
    }

    /// Drives the proposer's retry loop per spec.md §4.2: sleep
    /// `min_proposal_delay_ms` after a non-`Proposed` outcome, retry
    /// immediately after a success.
    fn spawn_dag_proposer(self: &Arc<Self>, set: &mut JoinSet<()>) {
        let engine = self.clone();
        set.spawn(async move {
            loop {
                let anchor = engine.pbft_chain.last_anchor();
                match engine.proposer.try_propose(anchor).await {
                    ProposeOutcome::Proposed(block) => {
                        info!(hash = ?block.hash(), level = block.level, "dag block proposed");
                        continue;
                    }
                    ProposeOutcome::Rejected(outcome) => {
                        warn!(?outcome, "locally proposed dag block was rejected on admission");
                    }
                    _ => {}
                }
                tokio::time::sleep(Duration::from_millis(engine.config.dag.min_proposal_delay_ms)).await;
            }
        });
    }

    fn spawn_sync_drain(self: &Arc<Self>, set: &mut JoinSet<()>) {
        let engine = self.clone();
        set.spawn(async move {
            loop {
                match engine.sync_queue.pop() {
                    Some(entry) => {
                        if let Err(err) = engine.finalizer.finalize_period_data(entry.data).await {
                            warn!(period = entry.period, error = %err, "sync catch-up finalization failed");
                        }
                    }
                    None => tokio::time::sleep(Duration::from_millis(200)).await,
                }
            }
        });
    }

    /// The peer layer is out of scope; this task only logs outbound
    /// events so the node is observable without one wired in.
    fn spawn_event_logger(self: &Arc<Self>, set: &mut JoinSet<()>) {
        let bus = self.bus.clone();
        set.spawn(async move {
            let mut subscription = bus.subscribe(EventFilter::all());
            while let Some(event) = subscription.recv().await {
                match event {
                    CoreEvent::PeriodFinalized { head, .. } => {
                        info!(period = head.size, "period finalized");
                    }
                    CoreEvent::Equivocation { period, round, step } => {
                        warn!(period, round, step, "equivocation detected");
                    }
                    other => {
                        tracing::trace!(?other, "event");
                    }
                }
            }
        });
    }
}

