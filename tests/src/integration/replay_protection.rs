//! A sender's transaction nonce becomes unusable once a period that
//! included it finalizes: the finalizer rolls the trailing window forward
//! and persists `(sender, period) -> max_nonce`, and the mempool must
//! reject anything at or below that watermark before it ever reaches DAG
//! admission.
//!
//! Drives the same single-validator wiring as `end_to_end`, but only far
//! enough to get one period finalized, then exercises `InMemoryMempool`
//! against the resulting `CF_REPLAY_PROTECTION` state directly.

use std::sync::Arc;
use std::time::Duration;

use core_bus::EventBus;
use core_crypto::ecdsa::Secp256k1KeyPair;
use core_crypto::vrf::VrfKeyPair;
use core_storage::ColumnStore;
use core_types::dag_block::VdfProof;
use core_types::rlp_util::OptAddress;
use core_types::{Address, DagBlock, Period, SortitionParams, Transaction, NULL_HASH};
use dag_engine::{AdmissionOutcome, DagManager, PeriodContext};
use parking_lot::Mutex;
use pbft_engine::driver::StepOutcome;
use pbft_engine::{PbftChain, PbftConfig, PbftDriver, PbftManager};
use period_finalizer::{FinalizerConfig, PeriodFinalizer, Supervisor};
use sync_queue::{SortitionController, SortitionControllerConfig};
use vote_manager::{VoteManager, VoteManagerConfig};

use core_node::adapters::{DagCandidateAdapter, InMemoryMempool, NoopStateApi, StorageFinalizedDag};

struct SoleValidator {
    address: Address,
    pbft_vrf_public: core_crypto::vrf::VrfPublicKey,
}

impl dag_engine::DposGateway for SoleValidator {
    fn dpos_is_eligible(&self, _address: &Address, _period: Period) -> bool {
        true
    }
}

impl pbft_engine::DposGateway for SoleValidator {
    fn vote_weight(&self, voter: &Address, _period: Period) -> u64 {
        if *voter == self.address {
            1
        } else {
            0
        }
    }
    fn total_eligible_votes(&self, _period: Period) -> u64 {
        1
    }
}

impl vote_manager::DposGateway for SoleValidator {
    fn vote_weight(&self, voter: &Address, _period: Period) -> u64 {
        if *voter == self.address {
            1
        } else {
            0
        }
    }
    fn total_eligible_votes(&self, _period: Period) -> u64 {
        1
    }
}

impl vote_manager::ValidatorKeyGateway for SoleValidator {
    fn vrf_public_key(&self, voter: &Address, _period: Period) -> Option<core_crypto::vrf::VrfPublicKey> {
        if *voter == self.address {
            Some(self.pbft_vrf_public)
        } else {
            None
        }
    }
}

fn omit_params() -> SortitionParams {
    let mut params = SortitionParams::default();
    params.vrf_threshold_upper = u32::MAX;
    params.vrf_threshold_range = u32::MAX;
    params
}

fn genesis_dag_block(signer: &Secp256k1KeyPair, vrf: &VrfKeyPair, transactions: Vec<core_types::Hash>, gas_estimations: Vec<u64>) -> DagBlock {
    let mut message = Vec::with_capacity(8 + 32);
    message.extend_from_slice(&1u64.to_be_bytes());
    message.extend_from_slice(&NULL_HASH);
    let proof = vrf.prove(&message);
    let vdf_bytes = VdfProof {
        vrf_public_key: vrf.public().to_bytes(),
        vrf_proof: VdfProof::from_vrf_parts(proof.output, proof.proof),
        difficulty: 0,
        y: vec![],
        pi: vec![],
    }
    .to_bytes();

    let mut block = DagBlock {
        pivot: NULL_HASH,
        level: 1,
        timestamp: 1,
        vdf_bytes,
        tips: vec![],
        transactions,
        gas_estimations,
        v: 0,
        r: [0u8; 32],
        s: [0u8; 32],
    };
    let sig = signer.sign_prehash(&block.signing_hash(), 0);
    block.v = sig.v;
    block.r = sig.r;
    block.s = sig.s;
    block
}

fn signed_transaction(signer: &Secp256k1KeyPair, nonce: u64) -> Transaction {
    let mut tx = Transaction {
        nonce,
        gas_price: 1,
        gas_limit: 21_000,
        receiver: OptAddress(Some([0x42; 20])),
        value: 0,
        data: vec![],
        v: 0,
        r: [0u8; 32],
        s: [0u8; 32],
    };
    let sig = signer.sign_prehash(&tx.signing_hash(), 0);
    tx.v = sig.v;
    tx.r = sig.r;
    tx.s = sig.s;
    tx
}

#[tokio::test(start_paused = true)]
async fn a_finalized_nonce_is_rejected_as_a_replay() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(ColumnStore::open_ephemeral(dir.path()).unwrap());
    let bus = Arc::new(EventBus::new());
    let pbft_chain = Arc::new(PbftChain::genesis());
    let config = FinalizerConfig::default();
    let mempool = Arc::new(InMemoryMempool::new(store.clone(), pbft_chain.clone(), config.replay_protection_range));
    let finalized_dag = Arc::new(StorageFinalizedDag::new(store.clone()));

    let identity_bytes = Secp256k1KeyPair::generate().to_bytes();
    let block_signer = Secp256k1KeyPair::from_bytes(identity_bytes).unwrap();
    let pbft_signer = Secp256k1KeyPair::from_bytes(identity_bytes).unwrap();
    let finalizer_signer = Secp256k1KeyPair::from_bytes(identity_bytes).unwrap();
    let address = block_signer.address();
    let tx_signer = Secp256k1KeyPair::generate();

    let dag_vrf = VrfKeyPair::generate();
    let pbft_vrf = VrfKeyPair::generate();
    let validator = Arc::new(SoleValidator { address, pbft_vrf_public: pbft_vrf.public() });

    let genesis_context = PeriodContext { params: omit_params(), salt: NULL_HASH };
    let dag = Arc::new(DagManager::new(
        10_000,
        15_000_000,
        1,
        genesis_context,
        validator.clone() as Arc<dyn dag_engine::DposGateway>,
        mempool.clone() as Arc<dyn dag_engine::MempoolGateway>,
        finalized_dag.clone() as Arc<dyn dag_engine::FinalizedDagGateway>,
    ));

    // Sender's first transaction, nonce 0 — admitted, finalized.
    let tx = signed_transaction(&tx_signer, 0);
    let tx_hash = mempool.insert(tx).unwrap();
    let block = genesis_dag_block(&block_signer, &dag_vrf, vec![tx_hash], vec![21_000]);
    assert_eq!(dag.admit(block), AdmissionOutcome::Inserted);

    let dag_candidate = Arc::new(DagCandidateAdapter::new(dag.clone()));
    let pbft_manager = Arc::new(PbftManager::new(
        pbft_chain.current_period(),
        validator.clone() as Arc<dyn pbft_engine::DposGateway>,
        dag_candidate as Arc<dyn pbft_engine::DagCandidateGateway>,
        pbft_signer,
        pbft_vrf,
        PbftConfig::default(),
    ));

    let votes = Arc::new(VoteManager::new(
        validator.clone() as Arc<dyn vote_manager::DposGateway>,
        validator.clone() as Arc<dyn vote_manager::ValidatorKeyGateway>,
        bus.clone(),
        VoteManagerConfig::default(),
    ));

    let sortition = Arc::new(Mutex::new(SortitionController::new(
        SortitionControllerConfig::default(),
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
        config,
        finalizer_signer,
    ));

    let driver = Arc::new(PbftDriver::new(
        pbft_manager,
        pbft_chain.clone(),
        votes.clone() as Arc<dyn pbft_engine::VoteQuorumGateway>,
        finalizer.clone() as Arc<dyn pbft_engine::FinalizationGateway>,
        bus.clone(),
    ));

    let mut finalized = false;
    for _ in 0..6 {
        let outcome = driver.step_once().await;
        if outcome == StepOutcome::PeriodFinalized {
            finalized = true;
            break;
        }
        tokio::time::advance(Duration::from_secs(120)).await;
    }
    assert!(finalized, "period never certified within the step budget");

    // Re-submitting the same nonce, or anything below it, is now a replay.
    let replay = signed_transaction(&tx_signer, 0);
    let err = mempool.insert(replay).unwrap_err();
    assert!(matches!(err, core_node::adapters::mempool::MempoolError::StaleNonce(_, 0, 0)));

    // A fresh nonce from the same sender is still admissible.
    let fresh = signed_transaction(&tx_signer, 1);
    assert!(mempool.insert(fresh).is_ok());
}
