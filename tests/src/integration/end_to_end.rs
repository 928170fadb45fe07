//! One period, start to finish: a DAG block is admitted, this node's
//! lone PBFT vote carries every step straight to `cert` quorum (weight
//! 1 of 1, `2t+1 == 1`), the driver hands the certified anchor to
//! `PeriodFinalizer`, and the committed transaction is readable back out
//! of `ColumnStore` by its finalized location.
//!
//! Hand-composes the domain types directly rather than going through
//! `core_node::Engine::bootstrap` — bootstrap hardcodes
//! `SortitionParams::default()` for the genesis period, which would make
//! the DAG block's admission wait on a real VDF solve most of the time.
//! This wiring mirrors bootstrap's own (one signing identity, re-derived
//! into the handful of owned keypairs each subsystem needs).

use std::sync::Arc;
use std::time::Duration;

use core_bus::EventBus;
use core_crypto::ecdsa::Secp256k1KeyPair;
use core_crypto::vrf::VrfKeyPair;
use core_storage::columns::CF_TRANSACTION_LOCATION;
use core_storage::ColumnStore;
use core_types::dag_block::VdfProof;
use core_types::rlp_util::OptAddress;
use core_types::{Address, DagBlock, Hash, Period, SortitionParams, Transaction, NULL_HASH};
use dag_engine::{AdmissionOutcome, DagManager, PeriodContext};
use parking_lot::Mutex;
use pbft_engine::driver::StepOutcome;
use pbft_engine::{PbftChain, PbftConfig, PbftDriver, PbftManager};
use period_finalizer::{FinalizerConfig, PeriodFinalizer, Supervisor};
use sync_queue::{SortitionController, SortitionControllerConfig};
use vote_manager::{VoteManager, VoteManagerConfig};

use core_node::adapters::{DagCandidateAdapter, InMemoryMempool, NoopStateApi, StorageFinalizedDag};

/// The single validator driving this period, eligible for every step and
/// holding all the weight — `2t+1` of one is one.
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

fn genesis_dag_block(signer: &Secp256k1KeyPair, vrf: &VrfKeyPair, transactions: Vec<Hash>, gas_estimations: Vec<u64>) -> DagBlock {
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

fn sample_transaction(signer: &Secp256k1KeyPair, nonce: u64) -> Transaction {
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
async fn single_validator_certifies_and_finalizes_one_period() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(ColumnStore::open_ephemeral(dir.path()).unwrap());
    let bus = Arc::new(EventBus::new());
    let pbft_chain = Arc::new(PbftChain::genesis());
    let mempool = Arc::new(InMemoryMempool::new(
        store.clone(),
        pbft_chain.clone(),
        FinalizerConfig::default().replay_protection_range,
    ));
    let finalized_dag = Arc::new(StorageFinalizedDag::new(store.clone()));

    // One signing identity, re-derived into the owned instances the DAG
    // layer and the PBFT manager each need of their own.
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

    let tx = sample_transaction(&tx_signer, 0);
    let tx_hash = mempool.insert(tx).unwrap();
    let block = genesis_dag_block(&block_signer, &dag_vrf, vec![tx_hash], vec![21_000]);
    let block_hash = block.hash();
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
        FinalizerConfig::default(),
        finalizer_signer,
    ));

    let driver = Arc::new(PbftDriver::new(
        pbft_manager,
        pbft_chain.clone(),
        votes.clone() as Arc<dyn pbft_engine::VoteQuorumGateway>,
        finalizer.clone() as Arc<dyn pbft_engine::FinalizationGateway>,
        bus.clone(),
    ));

    // propose -> soft -> cert: every step needs this node's own tick to
    // cast its vote, then a full `lambda_ms` to pass before the step
    // advances, since only `cert`'s quorum (checked every tick
    // regardless of local step) and `next`'s quorum short-circuit that
    // wait.
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
    assert_eq!(pbft_chain.head().last_non_null_anchor_hash, block_hash);

    let location = store.get(CF_TRANSACTION_LOCATION, &tx_hash).unwrap();
    assert!(location.is_some(), "finalized transaction must be locatable by hash");
}
