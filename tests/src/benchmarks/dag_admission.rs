//! Benchmarks `DagManager::admit` across a chain of single-parent blocks,
//! all classified `Omit` (sortition threshold wide open) so the benchmark
//! measures admission bookkeeping rather than VDF solving.

use std::sync::Arc;

use core_crypto::ecdsa::Secp256k1KeyPair;
use core_crypto::vrf::VrfKeyPair;
use core_types::dag_block::VdfProof;
use core_types::{Address, DagBlock, Hash, Period, SortitionParams, Transaction, NULL_HASH};
use criterion::{black_box, BenchmarkId, Criterion};
use dag_engine::{DagManager, DposGateway, MempoolGateway, PeriodContext};

struct AllowAllDpos;
impl DposGateway for AllowAllDpos {
    fn dpos_is_eligible(&self, _address: &Address, _period: Period) -> bool {
        true
    }
}

struct EmptyMempool;
impl MempoolGateway for EmptyMempool {
    fn is_known(&self, _hash: &Hash) -> bool {
        true
    }
    fn get(&self, _hash: &Hash) -> Option<Transaction> {
        None
    }
    fn pack(&self, _max_candidates: usize) -> Vec<(Hash, Transaction, u64)> {
        vec![]
    }
    fn is_empty(&self) -> bool {
        true
    }
}

struct EmptyFinalized;
impl dag_engine::FinalizedDagGateway for EmptyFinalized {
    fn level_of(&self, _hash: &Hash) -> Option<u64> {
        None
    }
    fn is_finalized(&self, _hash: &Hash) -> bool {
        false
    }
}

fn omit_params() -> SortitionParams {
    let mut params = SortitionParams::default();
    params.vrf_threshold_upper = u32::MAX;
    params.vrf_threshold_range = u32::MAX;
    params
}

fn manager() -> DagManager {
    DagManager::new(
        10_000,
        15_000_000,
        1,
        PeriodContext { params: omit_params(), salt: NULL_HASH },
        Arc::new(AllowAllDpos),
        Arc::new(EmptyMempool),
        Arc::new(EmptyFinalized),
    )
}

/// Mirrors `dag_engine`'s internal `sortition_message(level, salt)`, which
/// isn't exported past crate boundaries.
fn sortition_message(level: u64, salt: &Hash) -> Vec<u8> {
    let mut message = Vec::with_capacity(8 + 32);
    message.extend_from_slice(&level.to_be_bytes());
    message.extend_from_slice(salt);
    message
}

fn build_child(signer: &Secp256k1KeyPair, vrf: &VrfKeyPair, pivot: Hash, level: u64) -> DagBlock {
    let message = sortition_message(level, &NULL_HASH);
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
        pivot,
        level,
        timestamp: level,
        vdf_bytes,
        tips: vec![],
        transactions: vec![],
        gas_estimations: vec![],
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

pub fn admit_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("dag-engine/admit");
    let signer = Secp256k1KeyPair::generate();
    let vrf = VrfKeyPair::generate();

    for chain_len in [16usize, 128] {
        group.bench_with_input(BenchmarkId::new("admit_linear_chain", chain_len), &chain_len, |b, &chain_len| {
            b.iter_with_setup(
                || {
                    let manager = manager();
                    let mut pivot = NULL_HASH;
                    let blocks: Vec<DagBlock> = (1..=chain_len as u64)
                        .map(|level| {
                            let block = build_child(&signer, &vrf, pivot, level);
                            pivot = block.hash();
                            block
                        })
                        .collect();
                    (manager, blocks)
                },
                |(manager, blocks)| {
                    for block in blocks {
                        black_box(manager.admit(block));
                    }
                },
            )
        });
    }

    group.finish();
}

pub fn register(c: &mut Criterion) {
    admit_chain(c);
}
