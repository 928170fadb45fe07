//! Benchmarks the sub-DAG BFS collection and deterministic transaction
//! ordering every honest node replays at finalization time.

use std::collections::HashMap;

use core_types::{DagBlock, Hash, NULL_HASH};
use criterion::{black_box, BenchmarkId, Criterion};
use period_finalizer::domain::sub_dag::SubDagLookup;
use period_finalizer::{collect_sub_dag, order_and_dedupe_transactions};

struct MapLookup(HashMap<Hash, DagBlock>);
impl SubDagLookup for MapLookup {
    fn get(&self, hash: &Hash) -> Option<DagBlock> {
        self.0.get(hash).cloned()
    }
    fn is_finalized(&self, _hash: &Hash) -> bool {
        false
    }
}

/// A straight pivot chain of `count` blocks, each with `tx_per_block`
/// distinct transaction hashes, no forking tips.
fn build_chain(count: u64, tx_per_block: u64) -> (MapLookup, Hash) {
    let mut blocks = HashMap::new();
    let mut pivot = NULL_HASH;
    for level in 1..=count {
        let transactions: Vec<Hash> =
            (0..tx_per_block).map(|i| core_crypto::hashing::keccak256(&(level * 1000 + i).to_be_bytes())).collect();
        let block = DagBlock {
            pivot,
            level,
            timestamp: level,
            vdf_bytes: vec![],
            tips: vec![],
            transactions,
            gas_estimations: vec![21_000; tx_per_block as usize],
            v: 0,
            r: [0u8; 32],
            s: [0u8; 32],
        };
        pivot = block.hash();
        blocks.insert(pivot, block);
    }
    (MapLookup(blocks), pivot)
}

pub fn collect_and_order(c: &mut Criterion) {
    let mut group = c.benchmark_group("period-finalizer/sub_dag");

    for (levels, tx_per_block) in [(50u64, 10u64), (200, 20)] {
        let label = format!("{levels}x{tx_per_block}");
        group.bench_with_input(BenchmarkId::new("collect_and_order", label), &(levels, tx_per_block), |b, &(levels, tx_per_block)| {
            b.iter_with_setup(
                || build_chain(levels, tx_per_block),
                |(lookup, anchor)| {
                    let ordered = collect_sub_dag(&lookup, anchor).unwrap();
                    black_box(order_and_dedupe_transactions(&ordered))
                },
            )
        });
    }

    group.finish();
}

pub fn register(c: &mut Criterion) {
    collect_and_order(c);
}
