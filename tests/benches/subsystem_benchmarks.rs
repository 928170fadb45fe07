//! Criterion entry point registering every subsystem benchmark module
//! under `tests/src/benchmarks/`.
//!
//! | Crate | Benchmark |
//! |---|---|
//! | core-crypto | keccak256, ecdsa sign/recover, vrf prove/verify, vdf solve/verify |
//! | dag-engine | `DagManager::admit` over a linear chain |
//! | period-finalizer | sub-DAG BFS collection + transaction ordering |
//! | vote-manager | `VoteManager::verify_and_index` |

use criterion::{criterion_group, criterion_main, Criterion};
use vesta_tests::benchmarks::{crypto_primitives, dag_admission, sub_dag_ordering, vote_verification};

fn all_benchmarks(c: &mut Criterion) {
    crypto_primitives::register(c);
    dag_admission::register(c);
    sub_dag_ordering::register(c);
    vote_verification::register(c);
}

criterion_group!(benches, all_benchmarks);
criterion_main!(benches);
