//! Benchmarks for `core-crypto`'s four primitives: Keccak-256 hashing,
//! recoverable secp256k1 signing/recovery, VRF proving/verification and
//! the Wesolowski VDF. The VDF benchmark uses a small iteration count —
//! enough to compare solve-vs-verify asymmetry, not to reproduce a real
//! sortition difficulty.

use core_crypto::ecdsa::Secp256k1KeyPair;
use core_crypto::hashing::keccak256;
use core_crypto::vdf;
use core_crypto::vrf::VrfKeyPair;
use criterion::{black_box, BenchmarkId, Criterion, Throughput};

pub fn keccak256_hashing(c: &mut Criterion) {
    let mut group = c.benchmark_group("crypto/keccak256");
    for size in [32, 256, 4096] {
        let data = vec![0xabu8; size];
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("hash", size), &data, |b, data| {
            b.iter(|| black_box(keccak256(data)))
        });
    }
    group.finish();
}

pub fn ecdsa_sign_and_recover(c: &mut Criterion) {
    let mut group = c.benchmark_group("crypto/ecdsa");
    let signer = Secp256k1KeyPair::generate();
    let message = keccak256(b"benchmark transaction payload");

    group.bench_function("sign_prehash", |b| {
        b.iter(|| black_box(signer.sign_prehash(&message, 0)))
    });

    let sig = signer.sign_prehash(&message, 0);
    group.bench_function("recover_address", |b| {
        b.iter(|| black_box(sig.recover_address(&message, 0).unwrap()))
    });

    group.finish();
}

pub fn vrf_prove_and_verify(c: &mut Criterion) {
    let mut group = c.benchmark_group("crypto/vrf");
    let keypair = VrfKeyPair::generate();
    let message = b"period=1 round=0 step=0";

    group.bench_function("prove", |b| b.iter(|| black_box(keypair.prove(message))));

    let proof = keypair.prove(message);
    let public = keypair.public();
    group.bench_function("verify", |b| {
        b.iter(|| black_box(public.verify(message, &proof).unwrap()))
    });

    group.finish();
}

pub fn vdf_solve_and_verify(c: &mut Criterion) {
    let mut group = c.benchmark_group("crypto/vdf");
    group.sample_size(10);
    let seed = keccak256(b"dag level 1 salt");

    for iterations in [256u64, 1024] {
        group.bench_with_input(BenchmarkId::new("solve", iterations), &iterations, |b, &iterations| {
            b.iter(|| black_box(vdf::solve(&seed, iterations)))
        });

        let output = vdf::solve(&seed, iterations);
        group.bench_with_input(BenchmarkId::new("verify", iterations), &iterations, |b, &iterations| {
            b.iter(|| black_box(vdf::verify(&seed, iterations, &output)))
        });
    }

    group.finish();
}

pub fn register(c: &mut Criterion) {
    keccak256_hashing(c);
    ecdsa_sign_and_recover(c);
    vrf_prove_and_verify(c);
    vdf_solve_and_verify(c);
}
