//! # Wesolowski Verifiable Delay Function
//!
//! Enforces a minimum wall-clock latency on DAG block proposal: `T`
//! sequential squarings modulo a fixed RSA modulus cannot be parallelized,
//! while the resulting proof verifies in time logarithmic in `T`.
//!
//! The group is the well-known RSA-2048 factoring-challenge modulus (the
//! same one used by the Chia VDF), not a freshly generated one — nobody is
//! known to have factored it, and reusing a public modulus avoids a trusted
//! setup ceremony this core has no way to run.

use num_bigint::{BigUint, RandBigInt};
use num_integer::Integer;
use num_traits::{One, Zero};
use sha3::{Digest, Keccak256};
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

const RSA_2048_DECIMAL: &str = concat!(
    "2519590847565789349402718324004839857142928212620403202777713783604366202",
    "0707595556264018525880784406918290641249515082189298559149176184502808489",
    "1200728449926873928072877767359714183472702618963750149718246911650776133",
    "7985909570009733045974880842840179742910064245869181719511874612151517265",
    "4632282216869987549182422433637259085141865462043576798423387184774447920",
    "7399342365848238242811981638150106748104516603773060562016196762561338441",
    "4360383390441495263443219011465754445417842402092461651572335077870774981",
    "7125772467962926386356373289912154831438167899885040445364023527381951378",
    "636564391212010397122822120720357"
);

fn modulus() -> BigUint {
    BigUint::from_str(RSA_2048_DECIMAL).expect("RSA-2048 modulus is a valid decimal literal")
}

/// A Wesolowski VDF solution: the output `y = x^(2^T) mod N` and the proof
/// `pi` that lets a verifier check this in `O(log T)` rather than `O(T)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VdfOutput {
    pub y: Vec<u8>,
    pub pi: Vec<u8>,
}

fn hash_to_group(seed: &[u8], n: &BigUint) -> BigUint {
    let mut hasher = Keccak256::new();
    hasher.update(seed);
    let digest = hasher.finalize();
    let mut candidate = BigUint::from_bytes_be(&digest) % n;
    if candidate.is_zero() {
        candidate = BigUint::one();
    }
    candidate
}

fn is_probably_prime(n: &BigUint, rounds: u32) -> bool {
    let two = BigUint::from(2u32);
    let three = BigUint::from(3u32);
    if *n < two {
        return false;
    }
    if *n == two || *n == three {
        return true;
    }
    if n.is_even() {
        return false;
    }
    let n_minus_one = n - BigUint::one();
    let mut d = n_minus_one.clone();
    let mut r = 0u32;
    while d.is_even() {
        d /= 2u32;
        r += 1;
    }
    let mut rng = rand::thread_rng();
    'witness: for _ in 0..rounds {
        let a = rng.gen_biguint_range(&two, &n_minus_one);
        let mut x = a.modpow(&d, n);
        if x == BigUint::one() || x == n_minus_one {
            continue;
        }
        for _ in 0..r.saturating_sub(1) {
            x = x.modpow(&two, n);
            if x == n_minus_one {
                continue 'witness;
            }
        }
        return false;
    }
    true
}

fn next_probable_prime(start: &BigUint) -> BigUint {
    let mut candidate = start.clone();
    if candidate.is_even() {
        candidate += BigUint::one();
    }
    while !is_probably_prime(&candidate, 24) {
        candidate += 2u32;
    }
    candidate
}

/// Fiat-Shamir challenge prime binding the proof to `(x, y, iterations)`, so
/// a prover cannot reuse a proof computed for a different input or delay.
fn challenge_prime(x: &BigUint, y: &BigUint, iterations: u64) -> BigUint {
    let mut hasher = Keccak256::new();
    hasher.update(x.to_bytes_be());
    hasher.update(y.to_bytes_be());
    hasher.update(iterations.to_be_bytes());
    let digest = hasher.finalize();
    next_probable_prime(&BigUint::from_bytes_be(&digest))
}

/// Compute `pi = x^(floor(2^iterations / l)) mod n` without materializing
/// `2^iterations`, via the standard bit-iterative quotient recurrence.
fn compute_proof(x: &BigUint, l: &BigUint, iterations: u64, n: &BigUint) -> BigUint {
    let two = BigUint::from(2u32);
    let mut pi = BigUint::one();
    let mut r = BigUint::one();
    for _ in 0..iterations {
        let doubled = &r * &two;
        let b = &doubled / l;
        r = &doubled % l;
        pi = (&pi * &pi % n) * x.modpow(&b, n) % n;
    }
    pi
}

/// Run the VDF to completion, blocking the calling thread for
/// `O(iterations)` modular squarings. Callers in `dag-engine` run this via
/// `tokio::task::spawn_blocking`.
pub fn solve(seed: &[u8], iterations: u64) -> VdfOutput {
    solve_cancellable(seed, iterations, &AtomicBool::new(false)).expect("never cancelled")
}

/// As [`solve`], but polls `cancel` at a 100 ms granularity and returns
/// `None` as soon as it observes `cancel` set, matching the sortition
/// proposer's abort-on-frontier-change behavior.
pub fn solve_cancellable(seed: &[u8], iterations: u64, cancel: &AtomicBool) -> Option<VdfOutput> {
    const POLL_EVERY_ITERATIONS: u64 = 256;
    let n = modulus();
    let x = hash_to_group(seed, &n);
    let mut y = x.clone();
    let mut last_poll = Instant::now();
    for i in 0..iterations {
        y = (&y * &y) % &n;
        let iteration_boundary = i % POLL_EVERY_ITERATIONS == POLL_EVERY_ITERATIONS - 1;
        if iteration_boundary || last_poll.elapsed() >= Duration::from_millis(100) {
            if cancel.load(Ordering::Relaxed) {
                return None;
            }
            last_poll = Instant::now();
        }
    }
    let l = challenge_prime(&x, &y, iterations);
    let pi = compute_proof(&x, &l, iterations, &n);
    Some(VdfOutput {
        y: y.to_bytes_be(),
        pi: pi.to_bytes_be(),
    })
}

/// Verify a VDF solution in `O(log iterations)`: recompute the challenge
/// prime and the quotient-remainder `r = 2^iterations mod l`, then check
/// `pi^l * x^r == y (mod n)`.
pub fn verify(seed: &[u8], iterations: u64, output: &VdfOutput) -> bool {
    let n = modulus();
    let x = hash_to_group(seed, &n);
    let y = BigUint::from_bytes_be(&output.y);
    let pi = BigUint::from_bytes_be(&output.pi);
    let l = challenge_prime(&x, &y, iterations);
    let r = BigUint::from(2u32).modpow(&BigUint::from(iterations), &l);
    let lhs = pi.modpow(&l, &n) * x.modpow(&r, &n) % &n;
    lhs == y
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solve_and_verify_roundtrip() {
        let seed = b"dag-level-42-salt";
        let output = solve(seed, 50);
        assert!(verify(seed, 50, &output));
    }

    #[test]
    fn verify_rejects_wrong_iteration_count() {
        let seed = b"dag-level-42-salt";
        let output = solve(seed, 50);
        assert!(!verify(seed, 51, &output));
    }

    #[test]
    fn verify_rejects_wrong_seed() {
        let output = solve(b"seed-a", 50);
        assert!(!verify(b"seed-b", 50, &output));
    }

    #[test]
    fn solve_is_deterministic() {
        let seed = b"deterministic-seed";
        let a = solve(seed, 30);
        let b = solve(seed, 30);
        assert_eq!(a, b);
    }

    #[test]
    fn cancellation_observed_aborts_computation() {
        let cancel = AtomicBool::new(true);
        // 256 iterations guarantees one poll boundary is reached.
        let result = solve_cancellable(b"seed", 256, &cancel);
        assert!(result.is_none());
    }

    #[test]
    fn uncancelled_run_matches_plain_solve() {
        let cancel = AtomicBool::new(false);
        let seed = b"deterministic-seed";
        let a = solve_cancellable(seed, 300, &cancel).unwrap();
        let b = solve(seed, 300);
        assert_eq!(a, b);
    }
}
