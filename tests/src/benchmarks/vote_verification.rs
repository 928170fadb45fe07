//! Benchmarks `VoteManager::verify_and_index`: signature recovery, VRF
//! proof verification and DPoS weight lookup, the pipeline every
//! incoming vote runs through before it counts toward a quorum.

use std::sync::Arc;

use core_bus::EventBus;
use core_crypto::ecdsa::Secp256k1KeyPair;
use core_crypto::vrf::{VrfKeyPair, VrfPublicKey};
use core_types::rlp_util::OptWeight;
use core_types::{Address, Period, Vote};
use criterion::{black_box, BenchmarkId, Criterion};
use pbft_engine::{encode_vrf_proof, step_sortition_message};
use vote_manager::{DposGateway, ValidatorKeyGateway, VoteManager, VoteManagerConfig};

struct SingleValidator {
    address: Address,
    vrf_public: VrfPublicKey,
}

impl DposGateway for SingleValidator {
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

impl ValidatorKeyGateway for SingleValidator {
    fn vrf_public_key(&self, voter: &Address, _period: Period) -> Option<VrfPublicKey> {
        if *voter == self.address {
            Some(self.vrf_public.clone())
        } else {
            None
        }
    }
}

fn sample_vote(signer: &Secp256k1KeyPair, vrf: &VrfKeyPair, round: u64) -> Vote {
    let message = step_sortition_message(1, round, 1);
    let proof = vrf.prove(&message);
    let mut vote = Vote {
        block_hash: [round as u8; 32],
        period: 1,
        round,
        step: 1,
        weight: OptWeight(None),
        vrf_proof: encode_vrf_proof(&proof),
        v: 0,
        r: [0u8; 32],
        s: [0u8; 32],
    };
    let signing_hash = vote.signing_hash();
    let sig = signer.sign_prehash(&signing_hash, 0);
    vote.v = sig.v;
    vote.r = sig.r;
    vote.s = sig.s;
    vote
}

pub fn verify_and_index(c: &mut Criterion) {
    let mut group = c.benchmark_group("vote-manager/verify_and_index");
    let signer = Secp256k1KeyPair::generate();
    let vrf = VrfKeyPair::generate();
    let validator = Arc::new(SingleValidator { address: signer.address(), vrf_public: vrf.public() });

    for batch in [16u64, 128] {
        group.bench_with_input(BenchmarkId::new("verify_batch", batch), &batch, |b, &batch| {
            b.iter_with_setup(
                || {
                    let manager = VoteManager::new(
                        validator.clone() as Arc<dyn DposGateway>,
                        validator.clone() as Arc<dyn ValidatorKeyGateway>,
                        Arc::new(EventBus::new()),
                        VoteManagerConfig::default(),
                    );
                    let votes: Vec<Vote> = (0..batch).map(|round| sample_vote(&signer, &vrf, round)).collect();
                    (manager, votes)
                },
                |(manager, votes)| {
                    for vote in votes {
                        black_box(manager.verify_and_index(vote).unwrap());
                    }
                },
            )
        });
    }

    group.finish();
}

pub fn register(c: &mut Criterion) {
    verify_and_index(c);
}
