//! Double-vote detection (spec.md §8 S4): a validator signing two
//! different block hashes for the same `(period, round, step)` slot must
//! be rejected and reported, without inflating that slot's aggregate
//! weight past the validator's own share.

use std::sync::Arc;

use core_bus::{CoreEvent, EventBus, EventFilter};
use core_crypto::ecdsa::Secp256k1KeyPair;
use core_crypto::vrf::{VrfKeyPair, VrfPublicKey};
use core_types::rlp_util::OptWeight;
use core_types::{Address, Period, Vote};
use pbft_engine::{encode_vrf_proof, step_sortition_message};
use vote_manager::{DposGateway, ValidatorKeyGateway, VoteError, VoteManager, VoteManagerConfig};

struct Committee {
    members: Vec<(Address, VrfPublicKey)>,
}

impl DposGateway for Committee {
    fn vote_weight(&self, voter: &Address, _period: Period) -> u64 {
        if self.members.iter().any(|(address, _)| address == voter) {
            1
        } else {
            0
        }
    }

    fn total_eligible_votes(&self, _period: Period) -> u64 {
        self.members.len() as u64
    }
}

impl ValidatorKeyGateway for Committee {
    fn vrf_public_key(&self, voter: &Address, _period: Period) -> Option<VrfPublicKey> {
        self.members.iter().find(|(address, _)| address == voter).map(|(_, key)| key.clone())
    }
}

fn make_vote(signer: &Secp256k1KeyPair, vrf: &VrfKeyPair, period: Period, round: u64, step: u64, block_hash: [u8; 32]) -> Vote {
    let message = step_sortition_message(period, round, step);
    let proof = vrf.prove(&message);
    let mut vote = Vote {
        block_hash,
        period,
        round,
        step,
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

#[tokio::test]
async fn equivocation_is_rejected_and_does_not_inflate_quorum() {
    let signers: Vec<Secp256k1KeyPair> = (0..3).map(|_| Secp256k1KeyPair::generate()).collect();
    let vrfs: Vec<VrfKeyPair> = (0..3).map(|_| VrfKeyPair::generate()).collect();
    let committee = Arc::new(Committee {
        members: signers.iter().zip(&vrfs).map(|(s, v)| (s.address(), v.public())).collect(),
    });

    let bus = Arc::new(EventBus::new());
    let mut equivocations = bus.subscribe(EventFilter::all());
    let manager = VoteManager::new(
        committee.clone() as Arc<dyn DposGateway>,
        committee.clone() as Arc<dyn ValidatorKeyGateway>,
        bus.clone(),
        VoteManagerConfig::default(),
    );

    let honest_block = [0xaa; 32];
    let equivocating_block = [0xbb; 32];

    // Validator 0 casts a legitimate vote first.
    let first = make_vote(&signers[0], &vrfs[0], 1, 0, 1, honest_block);
    manager.verify_and_index(first).unwrap();

    // Validators 1 and 2 vote honestly for the same value; this alone
    // already reaches every slot short of validator 0's weight.
    let second = make_vote(&signers[1], &vrfs[1], 1, 0, 1, honest_block);
    manager.verify_and_index(second).unwrap();
    let third = make_vote(&signers[2], &vrfs[2], 1, 0, 1, honest_block);
    manager.verify_and_index(third).unwrap();

    assert_eq!(manager.quorum_value(1, 0, 1), Some(honest_block));

    // Validator 0 now equivocates, signing a second, different block at
    // the exact same slot.
    let double = make_vote(&signers[0], &vrfs[0], 1, 0, 1, equivocating_block);
    let result = manager.verify_and_index(double);
    assert!(matches!(result, Err(VoteError::DoubleVote(_))));

    // The equivocating value never reaches quorum — validator 0's weight
    // was not double-counted onto it.
    assert_eq!(manager.quorum_value(1, 0, 1), Some(honest_block));

    match equivocations.recv().await.unwrap() {
        CoreEvent::Equivocation { period, round, step } => {
            assert_eq!((period, round, step), (1, 0, 1));
        }
        other => panic!("expected Equivocation, got {other:?}"),
    }
}

#[tokio::test]
async fn resubmitting_the_identical_vote_is_a_noop_not_an_equivocation() {
    let signer = Secp256k1KeyPair::generate();
    let vrf = VrfKeyPair::generate();
    let committee = Arc::new(Committee { members: vec![(signer.address(), vrf.public())] });
    let bus = Arc::new(EventBus::new());
    let manager = VoteManager::new(
        committee.clone() as Arc<dyn DposGateway>,
        committee.clone() as Arc<dyn ValidatorKeyGateway>,
        bus,
        VoteManagerConfig::default(),
    );

    let vote = make_vote(&signer, &vrf, 1, 0, 1, [0x11; 32]);
    manager.verify_and_index(vote.clone()).unwrap();
    let resubmitted = manager.verify_and_index(vote);
    assert!(matches!(resubmitted, Err(VoteError::AlreadyKnown(_))));
}
