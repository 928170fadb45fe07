//! Rewards-stats tally: spec.md §4.4's supplement over the wire format —
//! two maps computed alongside finalization and persisted as the
//! `PeriodData`'s sidecar rather than folded into the RLP record itself,
//! so a protocol upgrade to the reward formula never touches the wire
//! type.

use std::collections::HashMap;

use core_crypto::ecdsa::RecoverableSignature;
use core_types::{Address, DagBlock, VoteBundle};
use serde::{Deserialize, Serialize};

use crate::domain::sub_dag::order_and_dedupe_transactions;

/// Not part of `PeriodData`'s RLP — computed fresh each finalization and
/// handed to whatever reward-distribution logic (out of scope) consumes
/// it, keyed by the account that earns the credit.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardsStats {
    /// Count of previously-unseen transactions each DAG block proposer
    /// contributed to this period, keyed by the recovered proposer
    /// address.
    pub proposer_unique_tx_counts: HashMap<Address, u64>,
    /// Addresses whose cert vote for the *previous* period is present in
    /// this period's `previous_period_cert_votes`. Absence means the
    /// voter didn't participate in that quorum, not that it was penalized
    /// — this map only ever records `true`.
    pub voter_cert_vote_included: HashMap<Address, bool>,
}

/// Tally both maps. `ordered_blocks` must already be BFS-collected and
/// level/hash-sorted; `reward_votes` is the *previous* period's verified
/// cert-vote bundle, or `None` if that period had none on record.
pub fn tally_rewards(ordered_blocks: &[DagBlock], reward_votes: Option<&VoteBundle>) -> RewardsStats {
    let mut stats = RewardsStats::default();
    let (_, contributor_index) = order_and_dedupe_transactions(ordered_blocks);

    let mut proposers = Vec::with_capacity(ordered_blocks.len());
    for block in ordered_blocks {
        let sig = RecoverableSignature { r: block.r, s: block.s, v: block.v };
        proposers.push(sig.recover_address(&block.signing_hash(), 0).ok());
    }

    for block_index in contributor_index {
        if let Some(Some(proposer)) = proposers.get(block_index) {
            *stats.proposer_unique_tx_counts.entry(*proposer).or_insert(0) += 1;
        }
    }

    if let Some(bundle) = reward_votes {
        for vote in &bundle.votes {
            let sig = RecoverableSignature { r: vote.r, s: vote.s, v: vote.v };
            if let Ok(voter) = sig.recover_address(&vote.signing_hash(), 0) {
                stats.voter_cert_vote_included.insert(voter, true);
            }
        }
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_crypto::ecdsa::Secp256k1KeyPair;
    use core_types::rlp_util::OptWeight;
    use core_types::{Vote, NULL_HASH};

    fn signed_block(signer: &Secp256k1KeyPair, pivot: core_types::Hash, level: u64, txs: Vec<core_types::Hash>) -> DagBlock {
        let mut block = DagBlock {
            pivot,
            level,
            timestamp: 1,
            vdf_bytes: vec![],
            tips: vec![],
            gas_estimations: vec![0; txs.len()],
            transactions: txs,
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

    fn signed_vote(signer: &Secp256k1KeyPair, period: u64) -> Vote {
        let mut vote = Vote {
            block_hash: [1u8; 32],
            period,
            round: 1,
            step: 3,
            weight: OptWeight(Some(1)),
            vrf_proof: vec![0u8; 96],
            v: 0,
            r: [0u8; 32],
            s: [0u8; 32],
        };
        let sig = signer.sign_prehash(&vote.signing_hash(), 0);
        vote.v = sig.v;
        vote.r = sig.r;
        vote.s = sig.s;
        vote
    }

    #[test]
    fn proposer_gets_credit_for_unique_contributions() {
        let signer = Secp256k1KeyPair::generate();
        let block = signed_block(&signer, NULL_HASH, 1, vec![[1u8; 32], [2u8; 32]]);
        let stats = tally_rewards(&[block], None);
        let proposer = signer.address();
        assert_eq!(stats.proposer_unique_tx_counts.get(&proposer), Some(&2));
    }

    #[test]
    fn voter_recovered_from_reward_votes_is_marked_included() {
        let signer = Secp256k1KeyPair::generate();
        let vote = signed_vote(&signer, 4);
        let bundle = VoteBundle { votes: vec![vote] };
        let stats = tally_rewards(&[], Some(&bundle));
        assert_eq!(stats.voter_cert_vote_included.get(&signer.address()), Some(&true));
    }
}
