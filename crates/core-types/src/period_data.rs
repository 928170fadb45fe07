//! `PeriodData`, the authoritative on-disk record of a finalized period,
//! wire format: `[pbft_block, dag_blocks[], transactions[],
//! previous_period_cert_votes[], optional_bonus_votes_count]`.

use alloy_rlp::{Decodable, Encodable, RlpDecodable, RlpEncodable};

use crate::dag_block::DagBlock;
use crate::error::TypesResult;
use crate::pbft_block::PbftBlock;
use crate::rlp_util::OptWeight;
use crate::transaction::Transaction;
use crate::vote::Vote;

#[derive(Clone, Debug, PartialEq, Eq, RlpEncodable, RlpDecodable)]
pub struct PeriodData {
    pub pbft_block: PbftBlock,
    pub dag_blocks: Vec<DagBlock>,
    pub transactions: Vec<Transaction>,
    /// The cert votes of period `period - 1`, persisted here for reward
    /// accounting in *this* period ("reward votes").
    pub previous_period_cert_votes: Vec<Vote>,
    /// Reserved for a future bonus-vote-count protocol extension; always
    /// absent in the core's own encodings, decoded for forward
    /// compatibility with peers that set it.
    pub optional_bonus_votes_count: OptWeight,
}

impl PeriodData {
    pub fn period(&self) -> u64 {
        self.pbft_block.period
    }

    pub fn decode_rlp(mut bytes: &[u8]) -> TypesResult<Self> {
        Ok(Self::decode(&mut bytes)?)
    }

    pub fn encode_rlp(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.length());
        self.encode(&mut buf);
        buf
    }
}
