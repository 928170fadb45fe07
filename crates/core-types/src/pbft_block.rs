//! PBFT block wire type:
//! `[prev_hash, anchor_hash, order_hash, period, timestamp, extra_data?,
//! signature]`.

use alloy_rlp::{Decodable, Encodable, RlpDecodable, RlpEncodable};
use sha3::{Digest, Keccak256};

use crate::error::TypesResult;
use crate::primitives::{Hash, Period, NULL_HASH};
use crate::rlp_util::{OptBytes, OptHash};

/// Protocol versions plus the optional pillar-block digest, carried as
/// opaque `extra_data` — the core stores and RLP-round-trips this slot but
/// does not interpret the pillar hash further (no pillar-chain logic is
/// implemented).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, RlpEncodable, RlpDecodable)]
pub struct PbftExtraData {
    pub major_version: u32,
    pub minor_version: u32,
    pub pillar_block_hash: OptHash,
}

impl PbftExtraData {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.length());
        self.encode(&mut buf);
        buf
    }

    pub fn from_bytes(mut bytes: &[u8]) -> TypesResult<Self> {
        Ok(Self::decode(&mut bytes)?)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, RlpEncodable, RlpDecodable)]
pub struct PbftBlock {
    pub prev_block_hash: Hash,
    pub anchor_hash: Hash,
    pub order_hash: Hash,
    pub period: Period,
    pub timestamp: u64,
    pub extra_data: OptBytes,
    pub v: u64,
    pub r: [u8; 32],
    pub s: [u8; 32],
}

impl PbftBlock {
    /// `true` for an empty period: the anchor is the null hash because no
    /// eligible DAG block could be certified this period.
    pub fn is_empty_period(&self) -> bool {
        self.anchor_hash == NULL_HASH
    }

    pub fn hash(&self) -> Hash {
        let mut buf = Vec::with_capacity(self.length());
        self.encode(&mut buf);
        let mut hasher = Keccak256::new();
        hasher.update(&buf);
        hasher.finalize().into()
    }

    pub fn signing_hash(&self) -> Hash {
        #[derive(RlpEncodable)]
        struct Unsigned {
            prev_block_hash: Hash,
            anchor_hash: Hash,
            order_hash: Hash,
            period: Period,
            timestamp: u64,
            extra_data: OptBytes,
        }
        let mut buf = Vec::new();
        Unsigned {
            prev_block_hash: self.prev_block_hash,
            anchor_hash: self.anchor_hash,
            order_hash: self.order_hash,
            period: self.period,
            timestamp: self.timestamp,
            extra_data: self.extra_data.clone(),
        }
        .encode(&mut buf);
        let mut hasher = Keccak256::new();
        hasher.update(&buf);
        hasher.finalize().into()
    }

    pub fn parsed_extra_data(&self) -> TypesResult<Option<PbftExtraData>> {
        match &self.extra_data.0 {
            Some(bytes) => Ok(Some(PbftExtraData::from_bytes(bytes)?)),
            None => Ok(None),
        }
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
