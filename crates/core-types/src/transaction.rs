//! Legacy (pre-EIP-1559) transaction wire type with EIP-155 replay
//! protection: the 9-field legacy encoding carries `chain_id` folded into
//! `v` rather than as a separate field.

use alloy_rlp::{Decodable, Encodable, RlpDecodable, RlpEncodable};
use sha3::{Digest, Keccak256};

use crate::error::{TypesError, TypesResult};
use crate::primitives::{Address, Hash};
use crate::rlp_util::OptAddress;

/// The 9 signed fields, in wire order: `nonce, gas_price, gas_limit,
/// receiver, value, data, v, r, s`.
#[derive(Clone, Debug, PartialEq, Eq, RlpEncodable, RlpDecodable)]
pub struct Transaction {
    pub nonce: u64,
    pub gas_price: u128,
    pub gas_limit: u64,
    pub receiver: OptAddress,
    pub value: u128,
    pub data: Vec<u8>,
    pub v: u64,
    pub r: [u8; 32],
    pub s: [u8; 32],
}

impl Transaction {
    /// The chain id folded into `v` per EIP-155; `0` for legacy (pre-155)
    /// signatures where replay protection is not in effect.
    pub fn chain_id(&self) -> u64 {
        if self.v >= 35 {
            (self.v - 35) / 2
        } else {
            0
        }
    }

    /// Keccak-256 of the canonical RLP encoding of all 9 fields, exactly as
    /// received — the transaction hash used for pool lookups, DAG block
    /// `transactions` references, and `transaction_location`.
    pub fn hash(&self) -> Hash {
        let mut buf = Vec::with_capacity(self.length());
        self.encode(&mut buf);
        let mut hasher = Keccak256::new();
        hasher.update(&buf);
        hasher.finalize().into()
    }

    /// Recover the sender's address. `recover` is supplied by the caller
    /// (`core-crypto::ecdsa::RecoverableSignature::recover_address`) over the
    /// Keccak-256 of the 6 unsigned fields, with `chain_id` folded into the
    /// prehash per EIP-155 when non-zero.
    pub fn signing_hash(&self) -> Hash {
        #[derive(RlpEncodable)]
        struct UnsignedLegacy {
            nonce: u64,
            gas_price: u128,
            gas_limit: u64,
            receiver: OptAddress,
            value: u128,
            data: Vec<u8>,
        }
        #[derive(RlpEncodable)]
        struct UnsignedEip155 {
            nonce: u64,
            gas_price: u128,
            gas_limit: u64,
            receiver: OptAddress,
            value: u128,
            data: Vec<u8>,
            chain_id: u64,
            empty_r: u8,
            empty_s: u8,
        }

        let chain_id = self.chain_id();
        let mut buf = Vec::new();
        if chain_id == 0 {
            UnsignedLegacy {
                nonce: self.nonce,
                gas_price: self.gas_price,
                gas_limit: self.gas_limit,
                receiver: self.receiver,
                value: self.value,
                data: self.data.clone(),
            }
            .encode(&mut buf);
        } else {
            UnsignedEip155 {
                nonce: self.nonce,
                gas_price: self.gas_price,
                gas_limit: self.gas_limit,
                receiver: self.receiver,
                value: self.value,
                data: self.data.clone(),
                chain_id,
                empty_r: 0,
                empty_s: 0,
            }
            .encode(&mut buf);
        }
        let mut hasher = Keccak256::new();
        hasher.update(&buf);
        hasher.finalize().into()
    }

    /// `true` when `receiver` is absent, i.e. this transaction creates a
    /// contract (state-transition semantics are owned by `StateAPI`, not
    /// this core — this accessor only tells the DAG/PBFT layer whether a
    /// destination address exists for bookkeeping purposes).
    pub fn is_contract_creation(&self) -> bool {
        self.receiver.0.is_none()
    }

    pub fn receiver(&self) -> Option<Address> {
        self.receiver.0
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

/// Validate the length invariant shared by DAG blocks: `|transactions| ==
/// |gas_estimations|`.
pub fn check_matched_estimations(tx_len: usize, gas_len: usize) -> TypesResult<()> {
    if tx_len != gas_len {
        return Err(TypesError::MismatchedEstimations { tx_len, gas_len });
    }
    Ok(())
}
