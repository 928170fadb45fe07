//! Hand-written helpers for the few RLP shapes `alloy_rlp`'s derive macro
//! does not cover: optional trailing fields. Every wire type in this crate
//! that carries an `Option<_>` field encodes it as an empty RLP string when
//! absent, the convention the original source's legacy-field handling
//! (`second_last_pbft_block_hash`, `extra_data`, vote `weight`) already
//! follows.

use alloy_rlp::{Decodable, Encodable, Header};
use bytes::{Buf, BufMut};

use crate::primitives::{Address, Hash};

const EMPTY_STRING_HEADER: Header = Header { list: false, payload_length: 0 };

/// An `Option<Address>` that RLP-encodes as an empty string when `None`,
/// used for a transaction's `receiver` (absent ⇒ contract creation).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct OptAddress(pub Option<Address>);

impl Encodable for OptAddress {
    fn encode(&self, out: &mut dyn BufMut) {
        match self.0 {
            Some(a) => a.encode(out),
            None => EMPTY_STRING_HEADER.encode(out),
        }
    }

    fn length(&self) -> usize {
        match self.0 {
            Some(a) => a.length(),
            None => EMPTY_STRING_HEADER.length(),
        }
    }
}

impl Decodable for OptAddress {
    fn decode(buf: &mut &[u8]) -> alloy_rlp::Result<Self> {
        let header = Header::decode(buf)?;
        if header.list {
            return Err(alloy_rlp::Error::UnexpectedList);
        }
        if header.payload_length == 0 {
            return Ok(OptAddress(None));
        }
        if header.payload_length != 20 {
            return Err(alloy_rlp::Error::UnexpectedLength);
        }
        let mut addr = [0u8; 20];
        addr.copy_from_slice(&buf[..20]);
        buf.advance(20);
        Ok(OptAddress(Some(addr)))
    }
}

/// An `Option<Hash>` that RLP-encodes as an empty string when `None`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct OptHash(pub Option<Hash>);

impl Encodable for OptHash {
    fn encode(&self, out: &mut dyn BufMut) {
        match self.0 {
            Some(h) => h.encode(out),
            None => EMPTY_STRING_HEADER.encode(out),
        }
    }

    fn length(&self) -> usize {
        match self.0 {
            Some(h) => h.length(),
            None => EMPTY_STRING_HEADER.length(),
        }
    }
}

impl Decodable for OptHash {
    fn decode(buf: &mut &[u8]) -> alloy_rlp::Result<Self> {
        let header = Header::decode(buf)?;
        if header.list {
            return Err(alloy_rlp::Error::UnexpectedList);
        }
        if header.payload_length == 0 {
            return Ok(OptHash(None));
        }
        if header.payload_length != 32 {
            return Err(alloy_rlp::Error::UnexpectedLength);
        }
        let mut hash = [0u8; 32];
        hash.copy_from_slice(&buf[..32]);
        buf.advance(32);
        Ok(OptHash(Some(hash)))
    }
}

/// An `Option<Vec<u8>>` that RLP-encodes as an empty string when `None`,
/// used for `PbftBlock::extra_data`.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct OptBytes(pub Option<Vec<u8>>);

impl Encodable for OptBytes {
    fn encode(&self, out: &mut dyn BufMut) {
        match &self.0 {
            Some(bytes) => bytes.as_slice().encode(out),
            None => EMPTY_STRING_HEADER.encode(out),
        }
    }

    fn length(&self) -> usize {
        match &self.0 {
            Some(bytes) => bytes.as_slice().length(),
            None => EMPTY_STRING_HEADER.length(),
        }
    }
}

impl Decodable for OptBytes {
    fn decode(buf: &mut &[u8]) -> alloy_rlp::Result<Self> {
        let bytes = Vec::<u8>::decode(buf)?;
        if bytes.is_empty() {
            Ok(OptBytes(None))
        } else {
            Ok(OptBytes(Some(bytes)))
        }
    }
}

/// An `Option<u64>` that encodes as an empty string when `None`, used for
/// the vote `weight?` field (absent only on a vote not yet verified against
/// the DPoS weight table).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct OptWeight(pub Option<u64>);

impl Encodable for OptWeight {
    fn encode(&self, out: &mut dyn BufMut) {
        match self.0 {
            Some(w) => w.encode(out),
            None => EMPTY_STRING_HEADER.encode(out),
        }
    }

    fn length(&self) -> usize {
        match self.0 {
            Some(w) => w.length(),
            None => EMPTY_STRING_HEADER.length(),
        }
    }
}

impl Decodable for OptWeight {
    fn decode(buf: &mut &[u8]) -> alloy_rlp::Result<Self> {
        // Peek the header without consuming `buf` so an absent value can be
        // told apart from a present `0u64`, which also round-trips through
        // an empty RLP string.
        let mut peek = *buf;
        let header = Header::decode(&mut peek)?;
        if header.list {
            return Err(alloy_rlp::Error::UnexpectedList);
        }
        if header.payload_length == 0 {
            *buf = peek;
            return Ok(OptWeight(None));
        }
        Ok(OptWeight(Some(u64::decode(buf)?)))
    }
}
