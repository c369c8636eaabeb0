//! # Block Container
//!
//! A block carries a header (height, parent hash, timestamp, the two
//! commitment roots) and the payload: transaction+receipt composites and
//! the state records the block produced. Children serialize as their own
//! envelope bytes nested inside the block envelope, so each child keeps
//! its tag and decodes through its own strict decoder.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::block::{AnyState, TransactionWithData};
use crate::codec::{self, Canonical, CodecResult, Tag};
use crate::crypto::Hash;

/// Serialized layout: header fields plus the envelope bytes of each child.
#[derive(Serialize, Deserialize)]
struct BlockWire {
    index: u64,
    parent_hash: Hash,
    timestamp: i64,
    transaction_root: Hash,
    state_root: Hash,
    transactions: Vec<Vec<u8>>,
    states: Vec<Vec<u8>>,
}

/// A block, envelope tag 100.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    /// Cached content hash. Assigned on ingestion, never serialized.
    pub hash: Option<Hash>,

    /// Block height.
    pub index: u64,
    pub parent_hash: Hash,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub transaction_root: Hash,
    pub state_root: Hash,

    pub transactions: Vec<TransactionWithData>,
    pub states: Vec<AnyState>,
}

impl Block {
    /// A new empty block at `index` on top of `parent_hash`, stamped now.
    pub fn new(index: u64, parent_hash: Hash) -> Self {
        Self {
            hash: None,
            index,
            parent_hash,
            timestamp: Utc::now().timestamp_millis(),
            transaction_root: Hash::ZERO,
            state_root: Hash::ZERO,
            transactions: Vec::new(),
            states: Vec::new(),
        }
    }

    pub fn hash(&self) -> Option<Hash> {
        self.hash
    }

    pub fn set_hash(&mut self, hash: Hash) {
        self.hash = Some(hash);
    }
}

impl Canonical for Block {
    fn marshal(&self) -> CodecResult<Vec<u8>> {
        let transactions = self
            .transactions
            .iter()
            .map(|txd| txd.marshal())
            .collect::<CodecResult<Vec<_>>>()?;
        let states = self
            .states
            .iter()
            .map(|state| state.marshal())
            .collect::<CodecResult<Vec<_>>>()?;
        let wire = BlockWire {
            index: self.index,
            parent_hash: self.parent_hash,
            timestamp: self.timestamp,
            transaction_root: self.transaction_root,
            state_root: self.state_root,
            transactions,
            states,
        };
        codec::encode(Tag::Block, &wire)
    }

    fn unmarshal(data: &[u8]) -> CodecResult<Self> {
        let wire: BlockWire = codec::decode_expect(Tag::Block, data)?;
        let transactions = wire
            .transactions
            .iter()
            .map(|bytes| TransactionWithData::unmarshal(bytes))
            .collect::<CodecResult<Vec<_>>>()?;
        let states = wire
            .states
            .iter()
            .map(|bytes| AnyState::read(bytes))
            .collect::<CodecResult<Vec<_>>>()?;
        Ok(Self {
            hash: None,
            index: wire.index,
            parent_hash: wire.parent_hash,
            timestamp: wire.timestamp,
            transaction_root: wire.transaction_root,
            state_root: wire.state_root,
            transactions,
            states,
        })
    }

    fn raw(&self, _ignore_signing_fields: bool) -> CodecResult<Vec<u8>> {
        self.marshal()
    }
}
