//! # Transaction Hierarchy
//!
//! Three transaction kinds share one base record: the plain transfer, the
//! payment (transfer plus metering metadata), and the device registration.
//! Extended kinds embed the base by value, so base accessors are a field
//! away and the signing rule is written once.
//!
//! The signing form is the same schema with the signature cleared — it
//! decodes with the normal decoder and simply carries an empty signature.
//! That keeps "bytes that were signed" and "bytes that are stored"
//! structurally identical, which the hash-integrity tests rely on.

use serde::{Deserialize, Serialize};

use crate::block::Address;
use crate::codec::{self, Canonical, CodecError, CodecResult, Tag};
use crate::crypto::{Hash, PublicKey, Signature};

// ---------------------------------------------------------------------------
// Transaction type codes
// ---------------------------------------------------------------------------

/// Operation discriminators carried *inside* a transaction. Distinct from
/// envelope tags: these classify what a transaction does, not how it is
/// framed on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionType {
    Payment,
    NewCurrency,
    NewDevice,
}

impl TransactionType {
    /// Wire code for this operation kind.
    pub const fn code(self) -> u8 {
        match self {
            Self::Payment => 201,
            Self::NewCurrency => 202,
            Self::NewDevice => 203,
        }
    }
}

// ---------------------------------------------------------------------------
// Base transaction
// ---------------------------------------------------------------------------

/// The base transaction record, envelope tag 101.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Cached content hash. Assigned on ingestion, never serialized.
    #[serde(skip)]
    pub hash: Option<Hash>,

    pub tx_type: TransactionType,
    pub account: Address,
    pub sequence: u64,
    pub amount: i64,
    pub gas: i64,
    pub type_name: String,
    pub destination: Address,
    pub payload: Vec<u8>,
    pub public_key: PublicKey,
    pub signature: Signature,
}

impl Transaction {
    pub fn hash(&self) -> Option<Hash> {
        self.hash
    }

    pub fn set_hash(&mut self, hash: Hash) {
        self.hash = Some(hash);
    }
}

impl Canonical for Transaction {
    fn marshal(&self) -> CodecResult<Vec<u8>> {
        codec::encode(Tag::Transaction, self)
    }

    fn unmarshal(data: &[u8]) -> CodecResult<Self> {
        codec::decode_expect(Tag::Transaction, data)
    }

    fn raw(&self, ignore_signing_fields: bool) -> CodecResult<Vec<u8>> {
        if !ignore_signing_fields {
            return self.marshal();
        }
        let mut unsigned = self.clone();
        unsigned.signature = Signature::default();
        unsigned.marshal()
    }
}

// ---------------------------------------------------------------------------
// Payment
// ---------------------------------------------------------------------------

/// A payment transaction, envelope tag 104. Extends the base record with
/// point-of-sale metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub base: Transaction,
    pub timestamp: i64,
    pub device: String,
    pub tags: Vec<String>,
    pub name: String,
    pub value: String,
}

impl Canonical for Payment {
    fn marshal(&self) -> CodecResult<Vec<u8>> {
        codec::encode(Tag::Payment, self)
    }

    fn unmarshal(data: &[u8]) -> CodecResult<Self> {
        codec::decode_expect(Tag::Payment, data)
    }

    fn raw(&self, ignore_signing_fields: bool) -> CodecResult<Vec<u8>> {
        if !ignore_signing_fields {
            return self.marshal();
        }
        let mut unsigned = self.clone();
        unsigned.base.signature = Signature::default();
        unsigned.marshal()
    }
}

// ---------------------------------------------------------------------------
// NewDevice
// ---------------------------------------------------------------------------

/// A device-registration transaction, envelope tag 105.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDevice {
    pub base: Transaction,
    pub symbol: String,
    pub description: String,
    pub device_tags: Vec<String>,
}

impl Canonical for NewDevice {
    fn marshal(&self) -> CodecResult<Vec<u8>> {
        codec::encode(Tag::NewDevice, self)
    }

    fn unmarshal(data: &[u8]) -> CodecResult<Self> {
        codec::decode_expect(Tag::NewDevice, data)
    }

    fn raw(&self, ignore_signing_fields: bool) -> CodecResult<Vec<u8>> {
        if !ignore_signing_fields {
            return self.marshal();
        }
        let mut unsigned = self.clone();
        unsigned.base.signature = Signature::default();
        unsigned.marshal()
    }
}

// ---------------------------------------------------------------------------
// Closed dispatch
// ---------------------------------------------------------------------------

/// Any of the three transaction kinds, discriminated by envelope tag.
///
/// The enumeration is closed: a composite or stream that embeds a tag
/// outside 101/104/105 is a format error, not a skipped entry.
#[derive(Debug, Clone, PartialEq)]
pub enum AnyTransaction {
    Base(Transaction),
    Payment(Payment),
    NewDevice(NewDevice),
}

impl AnyTransaction {
    /// Decode any transaction kind from envelope bytes.
    pub fn read(data: &[u8]) -> CodecResult<Self> {
        match codec::peek(data)? {
            Tag::Transaction => Ok(Self::Base(Transaction::unmarshal(data)?)),
            Tag::Payment => Ok(Self::Payment(Payment::unmarshal(data)?)),
            Tag::NewDevice => Ok(Self::NewDevice(NewDevice::unmarshal(data)?)),
            other => Err(CodecError::EmbeddedVariant(other.byte())),
        }
    }

    pub fn tag(&self) -> Tag {
        match self {
            Self::Base(_) => Tag::Transaction,
            Self::Payment(_) => Tag::Payment,
            Self::NewDevice(_) => Tag::NewDevice,
        }
    }

    /// The shared base record.
    pub fn base(&self) -> &Transaction {
        match self {
            Self::Base(tx) => tx,
            Self::Payment(p) => &p.base,
            Self::NewDevice(d) => &d.base,
        }
    }

    fn base_mut(&mut self) -> &mut Transaction {
        match self {
            Self::Base(tx) => tx,
            Self::Payment(p) => &mut p.base,
            Self::NewDevice(d) => &mut d.base,
        }
    }

    pub fn hash(&self) -> Option<Hash> {
        self.base().hash
    }

    pub fn set_hash(&mut self, hash: Hash) {
        self.base_mut().hash = Some(hash);
    }

    pub fn account(&self) -> Address {
        self.base().account
    }

    pub fn destination(&self) -> Address {
        self.base().destination
    }

    pub fn sequence(&self) -> u64 {
        self.base().sequence
    }

    pub fn amount(&self) -> i64 {
        self.base().amount
    }

    pub fn gas(&self) -> i64 {
        self.base().gas
    }

    pub fn tx_type(&self) -> TransactionType {
        self.base().tx_type
    }

    pub fn type_name(&self) -> &str {
        &self.base().type_name
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.base().public_key
    }

    pub fn signature(&self) -> &Signature {
        &self.base().signature
    }

    pub fn set_signature(&mut self, signature: Signature) {
        self.base_mut().signature = signature;
    }

    pub fn set_public_key(&mut self, public_key: PublicKey) {
        self.base_mut().public_key = public_key;
    }
}

impl Canonical for AnyTransaction {
    fn marshal(&self) -> CodecResult<Vec<u8>> {
        match self {
            Self::Base(tx) => tx.marshal(),
            Self::Payment(p) => p.marshal(),
            Self::NewDevice(d) => d.marshal(),
        }
    }

    fn unmarshal(data: &[u8]) -> CodecResult<Self> {
        Self::read(data)
    }

    fn raw(&self, ignore_signing_fields: bool) -> CodecResult<Vec<u8>> {
        match self {
            Self::Base(tx) => tx.raw(ignore_signing_fields),
            Self::Payment(p) => p.raw(ignore_signing_fields),
            Self::NewDevice(d) => d.raw(ignore_signing_fields),
        }
    }
}
