//! # State Records
//!
//! Three kinds of world-state snapshot: account balances, currency
//! definitions, device registrations. Each carries a version counter
//! (`index`) and a natural key — the account address in hex for accounts,
//! the symbol for currencies and devices. The version and the key drive
//! the secondary index layout in the storage service; the records
//! themselves know nothing about storage.

use serde::{Deserialize, Serialize};

use crate::block::Address;
use crate::codec::{self, Canonical, CodecError, CodecResult, Tag};
use crate::crypto::Hash;

// ---------------------------------------------------------------------------
// AccountState
// ---------------------------------------------------------------------------

/// Balance and sequence snapshot for one account, envelope tag 111.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AccountState {
    #[serde(skip)]
    pub hash: Option<Hash>,

    /// Version counter, incremented on every update.
    pub index: u64,
    pub account: Address,
    pub sequence: u64,
    pub amount: i64,
}

impl Canonical for AccountState {
    fn marshal(&self) -> CodecResult<Vec<u8>> {
        codec::encode(Tag::AccountState, self)
    }

    fn unmarshal(data: &[u8]) -> CodecResult<Self> {
        codec::decode_expect(Tag::AccountState, data)
    }

    fn raw(&self, _ignore_signing_fields: bool) -> CodecResult<Vec<u8>> {
        self.marshal()
    }
}

// ---------------------------------------------------------------------------
// CurrencyState
// ---------------------------------------------------------------------------

/// A currency definition, envelope tag 112. Keyed by symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CurrencyState {
    #[serde(skip)]
    pub hash: Option<Hash>,

    pub index: u64,
    pub account: Address,
    pub symbol: String,
    pub decimals: u32,
    pub total_supply: i64,
}

impl Canonical for CurrencyState {
    fn marshal(&self) -> CodecResult<Vec<u8>> {
        codec::encode(Tag::CurrencyState, self)
    }

    fn unmarshal(data: &[u8]) -> CodecResult<Self> {
        codec::decode_expect(Tag::CurrencyState, data)
    }

    fn raw(&self, _ignore_signing_fields: bool) -> CodecResult<Vec<u8>> {
        self.marshal()
    }
}

// ---------------------------------------------------------------------------
// DeviceState
// ---------------------------------------------------------------------------

/// A registered device, envelope tag 113. Keyed by symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DeviceState {
    #[serde(skip)]
    pub hash: Option<Hash>,

    pub index: u64,
    pub account: Address,
    pub symbol: String,
    pub description: String,
    pub tags: Vec<String>,
}

impl Canonical for DeviceState {
    fn marshal(&self) -> CodecResult<Vec<u8>> {
        codec::encode(Tag::DeviceState, self)
    }

    fn unmarshal(data: &[u8]) -> CodecResult<Self> {
        codec::decode_expect(Tag::DeviceState, data)
    }

    fn raw(&self, _ignore_signing_fields: bool) -> CodecResult<Vec<u8>> {
        self.marshal()
    }
}

// ---------------------------------------------------------------------------
// Closed dispatch
// ---------------------------------------------------------------------------

/// Any of the three state kinds, discriminated by envelope tag.
#[derive(Debug, Clone, PartialEq)]
pub enum AnyState {
    Account(AccountState),
    Currency(CurrencyState),
    Device(DeviceState),
}

impl AnyState {
    /// Decode any state kind from envelope bytes.
    pub fn read(data: &[u8]) -> CodecResult<Self> {
        match codec::peek(data)? {
            Tag::AccountState => Ok(Self::Account(AccountState::unmarshal(data)?)),
            Tag::CurrencyState => Ok(Self::Currency(CurrencyState::unmarshal(data)?)),
            Tag::DeviceState => Ok(Self::Device(DeviceState::unmarshal(data)?)),
            other => Err(CodecError::EmbeddedVariant(other.byte())),
        }
    }

    pub fn tag(&self) -> Tag {
        match self {
            Self::Account(_) => Tag::AccountState,
            Self::Currency(_) => Tag::CurrencyState,
            Self::Device(_) => Tag::DeviceState,
        }
    }

    /// The natural lookup key: account hex for accounts, symbol otherwise.
    pub fn state_key(&self) -> String {
        match self {
            Self::Account(s) => s.account.to_hex(),
            Self::Currency(s) => s.symbol.clone(),
            Self::Device(s) => s.symbol.clone(),
        }
    }

    /// The version counter.
    pub fn version(&self) -> u64 {
        match self {
            Self::Account(s) => s.index,
            Self::Currency(s) => s.index,
            Self::Device(s) => s.index,
        }
    }

    pub fn hash(&self) -> Option<Hash> {
        match self {
            Self::Account(s) => s.hash,
            Self::Currency(s) => s.hash,
            Self::Device(s) => s.hash,
        }
    }

    pub fn set_hash(&mut self, hash: Hash) {
        match self {
            Self::Account(s) => s.hash = Some(hash),
            Self::Currency(s) => s.hash = Some(hash),
            Self::Device(s) => s.hash = Some(hash),
        }
    }
}

impl Canonical for AnyState {
    fn marshal(&self) -> CodecResult<Vec<u8>> {
        match self {
            Self::Account(s) => s.marshal(),
            Self::Currency(s) => s.marshal(),
            Self::Device(s) => s.marshal(),
        }
    }

    fn unmarshal(data: &[u8]) -> CodecResult<Self> {
        Self::read(data)
    }

    fn raw(&self, _ignore_signing_fields: bool) -> CodecResult<Vec<u8>> {
        self.marshal()
    }
}
