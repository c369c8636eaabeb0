//! # Canonical Envelope Codec
//!
//! Every entity this engine persists is encoded as a self-describing
//! envelope: one discriminator byte, then the bincode serialization of the
//! entity's payload. The discriminator space is a fixed, closed enumeration
//! — byte 0 uniquely determines the payload schema, and a byte outside the
//! enumeration is a format error, never a best-effort parse.
//!
//! ## Why a leading byte and not a length-prefixed type string?
//!
//! The envelope is hashed as-is for content addressing. One byte keeps the
//! canonical form minimal and makes `describe` (the diagnostic label lookup)
//! an O(1) peek that can never fail.
//!
//! ## Wire layout
//!
//! ```text
//! ┌──────┬──────────────────────────────┐
//! │ tag  │ bincode(payload)             │
//! │ (1B) │ (deterministic, no framing)  │
//! └──────┴──────────────────────────────┘
//! ```
//!
//! Bincode is the storage serializer for the same reason the rest of the
//! stack uses it: compact, fast, deterministic for these types (no maps,
//! no floats, fixed field order).

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;

use crate::block::{
    AccountState, Block, CurrencyState, DeviceState, NewDevice, Payment, Receipt, Transaction,
    TransactionWithData,
};

// ---------------------------------------------------------------------------
// Tag
// ---------------------------------------------------------------------------

/// The closed discriminator enumeration.
///
/// Values are part of the persisted format: changing one invalidates every
/// envelope ever written. Transaction-type codes (201–203) are *not* tags —
/// they discriminate operations within a transaction, not payload schemas —
/// but [`describe`] knows their labels for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Tag {
    Block = 100,
    Transaction = 101,
    Receipt = 102,
    TransactionWithData = 103,
    Payment = 104,
    NewDevice = 105,
    PaymentWithData = 106,
    NewDeviceWithData = 107,

    AccountState = 111,
    CurrencyState = 112,
    DeviceState = 113,
}

impl Tag {
    /// The wire byte for this tag.
    pub const fn byte(self) -> u8 {
        self as u8
    }

    /// Map a wire byte back to a tag. `None` for anything outside the
    /// closed enumeration.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            100 => Some(Self::Block),
            101 => Some(Self::Transaction),
            102 => Some(Self::Receipt),
            103 => Some(Self::TransactionWithData),
            104 => Some(Self::Payment),
            105 => Some(Self::NewDevice),
            106 => Some(Self::PaymentWithData),
            107 => Some(Self::NewDeviceWithData),
            111 => Some(Self::AccountState),
            112 => Some(Self::CurrencyState),
            113 => Some(Self::DeviceState),
            _ => None,
        }
    }

    /// Human label for logs and errors.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Block => "block",
            Self::Transaction => "transaction",
            Self::Receipt => "receipt",
            Self::TransactionWithData => "transaction_with_data",
            Self::Payment => "payment",
            Self::NewDevice => "new_device",
            Self::PaymentWithData => "payment_with_data",
            Self::NewDeviceWithData => "newdevice_with_data",
            Self::AccountState => "account_state",
            Self::CurrencyState => "currency_state",
            Self::DeviceState => "device_state",
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Error Type
// ---------------------------------------------------------------------------

/// Format errors. Every variant is fatal to the current operation; none is
/// ever coerced into a default value or a partial decode.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("empty or truncated envelope")]
    Truncated,

    #[error("unrecognized discriminator: {0}")]
    UnknownDiscriminator(u8),

    #[error("envelope tag mismatch: expected {expected}, found {found}")]
    UnexpectedTag { expected: Tag, found: Tag },

    #[error("composite embeds an unsupported variant: {0}")]
    EmbeddedVariant(u8),

    #[error("malformed address: expected {expected} bytes, got {got}")]
    AddressLength { expected: usize, got: usize },

    #[error("malformed hash: expected {expected} bytes, got {got}")]
    HashLength { expected: usize, got: usize },

    #[error("payload encoding: {0}")]
    Payload(#[from] bincode::Error),

    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),
}

pub type CodecResult<T> = Result<T, CodecError>;

// ---------------------------------------------------------------------------
// Envelope primitives
// ---------------------------------------------------------------------------

/// Serialize a payload and prepend its tag: `[tag] ++ bincode(payload)`.
pub fn encode<T: Serialize>(tag: Tag, payload: &T) -> CodecResult<Vec<u8>> {
    let body = bincode::serialize(payload)?;
    let mut out = Vec::with_capacity(1 + body.len());
    out.push(tag.byte());
    out.extend_from_slice(&body);
    Ok(out)
}

/// Read the leading tag without touching the payload.
pub fn peek(data: &[u8]) -> CodecResult<Tag> {
    let meta = *data.first().ok_or(CodecError::Truncated)?;
    Tag::from_byte(meta).ok_or(CodecError::UnknownDiscriminator(meta))
}

/// Decode a payload whose envelope must carry exactly `expected`.
pub fn decode_expect<T: DeserializeOwned>(expected: Tag, data: &[u8]) -> CodecResult<T> {
    let found = peek(data)?;
    if found != expected {
        return Err(CodecError::UnexpectedTag { expected, found });
    }
    Ok(bincode::deserialize(&data[1..])?)
}

/// Human label for an encoded envelope's leading byte.
///
/// Recognizes the entity tags and the transaction-type codes; anything else
/// is `"unknown"`, and empty input is `""`. Never fails — this is the one
/// codec operation that must stay usable on corrupt data.
pub fn describe(data: &[u8]) -> &'static str {
    let Some(&meta) = data.first() else {
        return "";
    };
    match Tag::from_byte(meta) {
        Some(tag) => tag.label(),
        None => match meta {
            201 => "payment_type",
            202 => "new_currency_type",
            203 => "new_device_type",
            _ => "unknown",
        },
    }
}

// ---------------------------------------------------------------------------
// Canonical projection contract
// ---------------------------------------------------------------------------

/// The canonical-projection contract every persisted entity implements.
///
/// `marshal` produces the full envelope-tagged canonical bytes, signature
/// included. `raw(true)` produces the signing form: the identical schema
/// with the signature cleared, so the signing form decodes with the normal
/// decoder and simply carries an empty signature. For entities without
/// signing fields, `raw` is `marshal` under both flags.
pub trait Canonical: Sized {
    /// Full canonical bytes, envelope-tagged.
    fn marshal(&self) -> CodecResult<Vec<u8>>;

    /// Decode from envelope-tagged bytes. A tag that does not match the
    /// expected variant is a format error.
    fn unmarshal(data: &[u8]) -> CodecResult<Self>;

    /// Canonical bytes with or without signing fields.
    fn raw(&self, ignore_signing_fields: bool) -> CodecResult<Vec<u8>>;
}

// ---------------------------------------------------------------------------
// Entity dispatcher
// ---------------------------------------------------------------------------

/// Any decodable entity, discriminated by its envelope tag.
///
/// The three with-data tags all decode into [`TransactionWithData`] — it is
/// a single composite type whose embedded variant is recovered from the
/// inner transaction's own envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    Block(Block),
    Transaction(Transaction),
    Payment(Payment),
    NewDevice(NewDevice),
    Receipt(Receipt),
    WithData(TransactionWithData),
    AccountState(AccountState),
    CurrencyState(CurrencyState),
    DeviceState(DeviceState),
}

/// Decode any supported envelope, dispatching on the leading byte.
pub fn decode(data: &[u8]) -> CodecResult<(Tag, Entity)> {
    let tag = peek(data)?;
    let entity = match tag {
        Tag::Block => Entity::Block(Block::unmarshal(data)?),
        Tag::Transaction => Entity::Transaction(Transaction::unmarshal(data)?),
        Tag::Payment => Entity::Payment(Payment::unmarshal(data)?),
        Tag::NewDevice => Entity::NewDevice(NewDevice::unmarshal(data)?),
        Tag::Receipt => Entity::Receipt(Receipt::unmarshal(data)?),
        Tag::TransactionWithData | Tag::PaymentWithData | Tag::NewDeviceWithData => {
            Entity::WithData(TransactionWithData::unmarshal(data)?)
        }
        Tag::AccountState => Entity::AccountState(AccountState::unmarshal(data)?),
        Tag::CurrencyState => Entity::CurrencyState(CurrencyState::unmarshal(data)?),
        Tag::DeviceState => Entity::DeviceState(DeviceState::unmarshal(data)?),
    };
    Ok((tag, entity))
}

/// Encode any supported entity back into its envelope.
pub fn encode_entity(entity: &Entity) -> CodecResult<Vec<u8>> {
    match entity {
        Entity::Block(e) => e.marshal(),
        Entity::Transaction(e) => e.marshal(),
        Entity::Payment(e) => e.marshal(),
        Entity::NewDevice(e) => e.marshal(),
        Entity::Receipt(e) => e.marshal(),
        Entity::WithData(e) => e.marshal(),
        Entity::AccountState(e) => e.marshal(),
        Entity::CurrencyState(e) => e.marshal(),
        Entity::DeviceState(e) => e.marshal(),
    }
}

/// Clone via encode-then-decode. Exact for every supported kind: the result
/// compares equal to the input, which is what the round-trip tests pin down.
pub fn clone_entity(entity: &Entity) -> CodecResult<Entity> {
    let data = encode_entity(entity)?;
    let (_, cloned) = decode(&data)?;
    Ok(cloned)
}
