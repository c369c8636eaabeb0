//! # Ledger Entities
//!
//! The persisted entity model: addresses, the transaction hierarchy, the
//! execution receipt, the transaction+receipt composite, the three state
//! records, and the block container. Each entity implements [`Canonical`]
//! (envelope-tagged canonical bytes) and carries a lazily-cached content
//! hash that is never serialized.
//!
//! [`Canonical`]: crate::codec::Canonical

pub mod address;
pub mod block;
pub mod receipt;
pub mod state;
pub mod transaction;
pub mod with_data;

pub use address::Address;
pub use block::Block;
pub use receipt::Receipt;
pub use state::{AccountState, AnyState, CurrencyState, DeviceState};
pub use transaction::{AnyTransaction, NewDevice, Payment, Transaction, TransactionType};
pub use with_data::TransactionWithData;
