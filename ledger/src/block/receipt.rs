//! Execution receipts.

use serde::{Deserialize, Serialize};

use crate::codec::{self, Canonical, CodecResult, Tag};

/// The outcome of executing one transaction, envelope tag 102.
///
/// Receipts are opaque to the engine and never individually addressed —
/// the composite that embeds one carries the content hash. They have no
/// signing fields either, so the signing form is identical to the full
/// form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Receipt {
    /// Position of the transaction within its block.
    pub transaction_index: u64,
    /// Execution result code. Zero is success.
    pub transaction_result: u32,
    pub gas_used: i64,
}

impl Canonical for Receipt {
    fn marshal(&self) -> CodecResult<Vec<u8>> {
        codec::encode(Tag::Receipt, self)
    }

    fn unmarshal(data: &[u8]) -> CodecResult<Self> {
        codec::decode_expect(Tag::Receipt, data)
    }

    fn raw(&self, _ignore_signing_fields: bool) -> CodecResult<Vec<u8>> {
        self.marshal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let receipt = Receipt {
            transaction_index: 4,
            transaction_result: 0,
            gas_used: 21_000,
        };
        let decoded = Receipt::unmarshal(&receipt.marshal().unwrap()).unwrap();
        assert_eq!(receipt, decoded);
    }

    #[test]
    fn raw_is_marshal_under_both_flags() {
        let receipt = Receipt::default();
        assert_eq!(receipt.raw(true).unwrap(), receipt.marshal().unwrap());
        assert_eq!(receipt.raw(false).unwrap(), receipt.marshal().unwrap());
    }
}
