//! # Transaction + Receipt Composite
//!
//! The unit of block membership: one transaction paired with its execution
//! receipt. One composite type covers all three transaction kinds — the
//! envelope tag (103/106/107) is derived from the embedded transaction's
//! own tag at encode time and checked for consistency at decode time, so
//! the pairing can never drift.
//!
//! Decoding is strict end to end: a malformed embedded transaction or
//! receipt fails the whole composite. Nothing is ever replaced by a
//! default value.

use serde::{Deserialize, Serialize};

use crate::block::{AnyTransaction, Receipt};
use crate::codec::{self, Canonical, CodecError, CodecResult, Tag};
use crate::crypto::Hash;

/// Serialized layout: the envelope bytes of each half, nested inside the
/// composite envelope. Keeping the halves as envelopes preserves their tags,
/// which is what makes tag re-derivation checkable on decode.
#[derive(Serialize, Deserialize)]
struct WithDataWire {
    transaction: Vec<u8>,
    receipt: Vec<u8>,
}

/// A transaction paired with its receipt.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionWithData {
    pub hash: Option<Hash>,
    pub transaction: AnyTransaction,
    pub receipt: Receipt,
}

/// Map an embedded transaction tag to its composite tag.
fn composite_tag(inner: Tag) -> CodecResult<Tag> {
    match inner {
        Tag::Transaction => Ok(Tag::TransactionWithData),
        Tag::Payment => Ok(Tag::PaymentWithData),
        Tag::NewDevice => Ok(Tag::NewDeviceWithData),
        other => Err(CodecError::EmbeddedVariant(other.byte())),
    }
}

/// The inverse: which transaction tag a composite tag promises.
fn embedded_tag(composite: Tag) -> CodecResult<Tag> {
    match composite {
        Tag::TransactionWithData => Ok(Tag::Transaction),
        Tag::PaymentWithData => Ok(Tag::Payment),
        Tag::NewDeviceWithData => Ok(Tag::NewDevice),
        other => Err(CodecError::EmbeddedVariant(other.byte())),
    }
}

impl TransactionWithData {
    pub fn new(transaction: AnyTransaction, receipt: Receipt) -> Self {
        Self {
            hash: None,
            transaction,
            receipt,
        }
    }

    pub fn hash(&self) -> Option<Hash> {
        self.hash
    }

    pub fn set_hash(&mut self, hash: Hash) {
        self.hash = Some(hash);
    }

    /// The composite envelope tag this value encodes under.
    pub fn tag(&self) -> Tag {
        match self.transaction.tag() {
            Tag::Transaction => Tag::TransactionWithData,
            Tag::Payment => Tag::PaymentWithData,
            // `AnyTransaction` has exactly three variants.
            _ => Tag::NewDeviceWithData,
        }
    }

    fn encode_forms(&self, ignore_signing_fields: bool) -> CodecResult<Vec<u8>> {
        let tag = composite_tag(self.transaction.tag())?;
        let wire = WithDataWire {
            transaction: self.transaction.raw(ignore_signing_fields)?,
            receipt: self.receipt.marshal()?,
        };
        codec::encode(tag, &wire)
    }
}

impl Canonical for TransactionWithData {
    fn marshal(&self) -> CodecResult<Vec<u8>> {
        self.encode_forms(false)
    }

    fn unmarshal(data: &[u8]) -> CodecResult<Self> {
        let found = codec::peek(data)?;
        let promised = embedded_tag(found)?;
        let wire: WithDataWire = bincode::deserialize(&data[1..])?;

        let transaction = AnyTransaction::read(&wire.transaction)?;
        if transaction.tag() != promised {
            // Outer tag and embedded tag disagree: corrupt composite.
            return Err(CodecError::UnexpectedTag {
                expected: promised,
                found: transaction.tag(),
            });
        }
        let receipt = Receipt::unmarshal(&wire.receipt)?;

        Ok(Self {
            hash: None,
            transaction,
            receipt,
        })
    }

    fn raw(&self, ignore_signing_fields: bool) -> CodecResult<Vec<u8>> {
        self.encode_forms(ignore_signing_fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::transaction::tests::{sample_base, sample_new_device, sample_payment};

    fn sample_receipt() -> Receipt {
        Receipt {
            transaction_index: 0,
            transaction_result: 0,
            gas_used: 12,
        }
    }

    #[test]
    fn composite_tag_follows_embedded_kind() {
        let base = TransactionWithData::new(AnyTransaction::Base(sample_base()), sample_receipt());
        let payment =
            TransactionWithData::new(AnyTransaction::Payment(sample_payment()), sample_receipt());
        let device = TransactionWithData::new(
            AnyTransaction::NewDevice(sample_new_device()),
            sample_receipt(),
        );

        assert_eq!(base.marshal().unwrap()[0], Tag::TransactionWithData.byte());
        assert_eq!(payment.marshal().unwrap()[0], Tag::PaymentWithData.byte());
        assert_eq!(device.marshal().unwrap()[0], Tag::NewDeviceWithData.byte());
    }

    #[test]
    fn roundtrip_all_variants() {
        for txd in [
            TransactionWithData::new(AnyTransaction::Base(sample_base()), sample_receipt()),
            TransactionWithData::new(AnyTransaction::Payment(sample_payment()), sample_receipt()),
            TransactionWithData::new(
                AnyTransaction::NewDevice(sample_new_device()),
                sample_receipt(),
            ),
        ] {
            let decoded = TransactionWithData::unmarshal(&txd.marshal().unwrap()).unwrap();
            assert_eq!(txd, decoded);
        }
    }

    #[test]
    fn signing_form_clears_embedded_signature_only() {
        let txd =
            TransactionWithData::new(AnyTransaction::Payment(sample_payment()), sample_receipt());
        let decoded = TransactionWithData::unmarshal(&txd.raw(true).unwrap()).unwrap();
        assert!(decoded.transaction.signature().0.is_empty());
        assert_eq!(decoded.receipt, txd.receipt);
    }

    #[test]
    fn mismatched_embed_is_rejected() {
        // Encode a payment composite, then claim it's a plain one.
        let txd =
            TransactionWithData::new(AnyTransaction::Payment(sample_payment()), sample_receipt());
        let mut data = txd.marshal().unwrap();
        data[0] = Tag::TransactionWithData.byte();
        let err = TransactionWithData::unmarshal(&data).unwrap_err();
        assert!(matches!(
            err,
            CodecError::UnexpectedTag {
                expected: Tag::Transaction,
                found: Tag::Payment,
            }
        ));
    }

    #[test]
    fn corrupt_embedded_receipt_fails_the_composite() {
        let txd = TransactionWithData::new(AnyTransaction::Base(sample_base()), sample_receipt());
        let wire = WithDataWire {
            transaction: txd.transaction.marshal().unwrap(),
            receipt: vec![0xFF, 1, 2],
        };
        let data = codec::encode(Tag::TransactionWithData, &wire).unwrap();
        assert!(TransactionWithData::unmarshal(&data).is_err());
    }

    #[test]
    fn non_composite_tag_is_rejected() {
        let data = sample_base().marshal().unwrap();
        let err = TransactionWithData::unmarshal(&data).unwrap_err();
        assert!(matches!(err, CodecError::EmbeddedVariant(101)));
    }
}
