//! Receipts for the tokensale audit trail.
//!
//! Every successful purchase and claim returns a receipt. The
//! [`digest`](PurchaseReceipt::digest) commits to every economic field so
//! hosts can log or anchor it without re-serializing.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{Address, Amount, InstrumentId, ReceiptId, Timestamp, constants};

/// Which action a receipt proves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReceiptType {
    /// Sale units were credited for a payment.
    Purchase,
    /// Vested sale units were paid out.
    Claim,
}

impl ReceiptType {
    fn tag(self) -> &'static [u8] {
        match self {
            Self::Purchase => b"purchase",
            Self::Claim => b"claim",
        }
    }
}

impl std::fmt::Display for ReceiptType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Purchase => write!(f, "PURCHASE"),
            Self::Claim => write!(f, "CLAIM"),
        }
    }
}

/// Proof that a purchase was committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseReceipt {
    pub receipt_id: ReceiptId,
    /// The participant credited with the purchase.
    pub buyer: Address,
    /// Payment instrument.
    pub instrument: InstrumentId,
    /// Payment amount in the instrument's units.
    pub paid: Amount,
    /// Sale units credited.
    pub quoted: Amount,
    /// Round the purchase was booked against.
    pub round: usize,
    /// Whether this purchase sold out the final round and started vesting.
    pub vesting_started: bool,
    pub issued_at: Timestamp,
}

impl PurchaseReceipt {
    /// SHA-256 over the receipt's economic fields.
    #[must_use]
    pub fn digest(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(constants::RECEIPT_DOMAIN);
        hasher.update(ReceiptType::Purchase.tag());
        hasher.update(self.receipt_id.0.as_bytes());
        hasher.update(self.buyer.as_bytes());
        match self.instrument {
            InstrumentId::Native => hasher.update([0u8]),
            InstrumentId::Asset(addr) => {
                hasher.update([1u8]);
                hasher.update(addr.as_bytes());
            }
        }
        hasher.update(self.paid.to_le_bytes());
        hasher.update(self.quoted.to_le_bytes());
        hasher.update((self.round as u64).to_le_bytes());
        hasher.update([u8::from(self.vesting_started)]);
        hasher.update(self.issued_at.to_le_bytes());
        finish(hasher)
    }
}

/// Proof that a claim was paid out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimReceipt {
    pub receipt_id: ReceiptId,
    /// Participant whose entitlement was debited.
    pub recipient: Address,
    /// The caller that presented the credential.
    pub claimant: Address,
    /// Sale units paid out.
    pub amount: Amount,
    /// Recipient's claimed total after this claim.
    pub claimed_total: Amount,
    pub issued_at: Timestamp,
}

impl ClaimReceipt {
    /// SHA-256 over the receipt's economic fields.
    #[must_use]
    pub fn digest(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(constants::RECEIPT_DOMAIN);
        hasher.update(ReceiptType::Claim.tag());
        hasher.update(self.receipt_id.0.as_bytes());
        hasher.update(self.recipient.as_bytes());
        hasher.update(self.claimant.as_bytes());
        hasher.update(self.amount.to_le_bytes());
        hasher.update(self.claimed_total.to_le_bytes());
        hasher.update(self.issued_at.to_le_bytes());
        finish(hasher)
    }
}

fn finish(hasher: Sha256) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&hasher.finalize());
    out
}
