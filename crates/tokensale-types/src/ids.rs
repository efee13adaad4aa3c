//! Identifiers and scalar units used throughout the tokensale engine.
//!
//! Participant and contract identities are opaque 32-byte [`Address`]es.
//! Receipts use UUIDv7 for time-ordered lexicographic sorting.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::SaleError;

/// Token quantities: quote units, sale units and payment amounts alike.
pub type Amount = u128;

/// Unix timestamp in seconds, as read from the host's clock.
pub type Timestamp = u64;

/// A duration in seconds.
pub type Seconds = u64;

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

/// Identity of a participant, an asset contract, or the sale itself.
///
/// Serialized as a `0x`-prefixed lower-case hex string. The default is
/// [`Address::ZERO`].
#[derive(
    Clone, Copy, Default, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct Address(pub [u8; 32]);

impl Address {
    /// The all-zero address.
    pub const ZERO: Self = Self([0u8; 32]);

    #[must_use]
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Deterministic address from an arbitrary label (deployment name, test actor).
    #[must_use]
    pub fn derive(label: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(b"tokensale:address:v1:");
        hasher.update(label);
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&hasher.finalize());
        Self(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Full lower-case hex form, `0x`-prefixed.
    #[must_use]
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(&self.0[..8]))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_hex())
    }
}

impl FromStr for Address {
    type Err = SaleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(digits)
            .map_err(|e| SaleError::Configuration(format!("bad address {s}: {e}")))?;
        let bytes: [u8; 32] = bytes.try_into().map_err(|_| {
            SaleError::Configuration(format!("bad address {s}: expected 32 bytes"))
        })?;
        Ok(Self(bytes))
    }
}

impl TryFrom<String> for Address {
    type Error = SaleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Address> for String {
    fn from(value: Address) -> Self {
        value.to_hex()
    }
}

// ---------------------------------------------------------------------------
// InstrumentId
// ---------------------------------------------------------------------------

/// A payment instrument: the chain's native value, or a fungible asset contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstrumentId {
    /// The reserved sentinel for native value.
    Native,
    /// A fungible asset identified by its contract address.
    Asset(Address),
}

impl InstrumentId {
    #[must_use]
    pub fn is_native(&self) -> bool {
        matches!(self, Self::Native)
    }
}

impl From<Address> for InstrumentId {
    fn from(value: Address) -> Self {
        Self::Asset(value)
    }
}

impl fmt::Display for InstrumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native => write!(f, "native"),
            Self::Asset(addr) => write!(f, "asset:{addr}"),
        }
    }
}

// ---------------------------------------------------------------------------
// ReceiptId
// ---------------------------------------------------------------------------

/// Globally unique receipt identifier. Uses UUIDv7 for time-ordered sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct ReceiptId(pub Uuid);

impl ReceiptId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for ReceiptId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ReceiptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rcpt:{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_is_deterministic() {
        assert_eq!(Address::derive(b"alice"), Address::derive(b"alice"));
        assert_ne!(Address::derive(b"alice"), Address::derive(b"bob"));
    }

    #[test]
    fn default_address_is_zero() {
        assert_eq!(Address::default(), Address::ZERO);
    }

    #[test]
    fn address_hex_parse() {
        let addr = Address::derive(b"sale");
        let parsed: Address = addr.to_hex().parse().unwrap();
        assert_eq!(addr, parsed);

        let bare: Address = hex::encode(addr.0).parse().unwrap();
        assert_eq!(addr, bare);
    }

    #[test]
    fn address_parse_rejects_wrong_length() {
        let err = "0xdeadbeef".parse::<Address>().unwrap_err();
        assert!(matches!(err, SaleError::Configuration(_)));
    }

    #[test]
    fn address_serializes_as_hex_string() {
        let addr = Address::from_bytes([0xab; 32]);
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, format!("\"0x{}\"", "ab".repeat(32)));
    }

    #[test]
    fn instrument_display() {
        assert_eq!(InstrumentId::Native.to_string(), "native");
        let asset = InstrumentId::from(Address::from_bytes([1u8; 32]));
        assert!(asset.to_string().starts_with("asset:0x0101"));
        assert!(!asset.is_native());
    }

    #[test]
    fn instrument_json_shape() {
        let json = serde_json::to_string(&InstrumentId::Native).unwrap();
        assert_eq!(json, "\"native\"");
        let back: InstrumentId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, InstrumentId::Native);
    }

    #[test]
    fn receipt_id_ordering() {
        let a = ReceiptId::new();
        let b = ReceiptId::new();
        assert!(a < b);
    }
}
