//! System-wide constants for the tokensale engine.

use crate::{Amount, Seconds};

/// Basis-points denominator. Rates are expressed as `rate / BPM`.
pub const BPM: Amount = 10_000;

/// Seconds in one day.
pub const SECONDS_PER_DAY: Seconds = 24 * 60 * 60;

/// Default native-value multiplier (100 quote units per native unit).
pub const DEFAULT_NATIVE_RATE_BPS: u64 = 100;

/// Default vesting round length.
pub const DEFAULT_ROUND_DURATION: Seconds = SECONDS_PER_DAY;

/// Default dead period between vesting start and round-based unlocking.
pub const DEFAULT_MARGIN_DURATION: Seconds = 2 * SECONDS_PER_DAY;

/// Default number of vesting unlock rounds.
pub const DEFAULT_VESTING_ROUNDS: u64 = 10;

/// Default number of sale rounds for a multi-round sale.
pub const DEFAULT_SALE_ROUNDS: usize = 10;

/// Domain prefix for attestation signatures.
pub const ATTESTATION_DOMAIN: &[u8] = b"tokensale:attestation:v1:";

/// Domain prefix for receipt digests.
pub const RECEIPT_DOMAIN: &[u8] = b"tokensale:receipt:v1:";

/// Default KYC level asserted by attestations.
pub const DEFAULT_KYC_LEVEL: &str = "plus";

/// Jurisdictions excluded by default, ISO 3166-1 alpha-2.
pub const DEFAULT_EXCLUDED_JURISDICTIONS: [&str; 6] = ["US", "CU", "IR", "KP", "SD", "SY"];

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "tokensale";
