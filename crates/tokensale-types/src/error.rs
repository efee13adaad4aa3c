//! Error types for the tokensale engine.
//!
//! All errors use the `TS_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Authority errors
//! - 2xx: Lifecycle / state errors
//! - 3xx: Configuration errors
//! - 4xx: Capacity errors (supply, claimable, attached value)
//! - 5xx: Credential errors
//! - 6xx: Asset transfer errors
//! - 9xx: General / internal errors

use std::fmt;

use thiserror::Error;

use crate::{Address, Amount, InstrumentId};

/// Caller-facing classification of a failure.
///
/// Every [`SaleError`] maps onto exactly one kind. Callers decide whether
/// and how to resubmit based on the kind, never on the message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The caller lacks the required authority.
    Unauthorized,
    /// The sale is in the wrong lifecycle state for this call.
    InvalidState,
    /// A configuration value was rejected.
    InvalidConfig,
    /// The request exceeds remaining supply, claimable entitlement or attached value.
    CapacityExceeded,
    /// Credential verification failed.
    AuthorizationFailed,
    /// The external asset ledger refused a transfer.
    AssetTransfer,
    /// Overflow, I/O or serialization failure.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unauthorized => write!(f, "UNAUTHORIZED"),
            Self::InvalidState => write!(f, "INVALID_STATE"),
            Self::InvalidConfig => write!(f, "INVALID_CONFIG"),
            Self::CapacityExceeded => write!(f, "CAPACITY_EXCEEDED"),
            Self::AuthorizationFailed => write!(f, "AUTHORIZATION_FAILED"),
            Self::AssetTransfer => write!(f, "ASSET_TRANSFER"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// Central error enum for all tokensale operations.
#[derive(Debug, Error)]
pub enum SaleError {
    // =================================================================
    // Authority Errors (1xx)
    // =================================================================
    /// The caller is not the sale's owner.
    #[error("TS_ERR_100: Unauthorized caller: {caller}")]
    Unauthorized { caller: Address },

    // =================================================================
    // State Errors (2xx)
    // =================================================================
    /// The sale has not been initialized yet.
    #[error("TS_ERR_200: Sale not initialized")]
    NotInitialized,

    /// `initialize` was already called on this instance.
    #[error("TS_ERR_201: Sale already initialized")]
    AlreadyInitialized,

    /// The sale is paused; purchases and claims are blocked.
    #[error("TS_ERR_202: Sale is paused")]
    Paused,

    /// `unpause` was called on a running sale.
    #[error("TS_ERR_203: Sale is not paused")]
    NotPaused,

    /// Vesting has started: purchases are closed and the schedule is frozen.
    #[error("TS_ERR_204: Vesting has started")]
    VestingStarted,

    /// `start_vesting` called again under the reject restart policy.
    #[error("TS_ERR_205: Vesting already started")]
    VestingAlreadyStarted,

    /// Every round is sold out.
    #[error("TS_ERR_206: All sale rounds are exhausted")]
    RoundsExhausted,

    // =================================================================
    // Configuration Errors (3xx)
    // =================================================================
    /// A rate, duration or count that must be positive was zero.
    #[error("TS_ERR_300: {field} must be positive")]
    OnlyPositive { field: &'static str },

    /// The new supply would strand entitlement that was already sold.
    #[error("TS_ERR_301: Bad supply {supply}: already raised {raised}")]
    BadSupply { supply: Amount, raised: Amount },

    /// Round index out of range, or behind the cursor and already closed.
    #[error("TS_ERR_302: Incorrect round {index}: sale has {rounds} rounds")]
    IncorrectRound { index: usize, rounds: usize },

    /// Bulk round configuration with mismatched lengths.
    #[error("TS_ERR_303: Round plan mismatch: {supplies} supplies, {rates} rates, {rounds} rounds")]
    RoundPlanMismatch {
        supplies: usize,
        rates: usize,
        rounds: usize,
    },

    /// The instrument is already accepted.
    #[error("TS_ERR_304: Instrument already enabled: {0}")]
    AlreadyEnabled(InstrumentId),

    /// The instrument is not accepted.
    #[error("TS_ERR_305: Instrument already disabled: {0}")]
    AlreadyDisabled(InstrumentId),

    /// Claims need a sale asset to pay out.
    #[error("TS_ERR_306: Sale asset not set")]
    SaleAssetNotSet,

    /// The trusted signer bytes are not a valid ed25519 public key.
    #[error("TS_ERR_307: Invalid signer key")]
    InvalidSignerKey,

    // =================================================================
    // Capacity Errors (4xx)
    // =================================================================
    /// Payment with an instrument that is not in the accepted set.
    #[error("TS_ERR_400: Instrument not accepted: {0}")]
    BadInstrument(InstrumentId),

    /// The purchase would push the round past its supply.
    #[error("TS_ERR_401: Exceeds supply: requested {requested}, remaining {remaining}")]
    ExceedsSupply { requested: Amount, remaining: Amount },

    /// The claim is larger than the vested, unclaimed entitlement.
    #[error("TS_ERR_402: Exceeds claimable: requested {requested}, claimable {claimable}")]
    ExceedsClaimable { requested: Amount, claimable: Amount },

    /// The attached native value does not cover the purchase.
    #[error("TS_ERR_403: Insufficient amount: needed {needed}, sent {sent}")]
    InsufficientAmount { needed: Amount, sent: Amount },

    /// The purchase quotes to zero sale units.
    #[error("TS_ERR_404: Purchase quotes to zero")]
    ZeroPurchase,

    /// The reserve does not cover outstanding entitlement.
    #[error("TS_ERR_405: Reserve shortfall: outstanding {outstanding}, reserve {reserve}")]
    ReserveShortfall { outstanding: Amount, reserve: Amount },

    // =================================================================
    // Credential Errors (5xx)
    // =================================================================
    /// The attestation is missing, expired, or not signed by the trusted signer.
    #[error("TS_ERR_500: Not verified")]
    NotVerified,

    // =================================================================
    // Asset Errors (6xx)
    // =================================================================
    /// The holder's balance is too small for the transfer.
    #[error("TS_ERR_600: Insufficient balance of {asset}: need {needed}, have {available}")]
    InsufficientBalance {
        asset: InstrumentId,
        needed: Amount,
        available: Amount,
    },

    /// The spender's allowance is too small for the pull.
    #[error("TS_ERR_601: Insufficient allowance of {asset}: need {needed}, have {available}")]
    InsufficientAllowance {
        asset: InstrumentId,
        needed: Amount,
        available: Amount,
    },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Checked arithmetic overflowed.
    #[error("TS_ERR_900: Arithmetic overflow")]
    ArithmeticOverflow,

    /// Unrecoverable internal error.
    #[error("TS_ERR_901: Internal error: {0}")]
    Internal(String),

    /// Serialization / deserialization error.
    #[error("TS_ERR_902: Serialization error: {0}")]
    Serialization(String),

    /// Configuration error (invalid config file, missing fields, etc.).
    #[error("TS_ERR_903: Configuration error: {0}")]
    Configuration(String),

    /// I/O error.
    #[error("TS_ERR_904: I/O error: {0}")]
    Io(String),
}

impl SaleError {
    /// Classify this error for the caller.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::NotInitialized
            | Self::AlreadyInitialized
            | Self::Paused
            | Self::NotPaused
            | Self::VestingStarted
            | Self::VestingAlreadyStarted
            | Self::RoundsExhausted => ErrorKind::InvalidState,
            Self::OnlyPositive { .. }
            | Self::BadSupply { .. }
            | Self::IncorrectRound { .. }
            | Self::RoundPlanMismatch { .. }
            | Self::AlreadyEnabled(_)
            | Self::AlreadyDisabled(_)
            | Self::SaleAssetNotSet
            | Self::InvalidSignerKey
            | Self::BadInstrument(_)
            | Self::Configuration(_) => ErrorKind::InvalidConfig,
            Self::ExceedsSupply { .. }
            | Self::ExceedsClaimable { .. }
            | Self::InsufficientAmount { .. }
            | Self::ZeroPurchase
            | Self::ReserveShortfall { .. } => ErrorKind::CapacityExceeded,
            Self::NotVerified => ErrorKind::AuthorizationFailed,
            Self::InsufficientBalance { .. } | Self::InsufficientAllowance { .. } => {
                ErrorKind::AssetTransfer
            }
            Self::ArithmeticOverflow
            | Self::Internal(_)
            | Self::Serialization(_)
            | Self::Io(_) => ErrorKind::Internal,
        }
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, SaleError>;

impl From<std::io::Error> for SaleError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for SaleError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_contains_prefix() {
        let err = SaleError::Unauthorized {
            caller: Address::from_bytes([7u8; 32]),
        };
        let msg = format!("{err}");
        assert!(msg.starts_with("TS_ERR_100"), "Got: {msg}");
    }

    #[test]
    fn exceeds_supply_display() {
        let err = SaleError::ExceedsSupply {
            requested: 100,
            remaining: 50,
        };
        let msg = format!("{err}");
        assert!(msg.contains("TS_ERR_401"));
        assert!(msg.contains("100"));
        assert!(msg.contains("50"));
    }

    #[test]
    fn instrument_errors_name_the_instrument() {
        let msg = format!("{}", SaleError::AlreadyEnabled(InstrumentId::Native));
        assert!(msg.contains("TS_ERR_304"));
        assert!(msg.contains("native"));
    }

    #[test]
    fn kinds_follow_taxonomy() {
        assert_eq!(
            SaleError::Unauthorized {
                caller: Address::ZERO
            }
            .kind(),
            ErrorKind::Unauthorized
        );
        assert_eq!(SaleError::Paused.kind(), ErrorKind::InvalidState);
        assert_eq!(SaleError::VestingStarted.kind(), ErrorKind::InvalidState);
        assert_eq!(
            SaleError::BadSupply {
                supply: 1,
                raised: 2
            }
            .kind(),
            ErrorKind::InvalidConfig
        );
        assert_eq!(
            SaleError::ExceedsClaimable {
                requested: 2,
                claimable: 1
            }
            .kind(),
            ErrorKind::CapacityExceeded
        );
        assert_eq!(SaleError::NotVerified.kind(), ErrorKind::AuthorizationFailed);
        assert_eq!(SaleError::ArithmeticOverflow.kind(), ErrorKind::Internal);
    }

    #[test]
    fn all_errors_have_ts_err_prefix() {
        let errors: Vec<Box<dyn std::error::Error>> = vec![
            Box::new(SaleError::NotInitialized),
            Box::new(SaleError::RoundsExhausted),
            Box::new(SaleError::OnlyPositive { field: "rate" }),
            Box::new(SaleError::NotVerified),
            Box::new(SaleError::Internal("test".into())),
            Box::new(SaleError::RoundPlanMismatch {
                supplies: 1,
                rates: 2,
                rounds: 3,
            }),
        ];
        for err in errors {
            let msg = format!("{err}");
            assert!(
                msg.starts_with("TS_ERR_"),
                "Error missing TS_ERR_ prefix: {msg}"
            );
        }
    }

    #[test]
    fn serde_error_converts() {
        let err: SaleError = serde_json::from_str::<u64>("nope").unwrap_err().into();
        assert!(matches!(err, SaleError::Serialization(_)));
    }
}
