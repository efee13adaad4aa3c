//! # tokensale-types
//!
//! Shared types, errors, and configuration for the **tokensale** engine.
//!
//! This crate is the leaf dependency of the workspace. Every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`Address`], [`InstrumentId`], [`ReceiptId`], [`Amount`], [`Timestamp`]
//! - **Call context**: [`CallContext`]
//! - **Accounting**: [`AccountingRecord`]
//! - **Rounds**: [`RoundInfo`], [`SaleInfo`], [`RoundPlan`]
//! - **Vesting**: [`VestingParams`], [`VestingConfig`], [`RestartPolicy`]
//! - **Credentials**: [`Attestation`], [`CredentialPolicy`], [`SignerKey`]
//! - **Receipts**: [`PurchaseReceipt`], [`ClaimReceipt`], [`ReceiptType`]
//! - **Configuration**: [`SaleConfig`]
//! - **Errors**: [`SaleError`] with `TS_ERR_` prefix codes, [`ErrorKind`]
//! - **Checked math** (`math`) and **constants**

pub mod accounting;
pub mod attestation;
pub mod call;
pub mod config;
pub mod constants;
pub mod error;
pub mod ids;
pub mod math;
pub mod receipt;
pub mod round;
pub mod vesting;

pub use accounting::*;
pub use attestation::*;
pub use call::*;
pub use config::*;
pub use error::*;
pub use ids::*;
pub use receipt::*;
pub use round::*;
pub use vesting::*;

// Constants and math helpers are accessed via their modules
// (`tokensale_types::constants::BPM`, `tokensale_types::math::mul_div`).
