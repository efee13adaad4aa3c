//! # tokensale-facade
//!
//! **The composed token sale: one entry point over ledger and policies.**
//!
//! ```text
//!  buy ──► quote ──► round capacity ──► books ──► payment ──► (auto-start vesting)
//!  claim ─► gate ──► vested − claimed ─► books ──► payout
//! ```
//!
//! - **Facade**: [`SaleFacade`] plus the ready-made compositions
//!   [`VestingSale`], [`MultiRoundSale`] and [`BaseSale`]
//! - **Claim gates**: [`ClaimGate`] with [`CredentialGate`] and [`OpenGate`]
//! - **Status**: [`SaleStatus`] and [`SalePhase`]
//! - **Concurrency**: [`SharedSale`] serializes calls from several threads
//!
//! ## Example
//!
//! ```
//! use tokensale_facade::BaseSale;
//! use tokensale_ledger::{AssetLedger, InMemoryAssets};
//! use tokensale_types::{Address, CallContext, InstrumentId, RoundPlan, SaleConfig};
//!
//! let owner = Address::derive(b"owner");
//! let alice = Address::derive(b"alice");
//! let mut sale = BaseSale::base(Address::derive(b"sale"), InMemoryAssets::new());
//! sale.initialize(
//!     &CallContext::at(owner, 0),
//!     SaleConfig {
//!         accepted_instruments: vec![InstrumentId::Native],
//!         rounds: Some(RoundPlan::uniform(1, 10_000_000, 200_000)),
//!         ..SaleConfig::default()
//!     },
//! )?;
//! sale.assets_mut().mint(&InstrumentId::Native, &alice, 1_000)?;
//!
//! let ctx = CallContext::at(alice, 0).with_value(1_000);
//! let receipt = sale.buy(&ctx, InstrumentId::Native, alice, 1_000)?;
//! assert_eq!(receipt.quoted, 2_000_000);
//! # Ok::<(), tokensale_types::SaleError>(())
//! ```

pub mod credential;
pub mod facade;
pub mod shared;
pub mod status;

pub use credential::{ClaimGate, CredentialGate, OpenGate};
pub use facade::{BaseSale, MultiRoundSale, SaleFacade, VestingSale};
pub use shared::SharedSale;
pub use status::{SalePhase, SaleStatus};
