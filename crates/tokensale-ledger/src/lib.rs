//! # tokensale-ledger
//!
//! **Stateful accounting for the tokensale engine.**
//!
//! The ledger is the sale's state plane:
//!
//! - **Sale state**: [`SaleLedger`] owns authority, lifecycle, the pause gate,
//!   accepted instruments, rates and per-participant accounting
//! - **Asset interface**: [`AssetLedger`] is what the sale needs from the
//!   asset contracts; [`InMemoryAssets`] implements it for every instrument
//! - **Reserve coverage**: [`ReserveBook`] tracks conservation totals and
//!   checks that the reserve covers outstanding entitlement

pub mod assets;
pub mod reserve;
pub mod sale_ledger;

pub use assets::{AssetLedger, InMemoryAssets};
pub use reserve::ReserveBook;
pub use sale_ledger::{Checkpoint, Lifecycle, SaleLedger};
