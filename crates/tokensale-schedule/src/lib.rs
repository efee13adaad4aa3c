//! # tokensale-schedule
//!
//! **Pure sale policies for the tokensale engine.**
//!
//! Everything here is side-effect free apart from tracing events: no asset
//! transfers, no authority checks, no clock. The ledger and facade crates
//! own state and call into these policies.
//!
//! - **Exchange rates**: [`ExchangeRateEngine`] converts payment units into quote units
//! - **Rounds**: [`RoundPolicy`] with [`SingleRound`] and [`MultiRound`]
//! - **Vesting**: [`VestingPolicy`] with [`LinearVesting`] and [`Unvested`]

pub mod rate;
pub mod rounds;
pub mod vesting;

pub use rate::ExchangeRateEngine;
pub use rounds::{Booking, MultiRound, RoundPolicy, SingleRound};
pub use vesting::{LinearVesting, Unvested, VestingPolicy};
