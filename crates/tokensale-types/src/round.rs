//! Sale round types.
//!
//! A sale is partitioned into one or more rounds, each with its own supply
//! cap (in quote units) and exchange rate (in basis points).

use serde::{Deserialize, Serialize};

use crate::Amount;

/// Supply, raised total and exchange rate of a single sale round.
///
/// Invariant: `raised <= supply`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoundInfo {
    /// Maximum quote units this round may sell.
    pub supply: Amount,
    /// Quote units sold so far.
    pub raised: Amount,
    /// Sale units per payment unit, in basis points.
    pub exchange_rate_bps: u64,
}

impl RoundInfo {
    /// Quote units still available in this round.
    #[must_use]
    pub fn remaining(&self) -> Amount {
        self.supply.saturating_sub(self.raised)
    }

    /// Whether the round sold exactly its supply.
    #[must_use]
    pub fn is_sold_out(&self) -> bool {
        self.supply > 0 && self.raised == self.supply
    }

    /// Whether a rate has been set.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.exchange_rate_bps > 0
    }
}

/// Snapshot of the round currently accepting purchases.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SaleInfo {
    /// Index of the current round. Equals the round count once all rounds sold out.
    pub round: usize,
    /// Total number of rounds.
    pub rounds: usize,
    /// The current round, or `None` when every round is exhausted.
    pub info: Option<RoundInfo>,
}

/// Bulk configuration for every round of a sale.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoundPlan {
    /// Per-round supply caps.
    pub supplies: Vec<Amount>,
    /// Per-round exchange rates in basis points.
    pub rates: Vec<u64>,
}

impl RoundPlan {
    #[must_use]
    pub fn new(supplies: Vec<Amount>, rates: Vec<u64>) -> Self {
        Self { supplies, rates }
    }

    /// The same supply and rate for `rounds` rounds.
    #[must_use]
    pub fn uniform(rounds: usize, supply: Amount, rate_bps: u64) -> Self {
        Self {
            supplies: vec![supply; rounds],
            rates: vec![rate_bps; rounds],
        }
    }

    /// Iterate `(supply, rate)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (Amount, u64)> + '_ {
        self.supplies.iter().copied().zip(self.rates.iter().copied())
    }
}
