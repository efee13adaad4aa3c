//! Round scheduling.
//!
//! A [`RoundPolicy`] owns the sale's rounds and decides which one accepts
//! the next purchase. Two policies exist:
//!
//! - [`SingleRound`]: one round that never advances. Once sold out, every
//!   further purchase fails `ExceedsSupply`.
//! - [`MultiRound`]: a fixed number of rounds with a cursor. A purchase that
//!   sells the current round out *exactly* advances the cursor in the same
//!   call. Past the last round the cursor sits one-past-end and purchases
//!   fail `RoundsExhausted`.
//!
//! Purchases never split across rounds: the whole quote fits in the current
//! round or the purchase is rejected.

use tokensale_types::{
    Amount, Result, RoundInfo, RoundPlan, SaleError, SaleInfo, constants, math,
};
use tracing::info;

/// Outcome of booking a purchase against the current round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Booking {
    /// Round the purchase was booked against.
    pub round: usize,
    /// Whether the cursor moved to the next round.
    pub advanced: bool,
    /// Whether the final round is now sold out.
    pub final_sold_out: bool,
}

/// Pluggable round bookkeeping for a sale.
pub trait RoundPolicy: Clone {
    /// Fixed number of rounds.
    fn round_count(&self) -> usize;

    /// Cursor of the round accepting purchases. `round_count()` once exhausted.
    fn current_index(&self) -> usize;

    /// Round at `index`, or `IncorrectRound`.
    fn round(&self, index: usize) -> Result<RoundInfo>;

    /// Set one round's supply and rate.
    fn configure_round(&mut self, index: usize, supply: Amount, rate_bps: u64) -> Result<()>;

    /// Set every round at once. Nothing changes unless every entry is valid.
    fn configure_all(&mut self, plan: &RoundPlan) -> Result<()>;

    /// Commit `quoted` against the current round.
    fn book(&mut self, quoted: Amount) -> Result<Booking>;

    /// Whether the last round sold out exactly.
    fn is_final_round_sold_out(&self) -> bool;

    /// The round accepting purchases, if any.
    fn current(&self) -> Option<RoundInfo> {
        self.round(self.current_index()).ok()
    }

    /// Set the current round's supply and rate.
    fn configure_current(&mut self, supply: Amount, rate_bps: u64) -> Result<()> {
        let index = self.current_index();
        if index >= self.round_count() {
            return Err(SaleError::RoundsExhausted);
        }
        self.configure_round(index, supply, rate_bps)
    }

    /// Fail unless `quoted` fits in the current round.
    fn ensure_capacity(&self, quoted: Amount) -> Result<()> {
        let current = self.current().ok_or(SaleError::RoundsExhausted)?;
        fit(&current, quoted).map(|_| ())
    }

    fn sale_info(&self) -> SaleInfo {
        SaleInfo {
            round: self.current_index(),
            rounds: self.round_count(),
            info: self.current(),
        }
    }

    /// Quote units raised across every round.
    fn total_raised(&self) -> Result<Amount> {
        (0..self.round_count()).try_fold(0, |acc, index| math::add(acc, self.round(index)?.raised))
    }
}

/// Apply a new supply and rate to `round`, keeping already-sold entitlement.
fn reconfigure(round: &mut RoundInfo, supply: Amount, rate_bps: u64) -> Result<()> {
    validate_terms(round, supply, rate_bps)?;
    round.supply = supply;
    round.exchange_rate_bps = rate_bps;
    Ok(())
}

fn validate_terms(round: &RoundInfo, supply: Amount, rate_bps: u64) -> Result<()> {
    if rate_bps == 0 {
        return Err(SaleError::OnlyPositive {
            field: "exchange_rate_bps",
        });
    }
    if round.raised > 0 && supply <= round.raised {
        return Err(SaleError::BadSupply {
            supply,
            raised: round.raised,
        });
    }
    Ok(())
}

/// New `raised` if `quoted` fits in `round`.
fn fit(round: &RoundInfo, quoted: Amount) -> Result<Amount> {
    let raised = math::add(round.raised, quoted)?;
    if raised > round.supply {
        return Err(SaleError::ExceedsSupply {
            requested: quoted,
            remaining: round.remaining(),
        });
    }
    Ok(raised)
}

fn check_plan_len(plan: &RoundPlan, rounds: usize) -> Result<()> {
    if plan.supplies.len() != rounds || plan.rates.len() != rounds {
        return Err(SaleError::RoundPlanMismatch {
            supplies: plan.supplies.len(),
            rates: plan.rates.len(),
            rounds,
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// SingleRound
// ---------------------------------------------------------------------------

/// A sale with exactly one round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SingleRound {
    info: RoundInfo,
}

impl SingleRound {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl RoundPolicy for SingleRound {
    fn round_count(&self) -> usize {
        1
    }

    fn current_index(&self) -> usize {
        0
    }

    fn round(&self, index: usize) -> Result<RoundInfo> {
        if index != 0 {
            return Err(SaleError::IncorrectRound { index, rounds: 1 });
        }
        Ok(self.info)
    }

    fn configure_round(&mut self, index: usize, supply: Amount, rate_bps: u64) -> Result<()> {
        if index != 0 {
            return Err(SaleError::IncorrectRound { index, rounds: 1 });
        }
        reconfigure(&mut self.info, supply, rate_bps)
    }

    fn configure_all(&mut self, plan: &RoundPlan) -> Result<()> {
        check_plan_len(plan, 1)?;
        reconfigure(&mut self.info, plan.supplies[0], plan.rates[0])
    }

    fn book(&mut self, quoted: Amount) -> Result<Booking> {
        self.info.raised = fit(&self.info, quoted)?;
        Ok(Booking {
            round: 0,
            advanced: false,
            final_sold_out: self.info.is_sold_out(),
        })
    }

    fn is_final_round_sold_out(&self) -> bool {
        self.info.is_sold_out()
    }
}

// ---------------------------------------------------------------------------
// MultiRound
// ---------------------------------------------------------------------------

/// A sale partitioned into a fixed number of sequential rounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiRound {
    rounds: Vec<RoundInfo>,
    current: usize,
}

impl MultiRound {
    /// `count` unconfigured rounds. Zero rounds is rejected.
    pub fn new(count: usize) -> Result<Self> {
        if count == 0 {
            return Err(SaleError::OnlyPositive { field: "rounds" });
        }
        Ok(Self {
            rounds: vec![RoundInfo::default(); count],
            current: 0,
        })
    }

    /// Every round, in order.
    #[must_use]
    pub fn rounds(&self) -> &[RoundInfo] {
        &self.rounds
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.rounds.len() {
            return Err(SaleError::IncorrectRound {
                index,
                rounds: self.rounds.len(),
            });
        }
        Ok(())
    }

    /// Rounds behind the cursor are sold out and stay closed.
    fn check_open(&self, index: usize) -> Result<()> {
        self.check_index(index)?;
        if index < self.current {
            return Err(SaleError::IncorrectRound {
                index,
                rounds: self.rounds.len(),
            });
        }
        Ok(())
    }
}

impl Default for MultiRound {
    fn default() -> Self {
        Self {
            rounds: vec![RoundInfo::default(); constants::DEFAULT_SALE_ROUNDS],
            current: 0,
        }
    }
}

impl RoundPolicy for MultiRound {
    fn round_count(&self) -> usize {
        self.rounds.len()
    }

    fn current_index(&self) -> usize {
        self.current
    }

    fn round(&self, index: usize) -> Result<RoundInfo> {
        self.check_index(index)?;
        Ok(self.rounds[index])
    }

    fn configure_round(&mut self, index: usize, supply: Amount, rate_bps: u64) -> Result<()> {
        self.check_open(index)?;
        reconfigure(&mut self.rounds[index], supply, rate_bps)
    }

    fn configure_all(&mut self, plan: &RoundPlan) -> Result<()> {
        check_plan_len(plan, self.rounds.len())?;
        if self.current > 0 {
            self.check_open(0)?;
        }
        for (round, (supply, rate)) in self.rounds.iter().zip(plan.iter()) {
            validate_terms(round, supply, rate)?;
        }
        for (round, (supply, rate)) in self.rounds.iter_mut().zip(plan.iter()) {
            round.supply = supply;
            round.exchange_rate_bps = rate;
        }
        Ok(())
    }

    fn book(&mut self, quoted: Amount) -> Result<Booking> {
        let index = self.current;
        let round = self
            .rounds
            .get_mut(index)
            .ok_or(SaleError::RoundsExhausted)?;
        round.raised = fit(round, quoted)?;

        let advanced = round.is_sold_out();
        if advanced {
            self.current += 1;
            info!(
                from = index,
                to = self.current,
                rounds = self.rounds.len(),
                "Sale round sold out, advancing"
            );
        }
        Ok(Booking {
            round: index,
            advanced,
            final_sold_out: self.is_final_round_sold_out(),
        })
    }

    fn is_final_round_sold_out(&self) -> bool {
        self.current >= self.rounds.len()
    }
}
