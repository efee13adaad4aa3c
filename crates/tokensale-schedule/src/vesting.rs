//! Vesting policies.
//!
//! A [`VestingPolicy`] decides how much of a participant's `bought` total
//! is unlocked at a given time, and whether the sale is closed.
//!
//! - [`LinearVesting`]: nothing before start, nothing during the margin,
//!   then `bought * rounds_elapsed / total_rounds`. The first unlock lands
//!   one full round after the margin ends, not at the margin boundary.
//!   Starting vesting closes the sale for good.
//! - [`Unvested`]: everything bought is claimable immediately and the sale
//!   never closes.

use tokensale_types::{
    AccountingRecord, Amount, RestartPolicy, Result, SaleError, Seconds, Timestamp,
    VestingConfig, VestingParams, math,
};
use tracing::info;

/// Pluggable unlock schedule.
pub trait VestingPolicy: Clone {
    /// Whether vesting has started (and purchases are therefore closed).
    fn is_started(&self) -> bool;

    /// Current schedule, or `None` for policies without one.
    fn config(&self) -> Option<VestingConfig>;

    /// Units of `bought` unlocked at `now`.
    fn vested(&self, bought: Amount, now: Timestamp) -> Result<Amount>;

    /// Start the unlock clock at `now`.
    fn start(&mut self, now: Timestamp) -> Result<()>;

    fn set_margin_duration(&mut self, seconds: Seconds) -> Result<()>;

    fn set_round_duration(&mut self, seconds: Seconds) -> Result<()>;

    fn set_total_rounds(&mut self, rounds: u64) -> Result<()>;

    fn set_restart_policy(&mut self, policy: RestartPolicy);

    /// Apply all three parameters at once. Nothing changes if any is zero.
    fn configure(&mut self, params: VestingParams) -> Result<()> {
        params.validate()?;
        self.set_margin_duration(params.margin_duration)?;
        self.set_round_duration(params.round_duration)?;
        self.set_total_rounds(params.total_rounds)
    }

    /// Vested minus already claimed. Never negative.
    fn claimable(&self, record: &AccountingRecord, now: Timestamp) -> Result<Amount> {
        Ok(self
            .vested(record.bought, now)?
            .saturating_sub(record.claimed))
    }
}

// ---------------------------------------------------------------------------
// LinearVesting
// ---------------------------------------------------------------------------

/// Margin followed by `total_rounds` equal unlock steps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinearVesting {
    config: VestingConfig,
    restart: RestartPolicy,
}

impl LinearVesting {
    /// Unstarted schedule with `params`.
    pub fn new(params: VestingParams) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            config: VestingConfig::new(params),
            restart: RestartPolicy::default(),
        })
    }

    #[must_use]
    pub fn with_restart_policy(mut self, restart: RestartPolicy) -> Self {
        self.restart = restart;
        self
    }

    #[must_use]
    pub fn restart_policy(&self) -> RestartPolicy {
        self.restart
    }

    /// The schedule is frozen once the clock runs.
    fn require_unstarted(&self) -> Result<()> {
        if self.config.started {
            return Err(SaleError::VestingStarted);
        }
        Ok(())
    }

    /// Unlock rounds elapsed at `now`, capped at `total_rounds`.
    #[must_use]
    pub fn rounds_elapsed(&self, now: Timestamp) -> u64 {
        let c = &self.config;
        if !c.started || c.round_duration == 0 {
            return 0;
        }
        let elapsed = now.saturating_sub(c.start_time);
        if elapsed < c.margin_duration {
            return 0;
        }
        let since_margin = elapsed - c.margin_duration;
        if since_margin < c.round_duration {
            return 0;
        }
        // First completed round is round 1.
        ((since_margin - c.round_duration) / c.round_duration)
            .saturating_add(1)
            .min(c.total_rounds)
    }
}

impl VestingPolicy for LinearVesting {
    fn is_started(&self) -> bool {
        self.config.started
    }

    fn config(&self) -> Option<VestingConfig> {
        Some(self.config)
    }

    fn vested(&self, bought: Amount, now: Timestamp) -> Result<Amount> {
        let rounds = self.rounds_elapsed(now);
        if rounds == 0 {
            return Ok(0);
        }
        math::mul_div(
            bought,
            Amount::from(rounds),
            Amount::from(self.config.total_rounds),
        )
    }

    fn start(&mut self, now: Timestamp) -> Result<()> {
        if self.config.started {
            match self.restart {
                RestartPolicy::Reject => return Err(SaleError::VestingAlreadyStarted),
                RestartPolicy::ResetClock => {
                    info!(
                        previous = self.config.start_time,
                        start_time = now,
                        "Vesting clock reset"
                    );
                }
            }
        }
        self.config.started = true;
        self.config.start_time = now;
        Ok(())
    }

    fn set_margin_duration(&mut self, seconds: Seconds) -> Result<()> {
        self.require_unstarted()?;
        if seconds == 0 {
            return Err(SaleError::OnlyPositive {
                field: "margin_duration",
            });
        }
        self.config.margin_duration = seconds;
        Ok(())
    }

    fn set_round_duration(&mut self, seconds: Seconds) -> Result<()> {
        self.require_unstarted()?;
        if seconds == 0 {
            return Err(SaleError::OnlyPositive {
                field: "round_duration",
            });
        }
        self.config.round_duration = seconds;
        Ok(())
    }

    fn set_total_rounds(&mut self, rounds: u64) -> Result<()> {
        self.require_unstarted()?;
        if rounds == 0 {
            return Err(SaleError::OnlyPositive {
                field: "total_rounds",
            });
        }
        self.config.total_rounds = rounds;
        Ok(())
    }

    fn set_restart_policy(&mut self, policy: RestartPolicy) {
        self.restart = policy;
    }
}

// ---------------------------------------------------------------------------
// Unvested
// ---------------------------------------------------------------------------

/// Immediate release: every unit bought is claimable at once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Unvested;

fn no_schedule() -> SaleError {
    SaleError::Configuration("sale has no vesting schedule".to_string())
}

impl VestingPolicy for Unvested {
    fn is_started(&self) -> bool {
        false
    }

    fn config(&self) -> Option<VestingConfig> {
        None
    }

    fn vested(&self, bought: Amount, _now: Timestamp) -> Result<Amount> {
        Ok(bought)
    }

    fn start(&mut self, _now: Timestamp) -> Result<()> {
        Err(no_schedule())
    }

    fn set_margin_duration(&mut self, _seconds: Seconds) -> Result<()> {
        Err(no_schedule())
    }

    fn set_round_duration(&mut self, _seconds: Seconds) -> Result<()> {
        Err(no_schedule())
    }

    fn set_total_rounds(&mut self, _rounds: u64) -> Result<()> {
        Err(no_schedule())
    }

    fn set_restart_policy(&mut self, _policy: RestartPolicy) {}
}
