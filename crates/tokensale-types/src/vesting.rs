//! Vesting schedule types.
//!
//! ```text
//!   start        start+margin   +round      +2·round           +N·round
//!     │─── margin ───│─── r1 ───│─── r2 ───│ ... │─── rN ───│
//!     0 unlocked      0          1/N        2/N         N/N
//! ```
//!
//! Nothing unlocks during the margin. The first `1/N` unlocks one full
//! round after the margin ends.

use serde::{Deserialize, Serialize};

use crate::{Result, SaleError, Seconds, Timestamp, constants};

/// Durations and round count of a linear vesting schedule.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct VestingParams {
    /// Dead period after the start during which nothing unlocks.
    pub margin_duration: Seconds,
    /// Length of one unlock round.
    pub round_duration: Seconds,
    /// Number of unlock rounds.
    pub total_rounds: u64,
}

impl VestingParams {
    /// Reject zero durations and a zero round count.
    pub fn validate(&self) -> Result<()> {
        if self.margin_duration == 0 {
            return Err(SaleError::OnlyPositive {
                field: "margin_duration",
            });
        }
        if self.round_duration == 0 {
            return Err(SaleError::OnlyPositive {
                field: "round_duration",
            });
        }
        if self.total_rounds == 0 {
            return Err(SaleError::OnlyPositive {
                field: "total_rounds",
            });
        }
        Ok(())
    }

    /// Seconds from start until everything is unlocked.
    #[must_use]
    pub fn full_unlock_after(&self) -> Seconds {
        self.round_duration
            .saturating_mul(self.total_rounds)
            .saturating_add(self.margin_duration)
    }
}

impl Default for VestingParams {
    fn default() -> Self {
        Self {
            margin_duration: constants::DEFAULT_MARGIN_DURATION,
            round_duration: constants::DEFAULT_ROUND_DURATION,
            total_rounds: constants::DEFAULT_VESTING_ROUNDS,
        }
    }
}

/// What a second `start_vesting` call does.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestartPolicy {
    /// Fail with `VestingAlreadyStarted`.
    #[default]
    Reject,
    /// Re-arm the unlock clock at the new call's time.
    ResetClock,
}

/// Full vesting state: parameters plus whether and when it started.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct VestingConfig {
    pub started: bool,
    pub start_time: Timestamp,
    pub margin_duration: Seconds,
    pub round_duration: Seconds,
    pub total_rounds: u64,
}

impl VestingConfig {
    /// A not-yet-started schedule with the given parameters.
    #[must_use]
    pub fn new(params: VestingParams) -> Self {
        Self {
            started: false,
            start_time: 0,
            margin_duration: params.margin_duration,
            round_duration: params.round_duration,
            total_rounds: params.total_rounds,
        }
    }

    #[must_use]
    pub fn params(&self) -> VestingParams {
        VestingParams {
            margin_duration: self.margin_duration,
            round_duration: self.round_duration,
            total_rounds: self.total_rounds,
        }
    }
}

impl Default for VestingConfig {
    fn default() -> Self {
        Self::new(VestingParams::default())
    }
}
