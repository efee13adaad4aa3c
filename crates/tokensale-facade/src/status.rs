//! Coarse sale status for hosts and dashboards.

use serde::{Deserialize, Serialize};
use tokensale_types::Amount;

/// Where a sale is in its life.
///
/// ```text
/// Configuring ──► Selling ──► Vesting ──► Drained
/// ```
///
/// Pausing is orthogonal and reported separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SalePhase {
    /// Not initialized, or the current round has no rate yet.
    Configuring,
    /// Accepting purchases.
    Selling,
    /// Purchases closed, claims open.
    Vesting,
    /// Vesting started and everything sold has been claimed.
    Drained,
}

impl std::fmt::Display for SalePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Configuring => write!(f, "CONFIGURING"),
            Self::Selling => write!(f, "SELLING"),
            Self::Vesting => write!(f, "VESTING"),
            Self::Drained => write!(f, "DRAINED"),
        }
    }
}

/// Snapshot returned by `SaleFacade::status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleStatus {
    pub phase: SalePhase,
    pub paused: bool,
    /// Current round cursor.
    pub round: usize,
    pub rounds: usize,
    pub total_bought: Amount,
    pub total_claimed: Amount,
}
