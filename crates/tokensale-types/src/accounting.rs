//! Per-participant entitlement accounting.
//!
//! Every participant has a `bought` total (sale units credited by
//! purchases) and a `claimed` total (sale units already paid out).
//! Both only ever grow.

use serde::{Deserialize, Serialize};

use crate::Amount;

/// Entitlement record for one participant.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountingRecord {
    /// Sale units credited by purchases.
    pub bought: Amount,
    /// Sale units already claimed.
    pub claimed: Amount,
}

impl AccountingRecord {
    /// Entitlement not yet claimed, ignoring vesting.
    #[must_use]
    pub fn unclaimed(&self) -> Amount {
        self.bought.saturating_sub(self.claimed)
    }

    /// Whether this participant never bought anything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bought == 0 && self.claimed == 0
    }
}
