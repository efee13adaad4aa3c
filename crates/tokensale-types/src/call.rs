//! The per-call context supplied by the host.
//!
//! The engine keeps no clock of its own. Every external operation receives
//! the caller's identity, the native value attached to the call, and the
//! host's current time.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{Address, Amount, Timestamp};

/// Who is calling, with how much native value, and when.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallContext {
    /// The authenticated caller.
    pub caller: Address,
    /// Native value attached to the call.
    pub value: Amount,
    /// Host time in unix seconds. Must never go backwards across calls.
    pub now: Timestamp,
}

impl CallContext {
    /// A call at an explicit time with no attached value.
    #[must_use]
    pub fn at(caller: Address, now: Timestamp) -> Self {
        Self {
            caller,
            value: 0,
            now,
        }
    }

    /// A call stamped with the current wall-clock time.
    #[must_use]
    pub fn now_utc(caller: Address) -> Self {
        let now = u64::try_from(Utc::now().timestamp()).unwrap_or_default();
        Self::at(caller, now)
    }

    /// Attach native value to the call.
    #[must_use]
    pub fn with_value(mut self, value: Amount) -> Self {
        self.value = value;
        self
    }
}
