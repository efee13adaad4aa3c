//! One-shot initialization payload for a sale.
//!
//! Every field has a default, so a minimal JSON document is `{}`. Loading
//! never touches sale state; [`SaleConfig::validate`] runs before
//! `initialize` applies anything.

use std::{collections::BTreeSet, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    Address, CredentialPolicy, InstrumentId, RestartPolicy, Result, RoundPlan, SaleError,
    SignerKey, VestingParams, constants,
};

/// Everything `initialize` needs to bring a sale from `Uninitialized` to live.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SaleConfig {
    /// Sale authority. Falls back to the initializing caller.
    #[serde(default)]
    pub owner: Option<Address>,
    /// Asset that claims pay out.
    #[serde(default)]
    pub sale_asset: Option<Address>,
    /// Native-value multiplier in basis points.
    #[serde(default = "default_native_rate")]
    pub native_rate_bps: u64,
    /// Where purchase payments go. `None` keeps them at the sale address.
    #[serde(default)]
    pub proceeds_recipient: Option<Address>,
    #[serde(default)]
    pub start_paused: bool,
    /// Instruments accepted from the start.
    #[serde(default)]
    pub accepted_instruments: Vec<InstrumentId>,
    /// Initial round supplies and rates.
    #[serde(default)]
    pub rounds: Option<RoundPlan>,
    /// Vesting schedule. `None` keeps the policy's defaults.
    #[serde(default)]
    pub vesting: Option<VestingParams>,
    #[serde(default)]
    pub restart_policy: RestartPolicy,
    /// Start vesting automatically when the final round sells out.
    #[serde(default = "default_true")]
    pub auto_start_vesting: bool,
    #[serde(default)]
    pub credential_policy: CredentialPolicy,
    /// Attestation signer. Claims fail closed while unset.
    #[serde(default)]
    pub trusted_signer: Option<SignerKey>,
}

fn default_native_rate() -> u64 {
    constants::DEFAULT_NATIVE_RATE_BPS
}

fn default_true() -> bool {
    true
}

impl Default for SaleConfig {
    fn default() -> Self {
        Self {
            owner: None,
            sale_asset: None,
            native_rate_bps: default_native_rate(),
            proceeds_recipient: None,
            start_paused: false,
            accepted_instruments: Vec::new(),
            rounds: None,
            vesting: None,
            restart_policy: RestartPolicy::default(),
            auto_start_vesting: true,
            credential_policy: CredentialPolicy::default(),
            trusted_signer: None,
        }
    }
}

impl SaleConfig {
    /// Parse from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Reject values `initialize` would refuse, before any state is touched.
    ///
    /// Round-count checks depend on the round policy and happen at apply time.
    pub fn validate(&self) -> Result<()> {
        if self.native_rate_bps == 0 {
            return Err(SaleError::OnlyPositive {
                field: "native_rate_bps",
            });
        }
        if let Some(vesting) = &self.vesting {
            vesting.validate()?;
        }
        if let Some(plan) = &self.rounds {
            if plan.supplies.len() != plan.rates.len() {
                return Err(SaleError::RoundPlanMismatch {
                    supplies: plan.supplies.len(),
                    rates: plan.rates.len(),
                    rounds: plan.supplies.len().max(plan.rates.len()),
                });
            }
            if plan.rates.contains(&0) {
                return Err(SaleError::OnlyPositive {
                    field: "exchange_rate_bps",
                });
            }
        }
        let mut seen = BTreeSet::new();
        for instrument in &self.accepted_instruments {
            if !seen.insert(*instrument) {
                return Err(SaleError::AlreadyEnabled(*instrument));
            }
        }
        if let Some(signer) = &self.trusted_signer {
            signer.verifying_key()?;
        }
        Ok(())
    }
}
