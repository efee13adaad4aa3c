//! Core sale state: authority, lifecycle, pause gate, accepted instruments,
//! rates, and per-participant accounting.
//!
//! The ledger owns every mutable field of a sale except round and vesting
//! bookkeeping, which live in their policies. Authority-only methods take
//! the caller and fail `Unauthorized` before touching anything.
//!
//! Administrative configuration is never gated by the pause flag. Only
//! purchases and claims call [`SaleLedger::require_active`].

use std::collections::{BTreeSet, HashMap};

use tokensale_types::{
    AccountingRecord, Address, Amount, InstrumentId, Result, SaleConfig, SaleError, math,
};
use tracing::{info, warn};

use crate::ReserveBook;

/// Whether the one-shot setup call has run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Lifecycle {
    #[default]
    Uninitialized,
    Initialized,
}

/// The parts of a ledger one purchase or claim can touch.
///
/// Taken before accounting is committed and restored if the asset
/// transfer that follows fails.
#[derive(Debug, Clone)]
pub struct Checkpoint {
    account: Address,
    record: Option<AccountingRecord>,
    reserve: ReserveBook,
}

/// Sale-wide state and participant accounting.
#[derive(Debug, Clone, Default)]
pub struct SaleLedger {
    lifecycle: Lifecycle,
    owner: Address,
    paused: bool,
    instruments: BTreeSet<InstrumentId>,
    native_rate_bps: u64,
    sale_asset: Option<Address>,
    proceeds_recipient: Option<Address>,
    /// `participant → {bought, claimed}`
    accounting: HashMap<Address, AccountingRecord>,
    reserve: ReserveBook,
}

impl SaleLedger {
    /// An uninitialized ledger. Every gated call fails `NotInitialized`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // =================================================================
    // Lifecycle & authority
    // =================================================================

    /// Apply `config`. The owner falls back to `caller`.
    ///
    /// The config must already be validated; this only fails on a second call.
    pub fn initialize(&mut self, caller: &Address, config: &SaleConfig) -> Result<()> {
        if self.lifecycle == Lifecycle::Initialized {
            return Err(SaleError::AlreadyInitialized);
        }
        self.owner = config.owner.unwrap_or(*caller);
        self.paused = config.start_paused;
        self.native_rate_bps = config.native_rate_bps;
        self.sale_asset = config.sale_asset;
        self.proceeds_recipient = config.proceeds_recipient;
        self.instruments = config.accepted_instruments.iter().copied().collect();
        self.lifecycle = Lifecycle::Initialized;

        info!(
            owner = %self.owner,
            paused = self.paused,
            native_rate_bps = self.native_rate_bps,
            instruments = self.instruments.len(),
            "Sale initialized"
        );
        Ok(())
    }

    #[must_use]
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.lifecycle == Lifecycle::Initialized
    }

    pub fn require_initialized(&self) -> Result<()> {
        if !self.is_initialized() {
            return Err(SaleError::NotInitialized);
        }
        Ok(())
    }

    #[must_use]
    pub fn owner(&self) -> Address {
        self.owner
    }

    /// Fail unless the sale is initialized and `caller` is its owner.
    pub fn require_owner(&self, caller: &Address) -> Result<()> {
        self.require_initialized()?;
        if *caller != self.owner {
            warn!(caller = %caller, owner = %self.owner, "Rejected non-owner call");
            return Err(SaleError::Unauthorized { caller: *caller });
        }
        Ok(())
    }

    pub fn transfer_ownership(&mut self, caller: &Address, new_owner: Address) -> Result<()> {
        self.require_owner(caller)?;
        info!(from = %self.owner, to = %new_owner, "Ownership transferred");
        self.owner = new_owner;
        Ok(())
    }

    // =================================================================
    // Pause gate
    // =================================================================

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn pause(&mut self, caller: &Address) -> Result<()> {
        self.require_owner(caller)?;
        if self.paused {
            return Err(SaleError::Paused);
        }
        self.paused = true;
        info!(by = %caller, "Sale paused");
        Ok(())
    }

    pub fn unpause(&mut self, caller: &Address) -> Result<()> {
        self.require_owner(caller)?;
        if !self.paused {
            return Err(SaleError::NotPaused);
        }
        self.paused = false;
        info!(by = %caller, "Sale unpaused");
        Ok(())
    }

    /// Gate for purchases and claims: initialized and not paused.
    pub fn require_active(&self) -> Result<()> {
        self.require_initialized()?;
        if self.paused {
            return Err(SaleError::Paused);
        }
        Ok(())
    }

    // =================================================================
    // Instruments & rates
    // =================================================================

    pub fn add_instrument(&mut self, caller: &Address, instrument: InstrumentId) -> Result<()> {
        self.require_owner(caller)?;
        if !self.instruments.insert(instrument) {
            return Err(SaleError::AlreadyEnabled(instrument));
        }
        info!(instrument = %instrument, "Instrument enabled");
        Ok(())
    }

    pub fn remove_instrument(&mut self, caller: &Address, instrument: InstrumentId) -> Result<()> {
        self.require_owner(caller)?;
        if !self.instruments.remove(&instrument) {
            return Err(SaleError::AlreadyDisabled(instrument));
        }
        info!(instrument = %instrument, "Instrument disabled");
        Ok(())
    }

    #[must_use]
    pub fn is_accepted(&self, instrument: &InstrumentId) -> bool {
        self.instruments.contains(instrument)
    }

    pub fn require_accepted(&self, instrument: &InstrumentId) -> Result<()> {
        if !self.is_accepted(instrument) {
            return Err(SaleError::BadInstrument(*instrument));
        }
        Ok(())
    }

    /// Accepted instruments in a stable order.
    pub fn accepted_instruments(&self) -> impl Iterator<Item = &InstrumentId> {
        self.instruments.iter()
    }

    #[must_use]
    pub fn native_rate_bps(&self) -> u64 {
        self.native_rate_bps
    }

    pub fn set_native_rate(&mut self, caller: &Address, rate_bps: u64) -> Result<()> {
        self.require_owner(caller)?;
        if rate_bps == 0 {
            return Err(SaleError::OnlyPositive {
                field: "native_rate_bps",
            });
        }
        info!(
            from = self.native_rate_bps,
            to = rate_bps,
            "Native rate updated"
        );
        self.native_rate_bps = rate_bps;
        Ok(())
    }

    // =================================================================
    // Sale asset & proceeds
    // =================================================================

    #[must_use]
    pub fn sale_asset(&self) -> Option<Address> {
        self.sale_asset
    }

    /// The payout instrument, or `SaleAssetNotSet`.
    pub fn require_sale_asset(&self) -> Result<InstrumentId> {
        self.sale_asset
            .map(InstrumentId::Asset)
            .ok_or(SaleError::SaleAssetNotSet)
    }

    pub fn set_sale_asset(&mut self, caller: &Address, asset: Address) -> Result<()> {
        self.require_owner(caller)?;
        self.sale_asset = Some(asset);
        info!(asset = %asset, "Sale asset set");
        Ok(())
    }

    #[must_use]
    pub fn proceeds_recipient(&self) -> Option<Address> {
        self.proceeds_recipient
    }

    pub fn set_proceeds_recipient(
        &mut self,
        caller: &Address,
        recipient: Option<Address>,
    ) -> Result<()> {
        self.require_owner(caller)?;
        self.proceeds_recipient = recipient;
        match recipient {
            Some(to) => info!(recipient = %to, "Proceeds recipient set"),
            None => info!("Proceeds recipient cleared"),
        }
        Ok(())
    }

    // =================================================================
    // Accounting
    // =================================================================

    #[must_use]
    pub fn accounting_of(&self, account: &Address) -> AccountingRecord {
        self.accounting.get(account).copied().unwrap_or_default()
    }

    /// Number of participants with a record.
    #[must_use]
    pub fn participants(&self) -> usize {
        self.accounting.len()
    }

    /// Add `quoted` to `recipient`'s bought total and the sale total.
    pub fn credit_purchase(&mut self, recipient: &Address, quoted: Amount) -> Result<AccountingRecord> {
        let mut record = self.accounting_of(recipient);
        record.bought = math::add(record.bought, quoted)?;
        self.reserve.record_purchase(quoted)?;
        self.accounting.insert(*recipient, record);
        Ok(record)
    }

    /// Add `amount` to `recipient`'s claimed total and the sale total.
    ///
    /// Vesting limits are checked by the caller; this only refuses to let
    /// `claimed` pass `bought`.
    pub fn debit_claim(&mut self, recipient: &Address, amount: Amount) -> Result<AccountingRecord> {
        let mut record = self.accounting_of(recipient);
        let claimed = math::add(record.claimed, amount)?;
        if claimed > record.bought {
            return Err(SaleError::ExceedsClaimable {
                requested: amount,
                claimable: record.unclaimed(),
            });
        }
        self.reserve.record_claim(amount)?;
        record.claimed = claimed;
        if !record.is_empty() {
            self.accounting.insert(*recipient, record);
        }
        Ok(record)
    }

    /// Snapshot `account`'s record and the running totals.
    #[must_use]
    pub fn checkpoint(&self, account: &Address) -> Checkpoint {
        Checkpoint {
            account: *account,
            record: self.accounting.get(account).copied(),
            reserve: self.reserve.clone(),
        }
    }

    /// Roll back to `checkpoint`.
    pub fn restore(&mut self, checkpoint: Checkpoint) {
        match checkpoint.record {
            Some(record) => {
                self.accounting.insert(checkpoint.account, record);
            }
            None => {
                self.accounting.remove(&checkpoint.account);
            }
        }
        self.reserve = checkpoint.reserve;
    }

    // =================================================================
    // Reserve
    // =================================================================

    #[must_use]
    pub fn reserve(&self) -> &ReserveBook {
        &self.reserve
    }

    pub fn record_deposit(&mut self, asset: &InstrumentId, amount: Amount) -> Result<()> {
        self.reserve.record_deposit(asset, amount)
    }

    pub fn record_withdrawal(&mut self, asset: &InstrumentId, amount: Amount) -> Result<()> {
        self.reserve.record_withdrawal(asset, amount)
    }
}
