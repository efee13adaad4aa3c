//! The composed sale.
//!
//! [`SaleFacade`] is the single entry point callers talk to. It owns one
//! [`SaleLedger`] and composes three policies around it:
//!
//! - a [`RoundPolicy`] deciding which round accepts the next purchase,
//! - a [`VestingPolicy`] deciding how much entitlement is unlocked,
//! - a [`ClaimGate`] deciding who may claim,
//!
//! plus the [`AssetLedger`] every movement of value goes through.
//!
//! ## Call atomicity
//!
//! Every operation either commits all of its state changes or none. For
//! purchases and claims the accounting (`raised`, `bought`, `claimed`) is
//! committed *before* the asset transfer, so anything the transfer
//! triggers already sees the updated books. If the transfer fails the
//! books are rolled back to the checkpoint taken just before.

use tokensale_ledger::{AssetLedger, InMemoryAssets, SaleLedger};
use tokensale_schedule::{
    ExchangeRateEngine, LinearVesting, MultiRound, RoundPolicy, SingleRound, Unvested,
    VestingPolicy,
};
use tokensale_types::{
    AccountingRecord, Address, Amount, Attestation, CallContext, ClaimReceipt, CredentialPolicy,
    InstrumentId, PurchaseReceipt, ReceiptId, RestartPolicy, Result, RoundInfo, RoundPlan,
    SaleConfig, SaleError, SaleInfo, Seconds, SignerKey, Timestamp, VestingConfig, VestingParams,
};
use tracing::info;

use crate::{ClaimGate, CredentialGate, OpenGate, SalePhase, SaleStatus};

/// Single round, linear vesting, credential-gated claims.
pub type VestingSale<A = InMemoryAssets> = SaleFacade<SingleRound, LinearVesting, CredentialGate, A>;

/// Multiple rounds, linear vesting, credential-gated claims.
pub type MultiRoundSale<A = InMemoryAssets> =
    SaleFacade<MultiRound, LinearVesting, CredentialGate, A>;

/// Single round, immediate release, open claims.
pub type BaseSale<A = InMemoryAssets> = SaleFacade<SingleRound, Unvested, OpenGate, A>;

/// A token sale: ledger plus round, vesting and claim policies.
#[derive(Debug)]
pub struct SaleFacade<R, V, G, A> {
    /// The sale's own account on the asset ledger.
    address: Address,
    ledger: SaleLedger,
    rounds: R,
    vesting: V,
    gate: G,
    assets: A,
    auto_start_vesting: bool,
}

impl<A: AssetLedger> VestingSale<A> {
    /// An uninitialized single-round vesting sale at `address`.
    pub fn vesting(address: Address, assets: A) -> Self {
        SaleFacade::new(
            address,
            SingleRound::new(),
            LinearVesting::default(),
            CredentialGate::default(),
            assets,
        )
    }
}

impl<A: AssetLedger> MultiRoundSale<A> {
    /// An uninitialized `rounds`-round vesting sale at `address`.
    pub fn multi_round(address: Address, rounds: usize, assets: A) -> Result<Self> {
        Ok(SaleFacade::new(
            address,
            MultiRound::new(rounds)?,
            LinearVesting::default(),
            CredentialGate::default(),
            assets,
        ))
    }
}

impl<A: AssetLedger> BaseSale<A> {
    /// An uninitialized single-round sale with immediate release.
    pub fn base(address: Address, assets: A) -> Self {
        SaleFacade::new(address, SingleRound::new(), Unvested, OpenGate, assets)
    }
}

impl<R, V, G, A> SaleFacade<R, V, G, A>
where
    R: RoundPolicy,
    V: VestingPolicy,
    G: ClaimGate,
    A: AssetLedger,
{
    /// Compose an uninitialized sale. Only views work until [`initialize`](Self::initialize).
    pub fn new(address: Address, rounds: R, vesting: V, gate: G, assets: A) -> Self {
        Self {
            address,
            ledger: SaleLedger::new(),
            rounds,
            vesting,
            gate,
            assets,
            auto_start_vesting: true,
        }
    }

    // =================================================================
    // Lifecycle
    // =================================================================

    /// One-shot setup. Nothing is applied unless the whole config is accepted.
    pub fn initialize(&mut self, ctx: &CallContext, config: SaleConfig) -> Result<()> {
        if self.ledger.is_initialized() {
            return Err(SaleError::AlreadyInitialized);
        }
        config.validate()?;

        let mut rounds = self.rounds.clone();
        if let Some(plan) = &config.rounds {
            rounds.configure_all(plan)?;
        }
        let mut vesting = self.vesting.clone();
        if let Some(params) = config.vesting {
            vesting.configure(params)?;
        }
        vesting.set_restart_policy(config.restart_policy);

        if config.trusted_signer.is_some() {
            self.gate.set_trusted_signer(config.trusted_signer)?;
        }
        self.gate.set_policy(config.credential_policy.clone());

        self.ledger.initialize(&ctx.caller, &config)?;
        self.rounds = rounds;
        self.vesting = vesting;
        self.auto_start_vesting = config.auto_start_vesting;
        Ok(())
    }

    /// Hand the owner role to `new_owner`. Owner-only.
    pub fn transfer_ownership(&mut self, ctx: &CallContext, new_owner: Address) -> Result<()> {
        self.ledger.transfer_ownership(&ctx.caller, new_owner)
    }

    /// Stop purchases and claims. Configuration stays open. Owner-only.
    pub fn pause(&mut self, ctx: &CallContext) -> Result<()> {
        self.ledger.pause(&ctx.caller)
    }

    /// Resume purchases and claims. Owner-only.
    pub fn unpause(&mut self, ctx: &CallContext) -> Result<()> {
        self.ledger.unpause(&ctx.caller)
    }

    // =================================================================
    // Sale configuration
    // =================================================================

    /// Accept `instrument` as payment. Fails if already accepted.
    pub fn add_instrument(&mut self, ctx: &CallContext, instrument: InstrumentId) -> Result<()> {
        self.ledger.add_instrument(&ctx.caller, instrument)
    }

    /// Stop accepting `instrument`. Fails if not accepted.
    pub fn remove_instrument(&mut self, ctx: &CallContext, instrument: InstrumentId) -> Result<()> {
        self.ledger.remove_instrument(&ctx.caller, instrument)
    }

    /// Native-value multiplier in basis points. Zero is rejected.
    pub fn set_native_rate(&mut self, ctx: &CallContext, rate_bps: u64) -> Result<()> {
        self.ledger.set_native_rate(&ctx.caller, rate_bps)
    }

    /// Asset paid out on claims.
    pub fn set_sale_asset(&mut self, ctx: &CallContext, asset: Address) -> Result<()> {
        self.ledger.set_sale_asset(&ctx.caller, asset)
    }

    /// Forward purchase payments to `recipient`, or keep them on the sale with `None`.
    pub fn set_proceeds_recipient(
        &mut self,
        ctx: &CallContext,
        recipient: Option<Address>,
    ) -> Result<()> {
        self.ledger.set_proceeds_recipient(&ctx.caller, recipient)
    }

    /// Set the current round's supply and rate.
    pub fn configure_rate(&mut self, ctx: &CallContext, supply: Amount, rate_bps: u64) -> Result<()> {
        self.ledger.require_owner(&ctx.caller)?;
        self.rounds.configure_current(supply, rate_bps)?;
        info!(
            round = self.rounds.current_index(),
            supply, rate_bps, "Round configured"
        );
        Ok(())
    }

    /// Set one round's supply and rate. Closed rounds are rejected.
    pub fn configure_round(
        &mut self,
        ctx: &CallContext,
        index: usize,
        supply: Amount,
        rate_bps: u64,
    ) -> Result<()> {
        self.ledger.require_owner(&ctx.caller)?;
        self.rounds.configure_round(index, supply, rate_bps)?;
        info!(round = index, supply, rate_bps, "Round configured");
        Ok(())
    }

    /// Set every round at once, before the first round closes.
    pub fn configure_all_rounds(&mut self, ctx: &CallContext, plan: &RoundPlan) -> Result<()> {
        self.ledger.require_owner(&ctx.caller)?;
        self.rounds.configure_all(plan)?;
        info!(rounds = plan.supplies.len(), "All rounds configured");
        Ok(())
    }

    // =================================================================
    // Vesting configuration
    // =================================================================

    /// Replace the whole schedule. Rejected once vesting has started.
    pub fn configure_vesting(&mut self, ctx: &CallContext, params: VestingParams) -> Result<()> {
        self.ledger.require_owner(&ctx.caller)?;
        self.vesting.configure(params)?;
        info!(
            margin = params.margin_duration,
            round = params.round_duration,
            rounds = params.total_rounds,
            "Vesting configured"
        );
        Ok(())
    }

    /// Dead period after start. Rejected once vesting has started.
    pub fn set_vesting_margin_duration(&mut self, ctx: &CallContext, seconds: Seconds) -> Result<()> {
        self.ledger.require_owner(&ctx.caller)?;
        self.vesting.set_margin_duration(seconds)?;
        info!(margin = seconds, "Vesting margin updated");
        Ok(())
    }

    /// Length of one unlock step. Rejected once vesting has started.
    pub fn set_vesting_round_duration(&mut self, ctx: &CallContext, seconds: Seconds) -> Result<()> {
        self.ledger.require_owner(&ctx.caller)?;
        self.vesting.set_round_duration(seconds)?;
        info!(round = seconds, "Vesting round duration updated");
        Ok(())
    }

    /// Number of unlock steps. Rejected once vesting has started.
    pub fn set_vesting_total_rounds(&mut self, ctx: &CallContext, rounds: u64) -> Result<()> {
        self.ledger.require_owner(&ctx.caller)?;
        self.vesting.set_total_rounds(rounds)?;
        info!(rounds, "Vesting round count updated");
        Ok(())
    }

    /// What a second `start_vesting` does.
    pub fn set_restart_policy(&mut self, ctx: &CallContext, policy: RestartPolicy) -> Result<()> {
        self.ledger.require_owner(&ctx.caller)?;
        self.vesting.set_restart_policy(policy);
        Ok(())
    }

    /// Start vesting automatically when the final round sells out.
    pub fn set_auto_start_vesting(&mut self, ctx: &CallContext, enabled: bool) -> Result<()> {
        self.ledger.require_owner(&ctx.caller)?;
        self.auto_start_vesting = enabled;
        Ok(())
    }

    /// Close the sale and start the unlock clock at `ctx.now`.
    pub fn start_vesting(&mut self, ctx: &CallContext) -> Result<()> {
        self.ledger.require_owner(&ctx.caller)?;
        self.vesting.start(ctx.now)?;
        info!(start_time = ctx.now, "Vesting started");
        Ok(())
    }

    // =================================================================
    // Credential configuration
    // =================================================================

    /// Key attestations must be signed with. `None` closes every credential-gated claim.
    pub fn set_trusted_signer(&mut self, ctx: &CallContext, signer: Option<SignerKey>) -> Result<()> {
        self.ledger.require_owner(&ctx.caller)?;
        self.gate.set_trusted_signer(signer)?;
        match signer {
            Some(key) => info!(signer = %key, "Trusted signer set"),
            None => info!("Trusted signer cleared"),
        }
        Ok(())
    }

    /// Assertions bound into every attestation.
    pub fn set_credential_policy(&mut self, ctx: &CallContext, policy: CredentialPolicy) -> Result<()> {
        self.ledger.require_owner(&ctx.caller)?;
        self.gate.set_policy(policy);
        Ok(())
    }

    // =================================================================
    // Reserve management
    // =================================================================

    /// Move `amount` of `asset` from the owner into the sale.
    ///
    /// Native deposits need at least `amount` attached. Asset deposits pull
    /// through the owner's allowance to the sale address.
    pub fn deposit_asset(
        &mut self,
        ctx: &CallContext,
        asset: InstrumentId,
        amount: Amount,
    ) -> Result<()> {
        self.ledger.require_owner(&ctx.caller)?;
        if asset.is_native() && ctx.value < amount {
            return Err(SaleError::InsufficientAmount {
                needed: amount,
                sent: ctx.value,
            });
        }
        let checkpoint = self.ledger.checkpoint(&ctx.caller);
        self.ledger.record_deposit(&asset, amount)?;
        let moved = if asset.is_native() {
            self.assets
                .transfer(&asset, &ctx.caller, &self.address, amount)
        } else {
            self.assets
                .transfer_from(&asset, &self.address, &ctx.caller, &self.address, amount)
        };
        if let Err(err) = moved {
            self.ledger.restore(checkpoint);
            return Err(err);
        }
        info!(asset = %asset, amount, "Reserve deposit");
        Ok(())
    }

    /// Deposit the configured sale asset.
    pub fn deposit_sale_asset(&mut self, ctx: &CallContext, amount: Amount) -> Result<()> {
        self.ledger.require_owner(&ctx.caller)?;
        let asset = self.ledger.require_sale_asset()?;
        self.deposit_asset(ctx, asset, amount)
    }

    /// Send `amount` of `asset` held by the sale to `to`.
    pub fn withdraw_asset(
        &mut self,
        ctx: &CallContext,
        asset: InstrumentId,
        to: Address,
        amount: Amount,
    ) -> Result<()> {
        self.ledger.require_owner(&ctx.caller)?;
        let checkpoint = self.ledger.checkpoint(&to);
        self.ledger.record_withdrawal(&asset, amount)?;
        if let Err(err) = self.assets.transfer(&asset, &self.address, &to, amount) {
            self.ledger.restore(checkpoint);
            return Err(err);
        }
        info!(asset = %asset, to = %to, amount, "Reserve withdrawal");
        Ok(())
    }

    // =================================================================
    // Purchases
    // =================================================================

    /// Pay `amount` of `instrument` and credit the quote to `recipient`.
    pub fn buy(
        &mut self,
        ctx: &CallContext,
        instrument: InstrumentId,
        recipient: Address,
        amount: Amount,
    ) -> Result<PurchaseReceipt> {
        self.ledger.require_active()?;
        if self.vesting.is_started() {
            return Err(SaleError::VestingStarted);
        }
        self.ledger.require_accepted(&instrument)?;
        let round = self.rounds.current().ok_or(SaleError::RoundsExhausted)?;

        let quoted = self
            .rate_engine()
            .quote(&instrument, amount, round.exchange_rate_bps)?;
        if quoted == 0 {
            return Err(SaleError::ZeroPurchase);
        }
        self.rounds.ensure_capacity(quoted)?;
        if instrument.is_native() && ctx.value < amount {
            return Err(SaleError::InsufficientAmount {
                needed: amount,
                sent: ctx.value,
            });
        }

        let checkpoint = self.ledger.checkpoint(&recipient);
        let rounds = self.rounds.clone();
        let vesting = self.vesting.clone();
        match self.commit_purchase(ctx, instrument, recipient, amount, quoted) {
            Ok(receipt) => Ok(receipt),
            Err(err) => {
                self.ledger.restore(checkpoint);
                self.rounds = rounds;
                self.vesting = vesting;
                Err(err)
            }
        }
    }

    /// The plain value-transfer entry point: buy with everything attached.
    pub fn receive_native(&mut self, ctx: &CallContext) -> Result<PurchaseReceipt> {
        self.buy(ctx, InstrumentId::Native, ctx.caller, ctx.value)
    }

    fn commit_purchase(
        &mut self,
        ctx: &CallContext,
        instrument: InstrumentId,
        recipient: Address,
        amount: Amount,
        quoted: Amount,
    ) -> Result<PurchaseReceipt> {
        let booking = self.rounds.book(quoted)?;
        let record = self.ledger.credit_purchase(&recipient, quoted)?;

        let vesting_started = booking.final_sold_out
            && self.auto_start_vesting
            && self.vesting.config().is_some()
            && !self.vesting.is_started();
        if vesting_started {
            self.vesting.start(ctx.now)?;
        }

        let paid = self.collect_payment(ctx, &instrument, amount)?;

        info!(
            buyer = %ctx.caller,
            recipient = %recipient,
            instrument = %instrument,
            paid,
            quoted,
            round = booking.round,
            bought = record.bought,
            "Purchase committed"
        );
        if vesting_started {
            info!(start_time = ctx.now, "Final round sold out, vesting started");
        }

        Ok(PurchaseReceipt {
            receipt_id: ReceiptId::new(),
            buyer: recipient,
            instrument,
            paid,
            quoted,
            round: booking.round,
            vesting_started,
            issued_at: ctx.now,
        })
    }

    /// Move the payment to the proceeds recipient, or keep it at the sale.
    fn collect_payment(
        &mut self,
        ctx: &CallContext,
        instrument: &InstrumentId,
        amount: Amount,
    ) -> Result<Amount> {
        let to = self.ledger.proceeds_recipient().unwrap_or(self.address);
        if instrument.is_native() {
            self.assets
                .transfer(instrument, &ctx.caller, &to, ctx.value)?;
            Ok(ctx.value)
        } else {
            self.assets
                .transfer_from(instrument, &self.address, &ctx.caller, &to, amount)?;
            Ok(amount)
        }
    }

    // =================================================================
    // Claims
    // =================================================================

    /// Pay `amount` of vested entitlement to `recipient`.
    ///
    /// The gate checks the *caller*; the debit and payout go to `recipient`.
    pub fn claim(
        &mut self,
        ctx: &CallContext,
        attestation: Option<&Attestation>,
        recipient: Address,
        amount: Amount,
    ) -> Result<ClaimReceipt> {
        self.ledger.require_active()?;
        self.gate.authorize(&ctx.caller, attestation, ctx.now)?;

        let claimable = self.claimable_of(&recipient, ctx.now)?;
        if amount > claimable {
            return Err(SaleError::ExceedsClaimable {
                requested: amount,
                claimable,
            });
        }
        let payout = self.ledger.require_sale_asset()?;

        let checkpoint = self.ledger.checkpoint(&recipient);
        let record = self.ledger.debit_claim(&recipient, amount)?;
        if let Err(err) = self
            .assets
            .transfer(&payout, &self.address, &recipient, amount)
        {
            self.ledger.restore(checkpoint);
            return Err(err);
        }

        info!(
            claimant = %ctx.caller,
            recipient = %recipient,
            amount,
            claimed = record.claimed,
            "Claim paid"
        );
        Ok(ClaimReceipt {
            receipt_id: ReceiptId::new(),
            recipient,
            claimant: ctx.caller,
            amount,
            claimed_total: record.claimed,
            issued_at: ctx.now,
        })
    }

    // =================================================================
    // Views
    // =================================================================

    #[must_use]
    pub fn address(&self) -> Address {
        self.address
    }

    #[must_use]
    pub fn owner(&self) -> Address {
        self.ledger.owner()
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.ledger.is_initialized()
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.ledger.is_paused()
    }

    #[must_use]
    pub fn is_accepted(&self, instrument: &InstrumentId) -> bool {
        self.ledger.is_accepted(instrument)
    }

    #[must_use]
    pub fn accepted_instruments(&self) -> Vec<InstrumentId> {
        self.ledger.accepted_instruments().copied().collect()
    }

    #[must_use]
    pub fn native_rate_bps(&self) -> u64 {
        self.ledger.native_rate_bps()
    }

    #[must_use]
    pub fn sale_asset(&self) -> Option<Address> {
        self.ledger.sale_asset()
    }

    #[must_use]
    pub fn proceeds_recipient(&self) -> Option<Address> {
        self.ledger.proceeds_recipient()
    }

    #[must_use]
    pub fn trusted_signer(&self) -> Option<SignerKey> {
        self.gate.trusted_signer()
    }

    #[must_use]
    pub fn accounting_of(&self, account: &Address) -> AccountingRecord {
        self.ledger.accounting_of(account)
    }

    /// Vested, unclaimed entitlement of `account` at `now`.
    pub fn claimable_of(&self, account: &Address, now: Timestamp) -> Result<Amount> {
        self.vesting
            .claimable(&self.ledger.accounting_of(account), now)
    }

    /// Terms and progress of round `index`.
    pub fn round_info(&self, index: usize) -> Result<RoundInfo> {
        self.rounds.round(index)
    }

    #[must_use]
    pub fn current_sale_info(&self) -> SaleInfo {
        self.rounds.sale_info()
    }

    /// Quote units raised across all rounds.
    pub fn total_raised(&self) -> Result<Amount> {
        self.rounds.total_raised()
    }

    #[must_use]
    pub fn vesting_config(&self) -> Option<VestingConfig> {
        self.vesting.config()
    }

    #[must_use]
    pub fn vesting_started(&self) -> bool {
        self.vesting.is_started()
    }

    /// What `amount` of `instrument` would buy in the current round.
    pub fn quote(&self, instrument: &InstrumentId, amount: Amount) -> Result<Amount> {
        let rate = self
            .rounds
            .current()
            .map_or(0, |round| round.exchange_rate_bps);
        self.rate_engine().quote(instrument, amount, rate)
    }

    /// Entitlement sold but not yet claimed.
    #[must_use]
    pub fn outstanding_entitlement(&self) -> Amount {
        self.ledger.reserve().outstanding()
    }

    /// Fail `ReserveShortfall` if the sale cannot pay everything it owes.
    pub fn verify_reserve(&self) -> Result<()> {
        let asset = self.ledger.require_sale_asset()?;
        let reserve = self.assets.balance_of(&asset, &self.address);
        self.ledger.reserve().verify_coverage(reserve)
    }

    #[must_use]
    pub fn status(&self) -> SaleStatus {
        let reserve = self.ledger.reserve();
        let sellable = self
            .rounds
            .current()
            .is_some_and(|round| round.is_configured());
        let phase = if !self.ledger.is_initialized() {
            SalePhase::Configuring
        } else if self.vesting.is_started() {
            if reserve.total_bought() > 0 && reserve.outstanding() == 0 {
                SalePhase::Drained
            } else {
                SalePhase::Vesting
            }
        } else if sellable {
            SalePhase::Selling
        } else {
            SalePhase::Configuring
        };
        let info = self.rounds.sale_info();
        SaleStatus {
            phase,
            paused: self.ledger.is_paused(),
            round: info.round,
            rounds: info.rounds,
            total_bought: reserve.total_bought(),
            total_claimed: reserve.total_claimed(),
        }
    }

    /// The asset ledger the sale moves value through.
    #[must_use]
    pub fn assets(&self) -> &A {
        &self.assets
    }

    /// Host access to the asset ledger (funding participants, approvals).
    pub fn assets_mut(&mut self) -> &mut A {
        &mut self.assets
    }

    fn rate_engine(&self) -> ExchangeRateEngine {
        ExchangeRateEngine::new(self.ledger.native_rate_bps())
    }
}
