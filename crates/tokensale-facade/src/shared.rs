//! Serialized access for multi-threaded hosts.
//!
//! Every facade operation takes `&mut self`, so calls on one sale are
//! already sequential. [`SharedSale`] keeps that guarantee when a host
//! hands the same sale to several threads: each call holds the lock for
//! its whole duration, checks through commit.

use std::sync::Arc;

use parking_lot::Mutex;
use tokensale_ledger::AssetLedger;
use tokensale_schedule::{RoundPolicy, VestingPolicy};
use tokensale_types::{
    Address, Amount, Attestation, CallContext, ClaimReceipt, InstrumentId, PurchaseReceipt,
    Result, Timestamp,
};

use crate::{ClaimGate, SaleFacade, SaleStatus};

/// A cloneable handle to one sale behind a mutex.
#[derive(Debug)]
pub struct SharedSale<R, V, G, A> {
    inner: Arc<Mutex<SaleFacade<R, V, G, A>>>,
}

impl<R, V, G, A> Clone for SharedSale<R, V, G, A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R, V, G, A> SharedSale<R, V, G, A>
where
    R: RoundPolicy,
    V: VestingPolicy,
    G: ClaimGate,
    A: AssetLedger,
{
    pub fn new(sale: SaleFacade<R, V, G, A>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(sale)),
        }
    }

    /// Run `f` with exclusive access to the sale.
    pub fn with<T>(&self, f: impl FnOnce(&mut SaleFacade<R, V, G, A>) -> T) -> T {
        let mut sale = self.inner.lock();
        f(&mut sale)
    }

    /// Run a read-only `f` against the sale.
    pub fn read<T>(&self, f: impl FnOnce(&SaleFacade<R, V, G, A>) -> T) -> T {
        let sale = self.inner.lock();
        f(&sale)
    }

    pub fn buy(
        &self,
        ctx: &CallContext,
        instrument: InstrumentId,
        recipient: Address,
        amount: Amount,
    ) -> Result<PurchaseReceipt> {
        self.with(|sale| sale.buy(ctx, instrument, recipient, amount))
    }

    pub fn claim(
        &self,
        ctx: &CallContext,
        attestation: Option<&Attestation>,
        recipient: Address,
        amount: Amount,
    ) -> Result<ClaimReceipt> {
        self.with(|sale| sale.claim(ctx, attestation, recipient, amount))
    }

    pub fn claimable_of(&self, account: &Address, now: Timestamp) -> Result<Amount> {
        self.read(|sale| sale.claimable_of(account, now))
    }

    #[must_use]
    pub fn status(&self) -> SaleStatus {
        self.read(SaleFacade::status)
    }
}
