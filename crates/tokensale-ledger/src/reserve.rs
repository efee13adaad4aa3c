//! Reserve coverage and conservation totals.
//!
//! ```text
//! outstanding = Σ bought − Σ claimed
//! reserve(sale_asset) >= outstanding
//! ```
//!
//! The sale must always be able to pay every participant everything they
//! bought. Deposits and withdrawals per instrument are kept as an audit
//! trail of reserve management.

use std::collections::HashMap;

use tokensale_types::{Amount, InstrumentId, Result, SaleError, math};

/// Running totals behind the coverage check.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReserveBook {
    total_bought: Amount,
    total_claimed: Amount,
    deposits: HashMap<InstrumentId, Amount>,
    withdrawals: HashMap<InstrumentId, Amount>,
}

impl ReserveBook {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_purchase(&mut self, quoted: Amount) -> Result<()> {
        self.total_bought = math::add(self.total_bought, quoted)?;
        Ok(())
    }

    pub fn record_claim(&mut self, amount: Amount) -> Result<()> {
        let claimed = math::add(self.total_claimed, amount)?;
        if claimed > self.total_bought {
            return Err(SaleError::Internal(format!(
                "claimed total {claimed} would exceed bought total {}",
                self.total_bought
            )));
        }
        self.total_claimed = claimed;
        Ok(())
    }

    pub fn record_deposit(&mut self, asset: &InstrumentId, amount: Amount) -> Result<()> {
        let entry = self.deposits.entry(*asset).or_default();
        *entry = math::add(*entry, amount)?;
        Ok(())
    }

    pub fn record_withdrawal(&mut self, asset: &InstrumentId, amount: Amount) -> Result<()> {
        let entry = self.withdrawals.entry(*asset).or_default();
        *entry = math::add(*entry, amount)?;
        Ok(())
    }

    #[must_use]
    pub fn total_bought(&self) -> Amount {
        self.total_bought
    }

    #[must_use]
    pub fn total_claimed(&self) -> Amount {
        self.total_claimed
    }

    /// Entitlement sold but not yet paid out.
    #[must_use]
    pub fn outstanding(&self) -> Amount {
        self.total_bought.saturating_sub(self.total_claimed)
    }

    #[must_use]
    pub fn total_deposits(&self, asset: &InstrumentId) -> Amount {
        self.deposits.get(asset).copied().unwrap_or_default()
    }

    #[must_use]
    pub fn total_withdrawals(&self, asset: &InstrumentId) -> Amount {
        self.withdrawals.get(asset).copied().unwrap_or_default()
    }

    /// Fail with `ReserveShortfall` if `reserve` cannot cover what is owed.
    pub fn verify_coverage(&self, reserve: Amount) -> Result<()> {
        let outstanding = self.outstanding();
        if reserve < outstanding {
            return Err(SaleError::ReserveShortfall {
                outstanding,
                reserve,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tokensale_types::Address;

    use super::*;

    #[test]
    fn empty_book_is_covered() {
        let book = ReserveBook::new();
        assert_eq!(book.outstanding(), 0);
        assert!(book.verify_coverage(0).is_ok());
    }

    #[test]
    fn outstanding_tracks_purchases_and_claims() {
        let mut book = ReserveBook::new();
        book.record_purchase(1_000).unwrap();
        book.record_purchase(500).unwrap();
        book.record_claim(300).unwrap();
        assert_eq!(book.total_bought(), 1_500);
        assert_eq!(book.total_claimed(), 300);
        assert_eq!(book.outstanding(), 1_200);
    }

    #[test]
    fn shortfall_detected() {
        let mut book = ReserveBook::new();
        book.record_purchase(1_000).unwrap();
        assert!(book.verify_coverage(1_000).is_ok());
        assert!(matches!(
            book.verify_coverage(999),
            Err(SaleError::ReserveShortfall {
                outstanding: 1_000,
                reserve: 999
            })
        ));
    }

    #[test]
    fn claim_beyond_bought_is_internal_error() {
        let mut book = ReserveBook::new();
        book.record_purchase(10).unwrap();
        assert!(matches!(book.record_claim(11), Err(SaleError::Internal(_))));
        assert_eq!(book.total_claimed(), 0);
    }

    #[test]
    fn deposits_and_withdrawals_per_asset() {
        let mut book = ReserveBook::new();
        let flash = InstrumentId::Asset(Address::derive(b"flash"));
        book.record_deposit(&flash, 1_000).unwrap();
        book.record_deposit(&flash, 500).unwrap();
        book.record_withdrawal(&flash, 200).unwrap();
        assert_eq!(book.total_deposits(&flash), 1_500);
        assert_eq!(book.total_withdrawals(&flash), 200);
        assert_eq!(book.total_deposits(&InstrumentId::Native), 0);
    }
}
