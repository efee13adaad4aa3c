//! Fungible-asset interface and an in-memory implementation.
//!
//! The engine never owns asset balances. It talks to an [`AssetLedger`]
//! for every movement of value: pulling payments, paying out claims,
//! funding and draining the reserve. Native value is one more instrument.
//!
//! Every mutation is all-or-nothing: a failed transfer leaves every
//! balance and allowance untouched.

use std::collections::HashMap;

use tokensale_types::{Address, Amount, InstrumentId, Result, SaleError, math};

/// What the sale needs from the asset contracts it talks to.
pub trait AssetLedger {
    /// Balance of `holder` in `asset`.
    fn balance_of(&self, asset: &InstrumentId, holder: &Address) -> Amount;

    /// Move `amount` from `from` to `to`.
    fn transfer(
        &mut self,
        asset: &InstrumentId,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<()>;

    /// How much `spender` may pull from `owner`.
    fn allowance(&self, asset: &InstrumentId, owner: &Address, spender: &Address) -> Amount;

    /// Set `spender`'s allowance over `owner`'s balance.
    fn approve(
        &mut self,
        asset: &InstrumentId,
        owner: &Address,
        spender: &Address,
        amount: Amount,
    ) -> Result<()>;

    /// Pull `amount` from `from` to `to`, consuming `spender`'s allowance.
    fn transfer_from(
        &mut self,
        asset: &InstrumentId,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<()>;

    /// Create `amount` of `asset` for `to`.
    fn mint(&mut self, asset: &InstrumentId, to: &Address, amount: Amount) -> Result<()>;
}

/// In-memory balances and allowances for every instrument.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAssets {
    /// `(InstrumentId, holder) → balance`
    balances: HashMap<(InstrumentId, Address), Amount>,
    /// `(InstrumentId, owner, spender) → allowance`
    allowances: HashMap<(InstrumentId, Address, Address), Amount>,
}

impl InMemoryAssets {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sum of every holder's balance in `asset`.
    #[must_use]
    pub fn total_supply(&self, asset: &InstrumentId) -> Amount {
        self.balances
            .iter()
            .filter(|((a, _), _)| a == asset)
            .fold(0, |acc, (_, v)| acc.saturating_add(*v))
    }

    fn balance_mut(&mut self, asset: &InstrumentId, holder: &Address) -> &mut Amount {
        self.balances.entry((*asset, *holder)).or_default()
    }
}

impl AssetLedger for InMemoryAssets {
    fn balance_of(&self, asset: &InstrumentId, holder: &Address) -> Amount {
        self.balances
            .get(&(*asset, *holder))
            .copied()
            .unwrap_or_default()
    }

    fn transfer(
        &mut self,
        asset: &InstrumentId,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<()> {
        let available = self.balance_of(asset, from);
        if available < amount {
            return Err(SaleError::InsufficientBalance {
                asset: *asset,
                needed: amount,
                available,
            });
        }
        if from == to {
            return Ok(());
        }
        // Check the credit side before touching the debit side.
        let credited = math::add(self.balance_of(asset, to), amount)?;
        *self.balance_mut(asset, from) = available - amount;
        *self.balance_mut(asset, to) = credited;
        Ok(())
    }

    fn allowance(&self, asset: &InstrumentId, owner: &Address, spender: &Address) -> Amount {
        self.allowances
            .get(&(*asset, *owner, *spender))
            .copied()
            .unwrap_or_default()
    }

    fn approve(
        &mut self,
        asset: &InstrumentId,
        owner: &Address,
        spender: &Address,
        amount: Amount,
    ) -> Result<()> {
        self.allowances.insert((*asset, *owner, *spender), amount);
        Ok(())
    }

    fn transfer_from(
        &mut self,
        asset: &InstrumentId,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<()> {
        let allowed = self.allowance(asset, from, spender);
        if allowed < amount {
            return Err(SaleError::InsufficientAllowance {
                asset: *asset,
                needed: amount,
                available: allowed,
            });
        }
        self.transfer(asset, from, to, amount)?;
        self.allowances
            .insert((*asset, *from, *spender), allowed - amount);
        Ok(())
    }

    fn mint(&mut self, asset: &InstrumentId, to: &Address, amount: Amount) -> Result<()> {
        let minted = math::add(self.balance_of(asset, to), amount)?;
        *self.balance_mut(asset, to) = minted;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usdt() -> InstrumentId {
        InstrumentId::Asset(Address::derive(b"usdt"))
    }

    fn alice() -> Address {
        Address::derive(b"alice")
    }

    fn bob() -> Address {
        Address::derive(b"bob")
    }

    #[test]
    fn mint_and_balance() {
        let mut assets = InMemoryAssets::new();
        assert_eq!(assets.balance_of(&usdt(), &alice()), 0);
        assets.mint(&usdt(), &alice(), 1_000).unwrap();
        assert_eq!(assets.balance_of(&usdt(), &alice()), 1_000);
        assert_eq!(assets.balance_of(&InstrumentId::Native, &alice()), 0);
    }

    #[test]
    fn transfer_moves_value() {
        let mut assets = InMemoryAssets::new();
        assets.mint(&usdt(), &alice(), 1_000).unwrap();
        assets.transfer(&usdt(), &alice(), &bob(), 300).unwrap();
        assert_eq!(assets.balance_of(&usdt(), &alice()), 700);
        assert_eq!(assets.balance_of(&usdt(), &bob()), 300);
        assert_eq!(assets.total_supply(&usdt()), 1_000);
    }

    #[test]
    fn transfer_insufficient_leaves_state() {
        let mut assets = InMemoryAssets::new();
        assets.mint(&usdt(), &alice(), 100).unwrap();
        let err = assets.transfer(&usdt(), &alice(), &bob(), 101).unwrap_err();
        assert!(matches!(
            err,
            SaleError::InsufficientBalance {
                needed: 101,
                available: 100,
                ..
            }
        ));
        assert_eq!(assets.balance_of(&usdt(), &alice()), 100);
        assert_eq!(assets.balance_of(&usdt(), &bob()), 0);
    }

    #[test]
    fn self_transfer_is_noop() {
        let mut assets = InMemoryAssets::new();
        assets.mint(&usdt(), &alice(), 100).unwrap();
        assets.transfer(&usdt(), &alice(), &alice(), 100).unwrap();
        assert_eq!(assets.balance_of(&usdt(), &alice()), 100);
    }

    #[test]
    fn transfer_from_consumes_allowance() {
        let mut assets = InMemoryAssets::new();
        let sale = Address::derive(b"sale");
        assets.mint(&usdt(), &alice(), 1_000).unwrap();
        assets.approve(&usdt(), &alice(), &sale, 400).unwrap();

        assets
            .transfer_from(&usdt(), &sale, &alice(), &sale, 250)
            .unwrap();
        assert_eq!(assets.balance_of(&usdt(), &sale), 250);
        assert_eq!(assets.allowance(&usdt(), &alice(), &sale), 150);

        let err = assets
            .transfer_from(&usdt(), &sale, &alice(), &sale, 151)
            .unwrap_err();
        assert!(matches!(err, SaleError::InsufficientAllowance { .. }));
        assert_eq!(assets.allowance(&usdt(), &alice(), &sale), 150);
    }

    #[test]
    fn transfer_from_keeps_allowance_on_balance_failure() {
        let mut assets = InMemoryAssets::new();
        let sale = Address::derive(b"sale");
        assets.mint(&usdt(), &alice(), 10).unwrap();
        assets.approve(&usdt(), &alice(), &sale, 100).unwrap();
        assert!(
            assets
                .transfer_from(&usdt(), &sale, &alice(), &sale, 50)
                .is_err()
        );
        assert_eq!(assets.allowance(&usdt(), &alice(), &sale), 100);
    }

    #[test]
    fn mint_overflow_is_error() {
        let mut assets = InMemoryAssets::new();
        assets.mint(&usdt(), &alice(), Amount::MAX).unwrap();
        assert!(matches!(
            assets.mint(&usdt(), &alice(), 1),
            Err(SaleError::ArithmeticOverflow)
        ));
    }
}
