//! Exchange-rate quoting.
//!
//! Converts a payment amount into quote units:
//!
//! ```text
//! native:  amount * native_rate * round_rate / BPM
//! asset:   amount * round_rate / BPM
//! ```
//!
//! Non-native instruments are pegged 1:1 to the quote unit. Integer division
//! truncates toward zero; the remainder stays with the seller.

use tokensale_types::{Amount, InstrumentId, Result, constants::BPM, math};
use tracing::debug;

/// Stateless converter from payment units to quote units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExchangeRateEngine {
    /// Native-value multiplier in basis points.
    pub native_rate_bps: u64,
}

impl ExchangeRateEngine {
    #[must_use]
    pub fn new(native_rate_bps: u64) -> Self {
        Self { native_rate_bps }
    }

    /// Quote `amount` of `instrument` at `round_rate_bps`.
    ///
    /// An unconfigured (zero) round rate quotes to zero rather than failing;
    /// callers reject zero purchases themselves.
    pub fn quote(
        &self,
        instrument: &InstrumentId,
        amount: Amount,
        round_rate_bps: u64,
    ) -> Result<Amount> {
        let rate = Amount::from(round_rate_bps);
        let quoted = match instrument {
            InstrumentId::Native => {
                let scaled = math::mul(amount, Amount::from(self.native_rate_bps))?;
                math::mul_div(scaled, rate, BPM)?
            }
            InstrumentId::Asset(_) => math::mul_div(amount, rate, BPM)?,
        };
        debug!(
            instrument = %instrument,
            amount,
            round_rate_bps,
            native_rate_bps = self.native_rate_bps,
            quoted,
            "Quoted purchase"
        );
        Ok(quoted)
    }
}

#[cfg(test)]
mod tests {
    use tokensale_types::{Address, SaleError};

    use super::*;

    fn usdt() -> InstrumentId {
        InstrumentId::Asset(Address::derive(b"usdt"))
    }

    #[test]
    fn native_quote_applies_both_rates() {
        let engine = ExchangeRateEngine::new(100);
        // 10 * 100 * 200_000 / 10_000
        assert_eq!(
            engine.quote(&InstrumentId::Native, 10, 200_000).unwrap(),
            20_000
        );
        assert_eq!(
            engine.quote(&InstrumentId::Native, 1_000, 200_000).unwrap(),
            2_000_000
        );
    }

    #[test]
    fn asset_quote_ignores_native_rate() {
        let engine = ExchangeRateEngine::new(100);
        assert_eq!(engine.quote(&usdt(), 10, 200_000).unwrap(), 200);
    }

    #[test]
    fn quote_truncates_toward_zero() {
        let engine = ExchangeRateEngine::new(1);
        // 3 * 3333 / 10000 = 0.9999
        assert_eq!(engine.quote(&usdt(), 3, 3_333).unwrap(), 0);
        // 7 * 15000 / 10000 = 10.5
        assert_eq!(engine.quote(&usdt(), 7, 15_000).unwrap(), 10);
    }

    #[test]
    fn zero_rate_quotes_zero() {
        let engine = ExchangeRateEngine::new(100);
        assert_eq!(engine.quote(&InstrumentId::Native, 1_000, 0).unwrap(), 0);
    }

    #[test]
    fn overflow_is_reported() {
        let engine = ExchangeRateEngine::new(u64::MAX);
        assert!(matches!(
            engine.quote(&InstrumentId::Native, Amount::MAX / 2, u64::MAX),
            Err(SaleError::ArithmeticOverflow)
        ));
    }
}
