//! Checked fixed-ratio arithmetic on [`Amount`]s.
//!
//! Every helper fails with [`SaleError::ArithmeticOverflow`] instead of
//! wrapping. Division truncates toward zero; the remainder is dropped.

use crate::{Amount, Result, SaleError};

/// `a + b`
pub fn add(a: Amount, b: Amount) -> Result<Amount> {
    a.checked_add(b).ok_or(SaleError::ArithmeticOverflow)
}

/// `a - b`
pub fn sub(a: Amount, b: Amount) -> Result<Amount> {
    a.checked_sub(b).ok_or(SaleError::ArithmeticOverflow)
}

/// `a * b`
pub fn mul(a: Amount, b: Amount) -> Result<Amount> {
    a.checked_mul(b).ok_or(SaleError::ArithmeticOverflow)
}

/// `value * numerator / denominator`, truncating.
///
/// A zero denominator is reported as overflow; callers validate their
/// denominators at configuration time.
pub fn mul_div(value: Amount, numerator: Amount, denominator: Amount) -> Result<Amount> {
    if denominator == 0 {
        return Err(SaleError::ArithmeticOverflow);
    }
    Ok(mul(value, numerator)? / denominator)
}
