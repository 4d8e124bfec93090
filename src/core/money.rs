//! Fixed-point conversion between decimal amounts and integer minor units.
//!
//! Every sum the engine computes is accumulated in `i64` minor units
//! (cents for most currencies). Decimal values only exist at the edges: when
//! an amount is read from outside the engine, and when a balance is handed
//! back to a caller.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;
use thiserror::Error;

/// Minor-unit scale used by [`to_cents`] and [`from_cents`].
pub const CENTS_SCALE: u32 = 2;

/// Largest scale whose minor units still fit comfortably in an `i64`.
pub const MAX_MINOR_UNIT_SCALE: u32 = 18;

/// Errors arising from decimal ⇄ minor-unit conversion.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MoneyError {
    #[error("malformed amount '{input}': {reason}")]
    Malformed { input: String, reason: String },
    #[error("amount {amount} is out of range for scale {scale}")]
    OutOfRange { amount: Decimal, scale: u32 },
    #[error("minor unit scale {scale} is not supported (max {max})")]
    UnsupportedScale { scale: u32, max: u32 },
}

/// Convert a decimal amount to integer cents, rounding to the nearest cent.
///
/// Midpoints round away from zero, so `0.005` becomes `1` and `-0.005`
/// becomes `-1`. The sign is preserved.
///
/// # Examples
///
/// ```
/// use settle_engine::core::money::to_cents;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(to_cents(dec!(12.34)).unwrap(), 1234);
/// assert_eq!(to_cents(dec!(-0.015)).unwrap(), -2);
/// ```
pub fn to_cents(amount: Decimal) -> Result<i64, MoneyError> {
    to_minor_units(amount, CENTS_SCALE)
}

/// Convert integer cents back to a decimal amount.
pub fn from_cents(cents: i64) -> Decimal {
    Decimal::new(cents, CENTS_SCALE)
}

/// Convert a decimal amount to integer minor units at the given scale.
pub fn to_minor_units(amount: Decimal, scale: u32) -> Result<i64, MoneyError> {
    validate_scale(scale)?;
    let rounded = amount.round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero);
    let factor = Decimal::from(10_i64.pow(scale));
    rounded
        .checked_mul(factor)
        .and_then(|units| units.to_i64())
        .ok_or(MoneyError::OutOfRange { amount, scale })
}

/// Convert integer minor units at the given scale back to a decimal amount.
pub fn from_minor_units(units: i64, scale: u32) -> Result<Decimal, MoneyError> {
    validate_scale(scale)?;
    Ok(Decimal::new(units, scale))
}

/// Parse a boundary amount string such as `"12.50"` or `"-3"`.
pub fn parse_amount(input: &str) -> Result<Decimal, MoneyError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(MoneyError::Malformed {
            input: input.to_string(),
            reason: "empty string".to_string(),
        });
    }
    Decimal::from_str(trimmed).map_err(|e| MoneyError::Malformed {
        input: input.to_string(),
        reason: e.to_string(),
    })
}

fn validate_scale(scale: u32) -> Result<(), MoneyError> {
    if scale > MAX_MINOR_UNIT_SCALE {
        return Err(MoneyError::UnsupportedScale {
            scale,
            max: MAX_MINOR_UNIT_SCALE,
        });
    }
    Ok(())
}
