use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised when an amount cannot be allocated.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AllocationError {
    #[error("cannot allocate {total} across zero participants")]
    NoParticipants { total: i64 },
    #[error("weight at position {index} is negative ({weight})")]
    NegativeWeight { index: usize, weight: Decimal },
    #[error("cannot allocate {total} when every weight is zero")]
    ZeroTotalWeight { total: i64 },
    #[error("allocation arithmetic overflowed")]
    Overflow,
    #[error("split for member {member} has no weight")]
    MissingWeight { member: String },
    #[error("exact split for member {member} has no amount")]
    MissingExactAmount { member: String },
    #[error("exact splits consume {consumed} of an item worth {item_total}")]
    ExactExceedsTotal { item_total: i64, consumed: i64 },
}

/// Split `total` into `n` shares that differ by at most one unit.
///
/// Every share starts at `floor(|total| / n)`; the `|total| mod n` leftover
/// units go one each to the first participants in input order. A negative
/// total is split by magnitude and the sign applied to every share.
///
/// # Examples
///
/// ```
/// use settle_engine::allocation::split_equal;
///
/// assert_eq!(split_equal(1000, 3).unwrap(), vec![334, 333, 333]);
/// assert_eq!(split_equal(-5, 2).unwrap(), vec![-3, -2]);
/// ```
pub fn split_equal(total: i64, n: usize) -> Result<Vec<i64>, AllocationError> {
    if n == 0 {
        return if total == 0 {
            Ok(Vec::new())
        } else {
            Err(AllocationError::NoParticipants { total })
        };
    }

    let magnitude = i128::from(total).abs();
    let count = n as i128;
    let base = magnitude / count;
    let leftover = (magnitude % count) as usize;

    (0..n)
        .map(|i| {
            let share = if i < leftover { base + 1 } else { base };
            signed_share(share, total)
        })
        .collect()
}

/// Split `total` proportionally to `weights` using the largest-remainder method.
///
/// Each share starts at `floor(|total| × wᵢ / Σw)`. The units lost to
/// flooring go one each to the participants with the largest fractional
/// remainder; equal remainders are resolved by ascending input position.
/// The shares always sum to exactly `total`.
///
/// Weights may be fractional. They are brought to a common scale and
/// handled as exact integers, so no binary floating point is involved.
///
/// # Examples
///
/// ```
/// use settle_engine::allocation::split_by_weights;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(split_by_weights(1001, &[dec!(1), dec!(2)]).unwrap(), vec![334, 667]);
/// assert_eq!(split_by_weights(100, &[dec!(0.5), dec!(1.5)]).unwrap(), vec![25, 75]);
/// ```
pub fn split_by_weights(total: i64, weights: &[Decimal]) -> Result<Vec<i64>, AllocationError> {
    for (index, weight) in weights.iter().enumerate() {
        if *weight < Decimal::ZERO {
            return Err(AllocationError::NegativeWeight {
                index,
                weight: *weight,
            });
        }
    }
    if weights.is_empty() {
        return if total == 0 {
            Ok(Vec::new())
        } else {
            Err(AllocationError::NoParticipants { total })
        };
    }

    let scaled = integer_weights(weights)?;
    let weight_sum = scaled
        .iter()
        .try_fold(0_i128, |acc, w| acc.checked_add(*w))
        .ok_or(AllocationError::Overflow)?;
    if weight_sum == 0 {
        return if total == 0 {
            Ok(vec![0; weights.len()])
        } else {
            Err(AllocationError::ZeroTotalWeight { total })
        };
    }

    let magnitude = i128::from(total).abs();
    let mut shares = Vec::with_capacity(scaled.len());
    // (remainder numerator, original index); all share the denominator weight_sum
    let mut remainders = Vec::with_capacity(scaled.len());
    let mut allocated = 0_i128;

    for (index, weight) in scaled.iter().enumerate() {
        let product = magnitude
            .checked_mul(*weight)
            .ok_or(AllocationError::Overflow)?;
        let share = product / weight_sum;
        allocated += share;
        shares.push(share);
        remainders.push((product % weight_sum, index));
    }

    let leftover = (magnitude - allocated) as usize;
    remainders.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
    for &(_, index) in remainders.iter().take(leftover) {
        shares[index] += 1;
    }

    shares
        .into_iter()
        .map(|share| signed_share(share, total))
        .collect()
}

/// Bring every weight to the largest scale present and return the mantissas.
fn integer_weights(weights: &[Decimal]) -> Result<Vec<i128>, AllocationError> {
    let max_scale = weights.iter().map(|w| w.scale()).max().unwrap_or(0);
    weights
        .iter()
        .map(|w| {
            10_i128
                .checked_pow(max_scale - w.scale())
                .and_then(|factor| w.mantissa().checked_mul(factor))
                .ok_or(AllocationError::Overflow)
        })
        .collect()
}

fn signed_share(magnitude: i128, total: i64) -> Result<i64, AllocationError> {
    let signed = if total < 0 { -magnitude } else { magnitude };
    i64::try_from(signed).map_err(|_| AllocationError::Overflow)
}
