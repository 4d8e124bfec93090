use crate::allocation::proportional::{split_by_weights, AllocationError};
use crate::core::expense::{ShareMode, Split};
use crate::core::ids::MemberId;
use rust_decimal::Decimal;

/// How one item's total was divided among its split rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemAllocation {
    /// One entry per split row, in input order. A member with several rows
    /// on the same item appears once per row.
    pub shares: Vec<(MemberId, i64)>,
    /// Amount no split claimed. Non-zero only when an item has no
    /// equal/weight rows left to absorb what the exact rows did not consume.
    pub unattributed: i64,
}

/// Divide `item_total` among `splits` in two explicit passes.
///
/// 1. Exact rows take their fixed amounts; the consumed sum is tracked.
/// 2. Whatever remains goes through [`split_by_weights`] over the equal and
///    weight rows, in input order (equal rows weigh 1).
///
/// Exact rows may not consume more than the item is worth, and may not
/// pull against the item's sign.
///
/// # Examples
///
/// ```
/// use settle_engine::allocation::allocate_item;
/// use settle_engine::core::expense::Split;
/// use settle_engine::core::ids::{ItemId, MemberId};
///
/// let item = ItemId::new("pizza");
/// let splits = vec![
///     Split::exact(item.clone(), MemberId::new("ana"), 400),
///     Split::equal(item.clone(), MemberId::new("ben")),
///     Split::equal(item, MemberId::new("cy")),
/// ];
/// let allocation = allocate_item(1001, &splits).unwrap();
/// let amounts: Vec<i64> = allocation.shares.iter().map(|(_, a)| *a).collect();
/// assert_eq!(amounts, vec![400, 301, 300]);
/// ```
pub fn allocate_item(item_total: i64, splits: &[Split]) -> Result<ItemAllocation, AllocationError> {
    let mut shares: Vec<Option<i64>> = vec![None; splits.len()];

    let consumed = apply_exact_splits(item_total, splits, &mut shares)?;
    let remainder = item_total - consumed;

    let weighted: Vec<(usize, Decimal)> = splits
        .iter()
        .enumerate()
        .filter_map(|(position, split)| match split.share_mode {
            ShareMode::Exact => None,
            ShareMode::Equal => Some(Ok((position, Decimal::ONE))),
            ShareMode::Weight => Some(
                split
                    .weight
                    .map(|w| (position, w))
                    .ok_or_else(|| AllocationError::MissingWeight {
                        member: split.member_id.to_string(),
                    }),
            ),
        })
        .collect::<Result<_, _>>()?;

    let unattributed = if weighted.is_empty() {
        remainder
    } else {
        let weights: Vec<Decimal> = weighted.iter().map(|(_, w)| *w).collect();
        let amounts = split_by_weights(remainder, &weights)?;
        for ((position, _), amount) in weighted.iter().zip(amounts) {
            shares[*position] = Some(amount);
        }
        0
    };

    Ok(ItemAllocation {
        shares: splits
            .iter()
            .zip(shares)
            .map(|(split, amount)| (split.member_id.clone(), amount.unwrap_or(0)))
            .collect(),
        unattributed,
    })
}

/// First pass: fixed amounts. Returns the total consumed.
fn apply_exact_splits(
    item_total: i64,
    splits: &[Split],
    shares: &mut [Option<i64>],
) -> Result<i64, AllocationError> {
    let mut consumed: i64 = 0;
    for (position, split) in splits.iter().enumerate() {
        if split.share_mode != ShareMode::Exact {
            continue;
        }
        let amount = split
            .exact_amount_minor_units
            .ok_or_else(|| AllocationError::MissingExactAmount {
                member: split.member_id.to_string(),
            })?;
        consumed = consumed.checked_add(amount).ok_or(AllocationError::Overflow)?;
        if amount.signum() * item_total.signum() < 0
            || i128::from(consumed).abs() > i128::from(item_total).abs()
        {
            return Err(AllocationError::ExactExceedsTotal {
                item_total,
                consumed,
            });
        }
        shares[position] = Some(amount);
    }
    Ok(consumed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ids::ItemId;
    use rust_decimal_macros::dec;

    fn item() -> ItemId {
        ItemId::new("item")
    }

    fn m(name: &str) -> MemberId {
        MemberId::new(name)
    }

    fn amounts(allocation: &ItemAllocation) -> Vec<i64> {
        allocation.shares.iter().map(|(_, a)| *a).collect()
    }

    #[test]
    fn test_equal_only() {
        let splits = vec![
            Split::equal(item(), m("a")),
            Split::equal(item(), m("b")),
            Split::equal(item(), m("c")),
        ];
        let allocation = allocate_item(9000, &splits).unwrap();
        assert_eq!(amounts(&allocation), vec![3000, 3000, 3000]);
        assert_eq!(allocation.unattributed, 0);
    }

    #[test]
    fn test_weighted() {
        let splits = vec![
            Split::weighted(item(), m("x"), dec!(2)),
            Split::weighted(item(), m("y"), dec!(1)),
        ];
        let allocation = allocate_item(15000, &splits).unwrap();
        assert_eq!(amounts(&allocation), vec![10000, 5000]);
    }

    #[test]
    fn test_exact_first_then_weights_regardless_of_row_order() {
        let splits = vec![
            Split::equal(item(), m("a")),
            Split::exact(item(), m("b"), 500),
            Split::equal(item(), m("c")),
        ];
        let allocation = allocate_item(1501, &splits).unwrap();
        assert_eq!(amounts(&allocation), vec![501, 500, 500]);
        assert_eq!(allocation.shares[1].0, m("b"));
    }

    #[test]
    fn test_equal_and_weight_rows_mix() {
        let splits = vec![
            Split::equal(item(), m("a")),
            Split::weighted(item(), m("b"), dec!(3)),
        ];
        let allocation = allocate_item(400, &splits).unwrap();
        assert_eq!(amounts(&allocation), vec![100, 300]);
    }

    #[test]
    fn test_only_exact_leaves_remainder_unattributed() {
        let splits = vec![
            Split::exact(item(), m("a"), 300),
            Split::exact(item(), m("b"), 200),
        ];
        let allocation = allocate_item(600, &splits).unwrap();
        assert_eq!(amounts(&allocation), vec![300, 200]);
        assert_eq!(allocation.unattributed, 100);
    }

    #[test]
    fn test_no_splits() {
        let allocation = allocate_item(750, &[]).unwrap();
        assert!(allocation.shares.is_empty());
        assert_eq!(allocation.unattributed, 750);
    }

    #[test]
    fn test_exact_exceeding_item_rejected() {
        let splits = vec![
            Split::exact(item(), m("a"), 300),
            Split::exact(item(), m("b"), 301),
        ];
        assert_eq!(
            allocate_item(600, &splits),
            Err(AllocationError::ExactExceedsTotal {
                item_total: 600,
                consumed: 601
            })
        );
    }

    #[test]
    fn test_missing_weight_rejected() {
        let mut split = Split::weighted(item(), m("a"), dec!(1));
        split.weight = None;
        assert_eq!(
            allocate_item(100, &[split]),
            Err(AllocationError::MissingWeight {
                member: "a".to_string()
            })
        );
    }

    #[test]
    fn test_negative_weight_propagates() {
        let splits = vec![
            Split::weighted(item(), m("a"), dec!(1)),
            Split::weighted(item(), m("b"), dec!(-2)),
        ];
        assert!(matches!(
            allocate_item(100, &splits),
            Err(AllocationError::NegativeWeight { index: 1, .. })
        ));
    }

    #[test]
    fn test_refund_item() {
        let splits = vec![Split::equal(item(), m("a")), Split::equal(item(), m("b"))];
        let allocation = allocate_item(-301, &splits).unwrap();
        assert_eq!(amounts(&allocation), vec![-151, -150]);
    }
}
