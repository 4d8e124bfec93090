use proptest::prelude::*;
use rust_decimal::Decimal;
use settle_engine::allocation::{allocate_item, split_by_weights, split_equal};
use settle_engine::balance::{GroupBalances, GroupSnapshot};
use settle_engine::config::ResidualPolicy;
use settle_engine::core::currency::CurrencyCode;
use settle_engine::core::expense::{Expense, ExpenseItem, Payer, Split};
use settle_engine::core::group::{Group, Member};
use settle_engine::core::ids::{ExpenseId, GroupId, ItemId, MemberId};
use settle_engine::core::settlement::{Settlement, SettlementStatus};
use settle_engine::optimization::apply_debts;

const MEMBERS: [&str; 5] = ["a", "b", "c", "d", "e"];

/// A member index into [`MEMBERS`].
fn arb_member() -> impl Strategy<Value = usize> {
    0..MEMBERS.len()
}

/// A weight between 0.0 and 9.9; zeros are allowed as long as one is positive.
fn arb_weight() -> impl Strategy<Value = Decimal> {
    (0i64..100).prop_map(|w| Decimal::new(w, 1))
}

/// Split rule for one participant: 0 = equal, 1 = weighted, 2 = exact.
#[derive(Debug, Clone)]
struct SplitRule {
    member: usize,
    mode: u8,
    weight: Decimal,
}

fn arb_split_rule() -> impl Strategy<Value = SplitRule> {
    (arb_member(), 0u8..3, (1i64..50).prop_map(|w| Decimal::new(w, 1)))
        .prop_map(|(member, mode, weight)| SplitRule {
            member,
            mode,
            weight,
        })
}

/// One expense: item total, payer, and at least one split rule.
#[derive(Debug, Clone)]
struct ExpensePlan {
    total: i64,
    payer: usize,
    rules: Vec<SplitRule>,
    deleted: bool,
}

fn arb_expense() -> impl Strategy<Value = ExpensePlan> {
    (
        1i64..1_000_000,
        arb_member(),
        prop::collection::vec(arb_split_rule(), 1..6),
        prop::bool::weighted(0.1),
    )
        .prop_map(|(total, payer, rules, deleted)| ExpensePlan {
            total,
            payer,
            rules,
            deleted,
        })
}

fn arb_settlement() -> impl Strategy<Value = (usize, usize, i64, bool)> {
    (arb_member(), arb_member(), 1i64..500_000, any::<bool>())
}

/// Build a snapshot from plans. Exact rules claim a tenth of the item each,
/// and at least one rule per item is non-exact, so every cent is attributed.
fn build_snapshot(
    expenses: &[ExpensePlan],
    settlements: &[(usize, usize, i64, bool)],
) -> GroupSnapshot {
    let gid = GroupId::new("prop");
    let mut snap = GroupSnapshot::new(Group::new(gid.clone(), CurrencyCode::new("USD")));
    for id in MEMBERS {
        snap.members.push(Member::new(id, gid.clone(), id));
    }

    for (n, plan) in expenses.iter().enumerate() {
        let expense = ExpenseId::new(format!("e{n}"));
        let item = ItemId::new(format!("e{n}-i"));
        let mut expense_row = Expense::new(expense.clone(), gid.clone(), plan.total);
        if plan.deleted {
            expense_row = expense_row.with_deleted_at(chrono::Utc::now());
        }
        snap.expenses.push(expense_row);
        snap.items
            .push(ExpenseItem::new(item.clone(), expense.clone(), plan.total, 1));
        snap.payers.push(Payer::new(
            expense,
            MemberId::new(MEMBERS[plan.payer]),
            plan.total,
        ));

        let last = plan.rules.len() - 1;
        for (i, rule) in plan.rules.iter().enumerate() {
            let member = MemberId::new(MEMBERS[rule.member]);
            let split = match rule.mode {
                2 if i != last => Split::exact(item.clone(), member, plan.total / 10),
                1 => Split::weighted(item.clone(), member, rule.weight),
                _ => Split::equal(item.clone(), member),
            };
            snap.splits.push(split);
        }
    }

    for &(from, to, amount, confirmed) in settlements {
        let status = if confirmed {
            SettlementStatus::Confirmed
        } else {
            SettlementStatus::Pending
        };
        snap.settlements.push(Settlement::new(
            gid.clone(),
            MemberId::new(MEMBERS[from]),
            MemberId::new(MEMBERS[to]),
            amount,
            status,
        ));
    }
    snap
}

fn arb_snapshot() -> impl Strategy<Value = GroupSnapshot> {
    (
        prop::collection::vec(arb_expense(), 0..25),
        prop::collection::vec(arb_settlement(), 0..10),
    )
        .prop_map(|(expenses, settlements)| build_snapshot(&expenses, &settlements))
}

proptest! {
    // ===================================================================
    // INVARIANT 1: Equal splits preserve the total.
    //
    // Shares differ by at most one unit, and the extra units go to the
    // first participants.
    // ===================================================================
    #[test]
    fn split_equal_preserves_total(total in -10_000_000i64..10_000_000, n in 1usize..40) {
        let shares = split_equal(total, n).unwrap();
        prop_assert_eq!(shares.len(), n);
        prop_assert_eq!(shares.iter().sum::<i64>(), total);

        let max = *shares.iter().max().unwrap();
        let min = *shares.iter().min().unwrap();
        prop_assert!(max - min <= 1);
        prop_assert!(shares.windows(2).all(|w| w[0].abs() >= w[1].abs()));
    }

    // ===================================================================
    // INVARIANT 2: Weighted splits preserve the total.
    //
    // Every share is within one unit of its exact proportional value.
    // ===================================================================
    #[test]
    fn split_by_weights_preserves_total(
        total in -10_000_000i64..10_000_000,
        weights in prop::collection::vec(arb_weight(), 1..20),
    ) {
        prop_assume!(weights.iter().any(|w| *w > Decimal::ZERO));
        let shares = split_by_weights(total, &weights).unwrap();
        prop_assert_eq!(shares.len(), weights.len());
        prop_assert_eq!(shares.iter().sum::<i64>(), total);

        let weight_sum: Decimal = weights.iter().sum();
        for (share, weight) in shares.iter().zip(&weights) {
            let exact = Decimal::from(total) * weight / weight_sum;
            prop_assert!((Decimal::from(*share) - exact).abs() < Decimal::ONE);
        }
    }

    // ===================================================================
    // INVARIANT 3: A negative weight is always rejected.
    // ===================================================================
    #[test]
    fn negative_weight_rejected(
        total in 1i64..1_000_000,
        mut weights in prop::collection::vec(arb_weight(), 1..10),
        at in any::<prop::sample::Index>(),
    ) {
        let i = at.index(weights.len());
        weights[i] = -weights[i] - Decimal::ONE;
        prop_assert!(split_by_weights(total, &weights).is_err());
    }

    // ===================================================================
    // INVARIANT 4: Item allocation attributes every cent when at least
    // one equal split exists.
    // ===================================================================
    #[test]
    fn allocate_item_attributes_everything(
        total in 0i64..1_000_000,
        exact_count in 0usize..4,
        equal_count in 1usize..5,
    ) {
        let item = ItemId::new("i");
        let mut splits = Vec::new();
        for k in 0..exact_count {
            splits.push(Split::exact(item.clone(), MemberId::new(format!("x{k}")), total / 8));
        }
        for k in 0..equal_count {
            splits.push(Split::equal(item.clone(), MemberId::new(format!("q{k}"))));
        }

        let allocation = allocate_item(total, &splits).unwrap();
        prop_assert_eq!(allocation.unattributed, 0);
        prop_assert_eq!(allocation.shares.iter().map(|(_, s)| s).sum::<i64>(), total);
    }

    // ===================================================================
    // INVARIANT 5: Group balances are zero-sum.
    //
    // For any mix of splits, deleted expenses and settlements, the
    // member nets sum to exactly zero and no residual correction is needed.
    // ===================================================================
    #[test]
    fn balances_are_zero_sum(snap in arb_snapshot()) {
        let balances = GroupBalances::compute(&snap, ResidualPolicy::default()).unwrap();
        prop_assert!(balances.is_balanced());
        prop_assert_eq!(balances.rounding_residual_minor_units, 0);
    }

    // ===================================================================
    // INVARIANT 6: Simplified debts re-zero every member, with at most
    // one transfer fewer than the number of non-zero members.
    // ===================================================================
    #[test]
    fn debts_rezero_balances(snap in arb_snapshot()) {
        let balances = GroupBalances::compute(&snap, ResidualPolicy::default()).unwrap();
        for (member, remaining) in apply_debts(&balances.member_balances, &balances.simplified_debts) {
            prop_assert_eq!(remaining, 0, "{} left unsettled", member);
        }

        let non_zero = balances
            .member_balances
            .iter()
            .filter(|b| b.net_balance_minor_units != 0)
            .count();
        prop_assert!(balances.simplified_debts.len() <= non_zero.saturating_sub(1));
        prop_assert!(balances.simplified_debts.iter().all(|d| d.amount_minor_units > 0));
    }

    // ===================================================================
    // INVARIANT 7: A confirmed settlement of X from A to B raises A's net
    // by X and lowers B's by X. Nobody else moves.
    // ===================================================================
    #[test]
    fn settlement_shifts_net(
        snap in arb_snapshot(),
        from in arb_member(),
        to in arb_member(),
        amount in 1i64..1_000_000,
    ) {
        prop_assume!(from != to);
        let before = GroupBalances::compute(&snap, ResidualPolicy::default()).unwrap();

        let mut with_settlement = snap.clone();
        with_settlement.settlements.push(Settlement::confirmed(
            snap.group.id.clone(),
            MemberId::new(MEMBERS[from]),
            MemberId::new(MEMBERS[to]),
            amount,
        ));
        let after = GroupBalances::compute(&with_settlement, ResidualPolicy::default()).unwrap();

        for (b, a) in before.member_balances.iter().zip(&after.member_balances) {
            let delta = a.net_balance_minor_units - b.net_balance_minor_units;
            let expected = if b.member_id.as_str() == MEMBERS[from] {
                amount
            } else if b.member_id.as_str() == MEMBERS[to] {
                -amount
            } else {
                0
            };
            prop_assert_eq!(delta, expected);
        }
    }

    // ===================================================================
    // INVARIANT 8: Computation is deterministic.
    // ===================================================================
    #[test]
    fn compute_is_deterministic(snap in arb_snapshot()) {
        let first = GroupBalances::compute(&snap, ResidualPolicy::Proportional).unwrap();
        let second = GroupBalances::compute(&snap, ResidualPolicy::Proportional).unwrap();
        prop_assert_eq!(first.member_balances, second.member_balances);
        prop_assert_eq!(first.simplified_debts, second.simplified_debts);
    }
}
