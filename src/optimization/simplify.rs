use crate::core::ids::MemberId;
use crate::core::ledger::MemberBalance;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A suggested payment: `from_member_id` pays `to_member_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimplifiedDebt {
    pub from_member_id: MemberId,
    pub to_member_id: MemberId,
    pub amount_minor_units: i64,
}

/// Summary of a simplification run, for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimplificationStats {
    /// Sum of all negative nets, i.e. the total that has to change hands.
    pub gross_owed_minor_units: i64,
    pub creditor_count: usize,
    pub debtor_count: usize,
    pub transfer_count: usize,
}

impl SimplificationStats {
    pub fn from_result(balances: &[MemberBalance], debts: &[SimplifiedDebt]) -> Self {
        let gross_owed_minor_units = balances
            .iter()
            .filter(|b| b.net_balance_minor_units < 0)
            .map(|b| b.net_balance_minor_units.saturating_neg())
            .fold(0_i64, i64::saturating_add);
        Self {
            gross_owed_minor_units,
            creditor_count: balances
                .iter()
                .filter(|b| b.net_balance_minor_units > 0)
                .count(),
            debtor_count: balances
                .iter()
                .filter(|b| b.net_balance_minor_units < 0)
                .count(),
            transfer_count: debts.len(),
        }
    }
}

/// Reduces net balances to a short list of settling transfers.
///
/// The goal is to re-zero every member with few payments, not to
/// reconstruct who originally owed whom.
pub struct DebtSimplifier;

impl DebtSimplifier {
    /// Greedy largest-to-largest matching.
    ///
    /// # Algorithm
    ///
    /// 1. Split members into creditors (net > 0) and debtors (net < 0, kept
    ///    as a positive magnitude).
    /// 2. Sort both lists by magnitude, largest first. The sort is stable,
    ///    so equal magnitudes keep member order.
    /// 3. Transfer `min(creditor, debtor)` from the current debtor to the
    ///    current creditor, and move past whichever side reaches zero.
    /// 4. Stop when either list runs out. For a zero-sum input both run out
    ///    together.
    ///
    /// At most `creditors + debtors − 1` transfers are produced. This is not
    /// a proven minimum for every distribution, but it is for the common case.
    pub fn simplify(balances: &[MemberBalance]) -> Vec<SimplifiedDebt> {
        let mut creditors: Vec<(&MemberId, i128)> = balances
            .iter()
            .filter(|b| b.net_balance_minor_units > 0)
            .map(|b| (&b.member_id, i128::from(b.net_balance_minor_units)))
            .collect();
        let mut debtors: Vec<(&MemberId, i128)> = balances
            .iter()
            .filter(|b| b.net_balance_minor_units < 0)
            .map(|b| (&b.member_id, -i128::from(b.net_balance_minor_units)))
            .collect();

        creditors.sort_by(|a, b| b.1.cmp(&a.1));
        debtors.sort_by(|a, b| b.1.cmp(&a.1));

        let mut debts = Vec::with_capacity(creditors.len() + debtors.len());
        let (mut c, mut d) = (0, 0);

        while c < creditors.len() && d < debtors.len() {
            let amount = creditors[c].1.min(debtors[d].1);
            debts.push(SimplifiedDebt {
                from_member_id: debtors[d].0.clone(),
                to_member_id: creditors[c].0.clone(),
                // bounded by a creditor's i64 net
                amount_minor_units: amount as i64,
            });
            creditors[c].1 -= amount;
            debtors[d].1 -= amount;
            if creditors[c].1 == 0 {
                c += 1;
            }
            if debtors[d].1 == 0 {
                d += 1;
            }
        }

        if c < creditors.len() || d < debtors.len() {
            log::warn!(
                "debt simplification stopped with unmatched balances ({} creditors, {} debtors left); input was not zero-sum",
                creditors.len() - c,
                debtors.len() - d
            );
        }

        log::debug!(
            "simplified {} members into {} transfers",
            balances.len(),
            debts.len()
        );
        debts
    }
}

/// Net balances after every debt in `debts` has been paid.
///
/// For the output of [`DebtSimplifier::simplify`] on a zero-sum input,
/// every entry is zero. Members are returned in `balances` order.
pub fn apply_debts(balances: &[MemberBalance], debts: &[SimplifiedDebt]) -> Vec<(MemberId, i128)> {
    let mut remaining: Vec<(MemberId, i128)> = balances
        .iter()
        .map(|b| (b.member_id.clone(), i128::from(b.net_balance_minor_units)))
        .collect();
    let index: HashMap<MemberId, usize> = remaining
        .iter()
        .enumerate()
        .map(|(i, (m, _))| (m.clone(), i))
        .collect();

    for debt in debts {
        let amount = i128::from(debt.amount_minor_units);
        if let Some(&i) = index.get(&debt.from_member_id) {
            remaining[i].1 += amount;
        }
        if let Some(&i) = index.get(&debt.to_member_id) {
            remaining[i].1 -= amount;
        }
    }
    remaining
}
