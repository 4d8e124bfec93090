use crate::allocation::{allocate_item, split_by_weights};
use crate::balance::snapshot::GroupSnapshot;
use crate::config::ResidualPolicy;
use crate::core::expense::Split;
use crate::core::ids::{ExpenseId, GroupId, ItemId};
use crate::core::ledger::{BalanceLedger, MemberBalance};
use crate::error::BalanceError;
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};

/// Per-member balances for one group, before debt simplification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregation {
    /// One row per active member, in store order.
    pub balances: Vec<MemberBalance>,
    /// `sum(net)` before the compensating adjustment. Zero in the usual case.
    pub residual: i64,
}

/// Walks a [`GroupSnapshot`] and produces each member's paid, owed and net
/// totals in integer minor units.
#[derive(Debug, Clone, Copy, Default)]
pub struct BalanceAggregator {
    policy: ResidualPolicy,
}

impl BalanceAggregator {
    pub fn new(policy: ResidualPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> ResidualPolicy {
        self.policy
    }

    /// Compute balances for the snapshot's group.
    ///
    /// # Algorithm
    ///
    /// 1. Every active member starts at zero paid, zero owed.
    /// 2. Payer rows of non-deleted expenses add to `paid`.
    /// 3. Each item of a non-deleted expense is divided by [`allocate_item`]
    ///    (exact rows first, weighted rows over the remainder) and each share
    ///    adds to `owed`.
    /// 4. Confirmed settlements add to the payer's `paid` and the payee's `owed`.
    /// 5. If `sum(net) != 0`, the residual is absorbed according to the
    ///    configured [`ResidualPolicy`], so the result is always zero-sum.
    ///
    /// Rows naming a member who is not active are skipped and logged; their
    /// effect shows up as residual.
    pub fn aggregate(&self, snapshot: &GroupSnapshot) -> Result<Aggregation, BalanceError> {
        let group_id = snapshot.group_id();
        let mut ledger = BalanceLedger::from_members(&snapshot.members);
        if ledger.is_empty() {
            log::debug!("group {}: no active members", group_id);
            return Ok(Aggregation {
                balances: Vec::new(),
                residual: 0,
            });
        }

        let active_expenses: HashSet<&ExpenseId> = snapshot
            .expenses
            .iter()
            .filter(|e| !e.is_deleted() && &e.group_id == group_id)
            .map(|e| &e.id)
            .collect();

        for payer in &snapshot.payers {
            if !active_expenses.contains(&payer.expense_id) {
                continue;
            }
            if !ledger.record_paid(&payer.member_id, payer.amount_minor_units)? {
                log::warn!(
                    "group {}: payer {} on expense {} is not an active member; skipped",
                    group_id,
                    payer.member_id,
                    payer.expense_id
                );
            }
        }

        let splits_by_item = group_splits(&snapshot.splits);
        let no_splits: Vec<Split> = Vec::new();

        for item in &snapshot.items {
            if !active_expenses.contains(&item.expense_id) {
                continue;
            }
            let total = item
                .total_minor_units()
                .ok_or_else(|| BalanceError::ItemTotalOverflow {
                    item: item.id.clone(),
                })?;
            let splits = splits_by_item.get(&item.id).unwrap_or(&no_splits);
            let allocation =
                allocate_item(total, splits).map_err(|source| BalanceError::ItemAllocation {
                    item: item.id.clone(),
                    source,
                })?;

            for (member, share) in &allocation.shares {
                if !ledger.record_owed(member, *share)? {
                    log::warn!(
                        "group {}: split for {} on item {} is not an active member; skipped",
                        group_id,
                        member,
                        item.id
                    );
                }
            }
            if allocation.unattributed != 0 {
                log::warn!(
                    "group {}: item {} leaves {} unattributed",
                    group_id,
                    item.id,
                    allocation.unattributed
                );
            }
        }

        for settlement in snapshot
            .settlements
            .iter()
            .filter(|s| s.affects_balances() && &s.group_id == group_id)
        {
            let amount = settlement.amount_minor_units;
            if !ledger.record_paid(&settlement.payer_member_id, amount)? {
                log::warn!(
                    "group {}: settlement payer {} is not an active member; skipped",
                    group_id,
                    settlement.payer_member_id
                );
            }
            if !ledger.record_owed(&settlement.payee_member_id, amount)? {
                log::warn!(
                    "group {}: settlement payee {} is not an active member; skipped",
                    group_id,
                    settlement.payee_member_id
                );
            }
        }

        let residual = self.absorb_residual(group_id, &mut ledger)?;
        if !ledger.is_balanced() {
            return Err(BalanceError::Unbalanced {
                group: group_id.clone(),
                residual: ledger.residual(),
            });
        }
        if residual != 0 {
            log::info!(
                "group {}: absorbed rounding residual {} ({} policy)",
                group_id,
                residual,
                self.policy
            );
        }
        log::debug!(
            "group {}: aggregated {} members, {} active expenses",
            group_id,
            ledger.len(),
            active_expenses.len()
        );

        Ok(Aggregation {
            balances: ledger.into_balances(),
            residual,
        })
    }

    /// Post the negative of `sum(net)` so the ledger is zero-sum again.
    /// Returns the residual that was corrected.
    fn absorb_residual(
        &self,
        group_id: &GroupId,
        ledger: &mut BalanceLedger,
    ) -> Result<i64, BalanceError> {
        let raw = ledger.residual();
        if raw == 0 {
            return Ok(0);
        }
        let residual = i64::try_from(raw).map_err(|_| BalanceError::Unbalanced {
            group: group_id.clone(),
            residual: raw,
        })?;

        match self.policy {
            ResidualPolicy::FirstMember => ledger.adjust(0, -residual)?,
            ResidualPolicy::Proportional => {
                let weights: Vec<Decimal> = ledger
                    .rows()
                    .iter()
                    .map(|r| Decimal::from(r.net_balance_minor_units.unsigned_abs()))
                    .collect();
                if weights.iter().all(|w| w.is_zero()) {
                    ledger.adjust(0, -residual)?;
                } else {
                    let shares = split_by_weights(-residual, &weights)
                        .map_err(BalanceError::ResidualAllocation)?;
                    for (position, share) in shares.into_iter().enumerate() {
                        if share != 0 {
                            ledger.adjust(position, share)?;
                        }
                    }
                }
            }
        }
        Ok(residual)
    }
}

/// Splits keyed by item, each list in input order.
fn group_splits(splits: &[Split]) -> HashMap<ItemId, Vec<Split>> {
    let mut by_item: HashMap<ItemId, Vec<Split>> = HashMap::new();
    for split in splits {
        by_item
            .entry(split.item_id.clone())
            .or_default()
            .push(split.clone());
    }
    by_item
}
