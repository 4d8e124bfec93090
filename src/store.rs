//! Read contract towards the backing store, plus an in-process implementation.
//!
//! The engine never writes balance data. [`InMemoryStore`] carries mutation
//! methods so the engine can be exercised end to end; callers are expected
//! to route them through
//! [`BalanceService::mutate`](crate::service::BalanceService::mutate) so the
//! affected group's cache entry is dropped.

use crate::balance::GroupSnapshot;
use crate::core::expense::{Expense, ExpenseItem, Payer, Split};
use crate::core::group::Member;
use crate::core::ids::{ExpenseId, GroupId, MemberId};
use crate::core::settlement::{Settlement, SettlementStatus};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::RwLock;
use thiserror::Error;

/// Errors reported by a [`BalanceStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("group {0} not found")]
    GroupNotFound(GroupId),
    #[error("{kind} not found in group {group}")]
    RecordNotFound { group: GroupId, kind: &'static str },
    #[error(transparent)]
    Backend(Box<dyn std::error::Error + Send + Sync>),
}

/// Source of group records.
///
/// `load_snapshot` must return every record of the group from one consistent
/// read (a single transaction or snapshot where the backend supports it);
/// a snapshot mixing states from before and after a write can break the
/// zero-sum invariant. A missing group is `Ok(None)`.
pub trait BalanceStore: Send + Sync {
    fn load_snapshot(&self, group_id: &GroupId) -> Result<Option<GroupSnapshot>, StoreError>;
}

impl<T: BalanceStore + ?Sized> BalanceStore for std::sync::Arc<T> {
    fn load_snapshot(&self, group_id: &GroupId) -> Result<Option<GroupSnapshot>, StoreError> {
        (**self).load_snapshot(group_id)
    }
}

/// A [`BalanceStore`] backed by process memory.
///
/// Reads clone the group's snapshot under a read lock, so every read is
/// internally consistent.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    groups: RwLock<HashMap<GroupId, GroupSnapshot>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a whole group.
    pub fn put_group(&self, snapshot: GroupSnapshot) -> Result<(), StoreError> {
        let mut groups = self.write()?;
        groups.insert(snapshot.group.id.clone(), snapshot);
        Ok(())
    }

    pub fn add_member(&self, group_id: &GroupId, member: Member) -> Result<(), StoreError> {
        self.with_group(group_id, |snap| {
            snap.members.push(member);
            Ok(())
        })
    }

    /// Deactivate a member. Their past rows stay; the engine skips them.
    pub fn remove_member(&self, group_id: &GroupId, member_id: &MemberId) -> Result<(), StoreError> {
        self.with_group(group_id, |snap| {
            let before = snap.members.len();
            snap.members.retain(|m| &m.id != member_id);
            if snap.members.len() == before {
                return Err(StoreError::RecordNotFound {
                    group: group_id.clone(),
                    kind: "member",
                });
            }
            Ok(())
        })
    }

    /// Record an expense together with its items, payers and splits.
    pub fn add_expense(
        &self,
        group_id: &GroupId,
        expense: Expense,
        items: Vec<ExpenseItem>,
        payers: Vec<Payer>,
        splits: Vec<Split>,
    ) -> Result<(), StoreError> {
        self.with_group(group_id, |snap| {
            snap.expenses.push(expense);
            snap.items.extend(items);
            snap.payers.extend(payers);
            snap.splits.extend(splits);
            Ok(())
        })
    }

    pub fn soft_delete_expense(
        &self,
        group_id: &GroupId,
        expense_id: &ExpenseId,
        at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        self.with_group(group_id, |snap| {
            let expense = snap
                .expenses
                .iter_mut()
                .find(|e| &e.id == expense_id)
                .ok_or_else(|| StoreError::RecordNotFound {
                    group: group_id.clone(),
                    kind: "expense",
                })?;
            expense.deleted_at = Some(at);
            Ok(())
        })
    }

    /// Append a settlement and return its position within the group.
    pub fn record_settlement(
        &self,
        group_id: &GroupId,
        settlement: Settlement,
    ) -> Result<usize, StoreError> {
        self.with_group(group_id, |snap| {
            snap.settlements.push(settlement);
            Ok(snap.settlements.len() - 1)
        })
    }

    pub fn set_settlement_status(
        &self,
        group_id: &GroupId,
        position: usize,
        status: SettlementStatus,
    ) -> Result<(), StoreError> {
        self.with_group(group_id, |snap| {
            let settlement =
                snap.settlements
                    .get_mut(position)
                    .ok_or_else(|| StoreError::RecordNotFound {
                        group: group_id.clone(),
                        kind: "settlement",
                    })?;
            settlement.status = status;
            Ok(())
        })
    }

    fn with_group<T>(
        &self,
        group_id: &GroupId,
        f: impl FnOnce(&mut GroupSnapshot) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut groups = self.write()?;
        let snap = groups
            .get_mut(group_id)
            .ok_or_else(|| StoreError::GroupNotFound(group_id.clone()))?;
        f(snap)
    }

    fn write(
        &self,
    ) -> Result<std::sync::RwLockWriteGuard<'_, HashMap<GroupId, GroupSnapshot>>, StoreError> {
        self.groups
            .write()
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }
}

impl BalanceStore for InMemoryStore {
    fn load_snapshot(&self, group_id: &GroupId) -> Result<Option<GroupSnapshot>, StoreError> {
        let groups = self
            .groups
            .read()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(groups.get(group_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::currency::CurrencyCode;
    use crate::core::group::Group;

    fn store_with_group() -> (InMemoryStore, GroupId) {
        let store = InMemoryStore::new();
        let g = GroupId::new("g");
        store
            .put_group(GroupSnapshot::new(Group::new(g.clone(), CurrencyCode::new("EUR"))))
            .unwrap();
        (store, g)
    }

    #[test]
    fn test_missing_group_is_none() {
        let store = InMemoryStore::new();
        assert!(store.load_snapshot(&GroupId::new("nope")).unwrap().is_none());
    }

    #[test]
    fn test_mutations_visible_in_snapshot() {
        let (store, g) = store_with_group();
        store
            .add_member(&g, Member::new("a", g.clone(), "Ana"))
            .unwrap();
        store
            .add_expense(&g, Expense::new("e1", g.clone(), 100), vec![], vec![], vec![])
            .unwrap();
        store
            .soft_delete_expense(&g, &ExpenseId::new("e1"), Utc::now())
            .unwrap();

        let snap = store.load_snapshot(&g).unwrap().unwrap();
        assert_eq!(snap.members.len(), 1);
        assert_eq!(snap.active_expense_count(), 0);
    }

    #[test]
    fn test_settlement_status_update() {
        let (store, g) = store_with_group();
        let position = store
            .record_settlement(
                &g,
                Settlement::new(
                    g.clone(),
                    MemberId::new("a"),
                    MemberId::new("b"),
                    50,
                    SettlementStatus::Pending,
                ),
            )
            .unwrap();
        store
            .set_settlement_status(&g, position, SettlementStatus::Confirmed)
            .unwrap();

        let snap = store.load_snapshot(&g).unwrap().unwrap();
        assert!(snap.settlements[0].affects_balances());
    }

    #[test]
    fn test_unknown_records_are_errors() {
        let (store, g) = store_with_group();
        assert!(matches!(
            store.remove_member(&g, &MemberId::new("ghost")),
            Err(StoreError::RecordNotFound { kind: "member", .. })
        ));
        assert!(matches!(
            store.add_member(&GroupId::new("other"), Member::new("a", g.clone(), "A")),
            Err(StoreError::GroupNotFound(_))
        ));
    }
}
