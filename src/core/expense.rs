use crate::core::ids::{ExpenseId, GroupId, ItemId, MemberId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A recorded expense. All amounts are integer minor units of the group's
/// reporting currency.
///
/// Soft-deleted expenses (`deleted_at` set) stay in storage but contribute
/// nothing to balances: neither their payers nor their items are counted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: ExpenseId,
    pub group_id: GroupId,
    pub subtotal_minor_units: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Expense {
    pub fn new(id: impl Into<ExpenseId>, group_id: GroupId, subtotal_minor_units: i64) -> Self {
        Self {
            id: id.into(),
            group_id,
            subtotal_minor_units,
            deleted_at: None,
        }
    }

    /// Mark the expense as soft-deleted.
    pub fn with_deleted_at(mut self, at: DateTime<Utc>) -> Self {
        self.deleted_at = Some(at);
        self
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// A line item of an expense. Its cost is split among members by [`Split`] rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseItem {
    pub id: ItemId,
    pub expense_id: ExpenseId,
    pub unit_value_minor_units: i64,
    pub quantity: i64,
}

impl ExpenseItem {
    pub fn new(
        id: impl Into<ItemId>,
        expense_id: ExpenseId,
        unit_value_minor_units: i64,
        quantity: i64,
    ) -> Self {
        Self {
            id: id.into(),
            expense_id,
            unit_value_minor_units,
            quantity,
        }
    }

    /// `unit_value × quantity`, or `None` on overflow.
    pub fn total_minor_units(&self) -> Option<i64> {
        self.unit_value_minor_units.checked_mul(self.quantity)
    }
}

/// A member's contribution towards paying an expense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payer {
    pub expense_id: ExpenseId,
    pub member_id: MemberId,
    pub amount_minor_units: i64,
}

impl Payer {
    pub fn new(expense_id: ExpenseId, member_id: MemberId, amount_minor_units: i64) -> Self {
        Self {
            expense_id,
            member_id,
            amount_minor_units,
        }
    }
}

/// How a split row claims its share of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShareMode {
    /// Same share as every other `Equal` row (weight 1).
    Equal,
    /// Share proportional to `weight`.
    Weight,
    /// A fixed amount, deducted before any weighted share.
    Exact,
}

/// One member's claim on an expense item.
///
/// The optional fields mirror the stored row: `weight` is read only for
/// [`ShareMode::Weight`], `exact_amount_minor_units` only for
/// [`ShareMode::Exact`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Split {
    pub item_id: ItemId,
    pub member_id: MemberId,
    pub share_mode: ShareMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exact_amount_minor_units: Option<i64>,
}

impl Split {
    pub fn equal(item_id: ItemId, member_id: MemberId) -> Self {
        Self {
            item_id,
            member_id,
            share_mode: ShareMode::Equal,
            weight: None,
            exact_amount_minor_units: None,
        }
    }

    pub fn weighted(item_id: ItemId, member_id: MemberId, weight: Decimal) -> Self {
        Self {
            item_id,
            member_id,
            share_mode: ShareMode::Weight,
            weight: Some(weight),
            exact_amount_minor_units: None,
        }
    }

    pub fn exact(item_id: ItemId, member_id: MemberId, amount_minor_units: i64) -> Self {
        Self {
            item_id,
            member_id,
            share_mode: ShareMode::Exact,
            weight: None,
            exact_amount_minor_units: Some(amount_minor_units),
        }
    }
}
