use crate::core::expense::{Expense, ExpenseItem, Payer, Split};
use crate::core::group::{Group, Member};
use crate::core::ids::GroupId;
use crate::core::settlement::Settlement;
use serde::{Deserialize, Serialize};

/// Every record that feeds one group's balances, read in one consistent view.
///
/// The snapshot is a plain copy of stored rows: it may still contain
/// soft-deleted expenses and non-confirmed settlements, which the aggregator
/// filters out. `members` must list active members only, in the order
/// balances should be reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSnapshot {
    pub group: Group,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub expenses: Vec<Expense>,
    #[serde(default)]
    pub items: Vec<ExpenseItem>,
    #[serde(default)]
    pub payers: Vec<Payer>,
    #[serde(default)]
    pub splits: Vec<Split>,
    #[serde(default)]
    pub settlements: Vec<Settlement>,
}

impl GroupSnapshot {
    /// An empty snapshot for `group`.
    pub fn new(group: Group) -> Self {
        Self {
            group,
            members: Vec::new(),
            expenses: Vec::new(),
            items: Vec::new(),
            payers: Vec::new(),
            splits: Vec::new(),
            settlements: Vec::new(),
        }
    }

    pub fn group_id(&self) -> &GroupId {
        &self.group.id
    }

    /// Number of expenses that still count towards balances.
    pub fn active_expense_count(&self) -> usize {
        self.expenses.iter().filter(|e| !e.is_deleted()).count()
    }
}
