use crate::allocation::AllocationError;
use crate::core::ids::{GroupId, ItemId};
use crate::core::ledger::LedgerError;
use crate::core::money::MoneyError;
use crate::store::StoreError;
use thiserror::Error;

/// Errors surfaced by balance computation and the balance service.
///
/// A missing group or member is not an error: lookups return `Ok(None)`.
/// Cache failures never appear here either, because reads fall back to
/// recomputation.
#[derive(Debug, Error)]
pub enum BalanceError {
    /// The backing store failed. Passed through untouched.
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("item {item} could not be allocated: {source}")]
    ItemAllocation {
        item: ItemId,
        #[source]
        source: AllocationError,
    },

    #[error("rounding residual could not be distributed: {0}")]
    ResidualAllocation(#[source] AllocationError),

    #[error("item {item} total overflows (unit value × quantity)")]
    ItemTotalOverflow { item: ItemId },

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Money(#[from] MoneyError),

    #[error("group {group} balances do not sum to zero (residual {residual})")]
    Unbalanced { group: GroupId, residual: i128 },
}
