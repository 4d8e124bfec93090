//! # settle-engine
//!
//! Balance and settlement engine for shared-expense groups.
//!
//! Given a group's expenses, per-item splits, payers and settlements, the
//! engine computes each member's net position in exact integer minor units
//! and condenses the result into a short list of suggested payments.
//!
//! ## Architecture
//!
//! - **core** — Identifiers, input records, fixed-point money, the balance ledger
//! - **allocation** — Equal and largest-remainder weighted splitting
//! - **balance** — Aggregation of a group snapshot into member balances
//! - **optimization** — Debt simplification
//! - **cache** / **store** — Read-through cache and backing-store contracts
//! - **service** — The composition root callers talk to
//! - **simulation** — Random group generation for stress tests

pub mod allocation;
pub mod balance;
pub mod cache;
pub mod config;
pub mod core;
pub mod error;
pub mod optimization;
pub mod service;
pub mod store;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::allocation::{allocate_item, split_by_weights, split_equal};
    pub use crate::balance::{GroupBalances, GroupSnapshot, IndividualBalance};
    pub use crate::cache::{BalanceCache, InMemoryBalanceCache};
    pub use crate::config::{EngineConfig, ResidualPolicy};
    pub use crate::core::currency::CurrencyCode;
    pub use crate::core::expense::{Expense, ExpenseItem, Payer, ShareMode, Split};
    pub use crate::core::group::{Group, Member};
    pub use crate::core::ids::{ExpenseId, GroupId, ItemId, MemberId};
    pub use crate::core::ledger::MemberBalance;
    pub use crate::core::money::{from_cents, to_cents};
    pub use crate::core::settlement::{Settlement, SettlementStatus};
    pub use crate::error::BalanceError;
    pub use crate::optimization::{DebtSimplifier, SimplifiedDebt};
    pub use crate::service::{BalanceService, GetOptions};
    pub use crate::store::{BalanceStore, InMemoryStore};
}
