//! Reduction of net balances to settling transfers.

pub mod simplify;

pub use simplify::{apply_debts, DebtSimplifier, SimplificationStats, SimplifiedDebt};
