//! Foundational types: identifiers, records, fixed-point money, the ledger.

pub mod currency;
pub mod expense;
pub mod group;
pub mod ids;
pub mod ledger;
pub mod money;
pub mod settlement;
