//! Exact integer allocation of an amount across participants.

pub mod item;
pub mod proportional;

pub use item::{allocate_item, ItemAllocation};
pub use proportional::{split_by_weights, split_equal, AllocationError};
