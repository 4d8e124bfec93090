//! Opaque identifiers for the records the engine reads.
//!
//! Identifiers are assigned by the owning persistence layer. The engine only
//! compares and hashes them, so they are plain string newtypes.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the string representation of this identifier.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::new(s)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

string_id!(
    /// Identifier of an expense-sharing group. Also the balance cache key.
    ///
    /// # Examples
    ///
    /// ```
    /// use settle_engine::core::ids::GroupId;
    ///
    /// let trip = GroupId::new("lisbon-2026");
    /// assert_eq!(trip.as_str(), "lisbon-2026");
    /// ```
    GroupId
);

string_id!(
    /// Identifier of a group member.
    MemberId
);

string_id!(
    /// Identifier of a recorded expense.
    ExpenseId
);

string_id!(
    /// Identifier of a line item within an expense.
    ItemId
);
