use crate::core::currency::CurrencyCode;
use crate::core::ids::{GroupId, MemberId};
use serde::{Deserialize, Serialize};

/// An expense-sharing group and its reporting currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    #[serde(default)]
    pub currency: CurrencyCode,
}

impl Group {
    pub fn new(id: impl Into<GroupId>, currency: CurrencyCode) -> Self {
        Self {
            id: id.into(),
            currency,
        }
    }
}

/// An active member of a group.
///
/// The store only hands active members to the engine, and the order in
/// which it does so is the order balances are reported in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub group_id: GroupId,
    pub display_name: String,
}

impl Member {
    pub fn new(id: impl Into<String>, group_id: GroupId, display_name: impl Into<String>) -> Self {
        Self {
            id: MemberId::new(id),
            group_id,
            display_name: display_name.into(),
        }
    }
}
