use crate::core::ids::{GroupId, MemberId};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a recorded settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettlementStatus {
    Pending,
    Confirmed,
    Rejected,
    Cancelled,
}

/// A payment one member made to another outside of any expense.
///
/// Only [`SettlementStatus::Confirmed`] settlements move balances. A
/// confirmed settlement counts as money paid by `payer_member_id` and owed by
/// `payee_member_id`, which discharges the payee's existing credit instead
/// of creating new debt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub group_id: GroupId,
    pub payer_member_id: MemberId,
    pub payee_member_id: MemberId,
    pub amount_minor_units: i64,
    pub status: SettlementStatus,
}

impl Settlement {
    pub fn new(
        group_id: GroupId,
        payer_member_id: MemberId,
        payee_member_id: MemberId,
        amount_minor_units: i64,
        status: SettlementStatus,
    ) -> Self {
        Self {
            group_id,
            payer_member_id,
            payee_member_id,
            amount_minor_units,
            status,
        }
    }

    /// A confirmed settlement.
    pub fn confirmed(
        group_id: GroupId,
        payer_member_id: MemberId,
        payee_member_id: MemberId,
        amount_minor_units: i64,
    ) -> Self {
        Self::new(
            group_id,
            payer_member_id,
            payee_member_id,
            amount_minor_units,
            SettlementStatus::Confirmed,
        )
    }

    pub fn affects_balances(&self) -> bool {
        self.status == SettlementStatus::Confirmed
    }
}
