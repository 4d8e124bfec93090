use crate::core::currency::CurrencyCode;
use crate::core::group::Member;
use crate::core::ids::MemberId;
use crate::core::money::{from_minor_units, MoneyError};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Errors raised while posting amounts to a [`BalanceLedger`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("balance arithmetic overflowed for member {member}")]
    Overflow { member: MemberId },
}

/// The computed position of one member.
///
/// `net_balance_minor_units` is always
/// `total_paid − total_owed + residual_adjustment`. The adjustment is zero
/// unless this member absorbed the group's rounding residual.
///
/// A positive net means the group owes the member; a negative net means the
/// member owes the group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberBalance {
    pub member_id: MemberId,
    pub display_name: String,
    pub total_paid_minor_units: i64,
    pub total_owed_minor_units: i64,
    pub residual_adjustment_minor_units: i64,
    pub net_balance_minor_units: i64,
}

impl MemberBalance {
    /// Total paid as a decimal amount of `currency`.
    pub fn total_paid(&self, currency: &CurrencyCode) -> Result<Decimal, MoneyError> {
        from_minor_units(self.total_paid_minor_units, currency.minor_unit_scale())
    }

    /// Total owed as a decimal amount of `currency`.
    pub fn total_owed(&self, currency: &CurrencyCode) -> Result<Decimal, MoneyError> {
        from_minor_units(self.total_owed_minor_units, currency.minor_unit_scale())
    }

    /// Net balance as a decimal amount of `currency`, adjustment included.
    pub fn net_balance(&self, currency: &CurrencyCode) -> Result<Decimal, MoneyError> {
        from_minor_units(self.net_balance_minor_units, currency.minor_unit_scale())
    }

    fn zero(member: &Member) -> Self {
        Self {
            member_id: member.id.clone(),
            display_name: member.display_name.clone(),
            total_paid_minor_units: 0,
            total_owed_minor_units: 0,
            residual_adjustment_minor_units: 0,
            net_balance_minor_units: 0,
        }
    }

    fn recompute_net(&mut self) -> Result<(), LedgerError> {
        self.net_balance_minor_units = self
            .total_paid_minor_units
            .checked_sub(self.total_owed_minor_units)
            .and_then(|n| n.checked_add(self.residual_adjustment_minor_units))
            .ok_or_else(|| LedgerError::Overflow {
                member: self.member_id.clone(),
            })?;
        Ok(())
    }
}

/// Per-member paid/owed accumulator for one group.
///
/// Rows keep the order of the member list they were built from; lookups go
/// through an index so iteration order never depends on hashing.
#[derive(Debug, Clone, Default)]
pub struct BalanceLedger {
    rows: Vec<MemberBalance>,
    index: HashMap<MemberId, usize>,
}

impl BalanceLedger {
    /// Start every member at zero paid and zero owed.
    ///
    /// A member listed twice keeps its first position.
    pub fn from_members(members: &[Member]) -> Self {
        let mut ledger = Self::default();
        for member in members {
            if ledger.index.contains_key(&member.id) {
                continue;
            }
            ledger.index.insert(member.id.clone(), ledger.rows.len());
            ledger.rows.push(MemberBalance::zero(member));
        }
        ledger
    }

    pub fn contains(&self, member: &MemberId) -> bool {
        self.index.contains_key(member)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Add to a member's paid total. Returns `Ok(false)` if the member is
    /// not in the ledger.
    pub fn record_paid(&mut self, member: &MemberId, amount: i64) -> Result<bool, LedgerError> {
        let Some(&i) = self.index.get(member) else {
            return Ok(false);
        };
        let row = &mut self.rows[i];
        row.total_paid_minor_units = row
            .total_paid_minor_units
            .checked_add(amount)
            .ok_or_else(|| LedgerError::Overflow {
                member: member.clone(),
            })?;
        row.recompute_net()?;
        Ok(true)
    }

    /// Add to a member's owed total. Returns `Ok(false)` if the member is
    /// not in the ledger.
    pub fn record_owed(&mut self, member: &MemberId, amount: i64) -> Result<bool, LedgerError> {
        let Some(&i) = self.index.get(member) else {
            return Ok(false);
        };
        let row = &mut self.rows[i];
        row.total_owed_minor_units = row
            .total_owed_minor_units
            .checked_add(amount)
            .ok_or_else(|| LedgerError::Overflow {
                member: member.clone(),
            })?;
        row.recompute_net()?;
        Ok(true)
    }

    /// Apply a compensating adjustment to the member at `position`.
    pub fn adjust(&mut self, position: usize, delta: i64) -> Result<(), LedgerError> {
        let Some(row) = self.rows.get_mut(position) else {
            return Ok(());
        };
        row.residual_adjustment_minor_units = row
            .residual_adjustment_minor_units
            .checked_add(delta)
            .ok_or_else(|| LedgerError::Overflow {
                member: row.member_id.clone(),
            })?;
        row.recompute_net()
    }

    /// Sum of all net balances. Zero for a balanced ledger.
    pub fn residual(&self) -> i128 {
        self.rows
            .iter()
            .map(|r| i128::from(r.net_balance_minor_units))
            .sum()
    }

    pub fn is_balanced(&self) -> bool {
        self.residual() == 0
    }

    pub fn rows(&self) -> &[MemberBalance] {
        &self.rows
    }

    pub fn into_balances(self) -> Vec<MemberBalance> {
        self.rows
    }
}
