//! Group balance computation: aggregation, simplification, per-member views.

pub mod aggregator;
pub mod individual;
pub mod snapshot;

pub use aggregator::{Aggregation, BalanceAggregator};
pub use individual::{Counterparty, IndividualBalance};
pub use snapshot::GroupSnapshot;

use crate::config::ResidualPolicy;
use crate::core::currency::CurrencyCode;
use crate::core::ids::{GroupId, MemberId};
use crate::core::ledger::MemberBalance;
use crate::core::money::{from_minor_units, MoneyError};
use crate::error::BalanceError;
use crate::optimization::{apply_debts, DebtSimplifier, SimplificationStats, SimplifiedDebt};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Balances and suggested transfers for one group at one point in time.
///
/// This is the value the balance cache stores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupBalances {
    pub group_id: GroupId,
    pub currency: CurrencyCode,
    pub member_balances: Vec<MemberBalance>,
    pub simplified_debts: Vec<SimplifiedDebt>,
    /// Residual that was corrected to keep the group zero-sum.
    pub rounding_residual_minor_units: i64,
    pub calculated_at: DateTime<Utc>,
}

impl GroupBalances {
    /// Aggregate a snapshot and simplify the result.
    pub fn compute(snapshot: &GroupSnapshot, policy: ResidualPolicy) -> Result<Self, BalanceError> {
        let aggregation = BalanceAggregator::new(policy).aggregate(snapshot)?;
        let simplified_debts = DebtSimplifier::simplify(&aggregation.balances);
        debug_assert!(apply_debts(&aggregation.balances, &simplified_debts)
            .iter()
            .all(|(_, remaining)| *remaining == 0));

        Ok(Self {
            group_id: snapshot.group.id.clone(),
            currency: snapshot.group.currency.clone(),
            member_balances: aggregation.balances,
            simplified_debts,
            rounding_residual_minor_units: aggregation.residual,
            calculated_at: Utc::now(),
        })
    }

    pub fn member(&self, member_id: &MemberId) -> Option<&MemberBalance> {
        self.member_balances
            .iter()
            .find(|b| &b.member_id == member_id)
    }

    /// Convert minor units of this group's currency to a decimal amount.
    pub fn to_decimal(&self, minor_units: i64) -> Result<Decimal, MoneyError> {
        from_minor_units(minor_units, self.currency.minor_unit_scale())
    }

    /// `sum(net) == 0`.
    pub fn is_balanced(&self) -> bool {
        self.member_balances
            .iter()
            .map(|b| i128::from(b.net_balance_minor_units))
            .sum::<i128>()
            == 0
    }

    pub fn stats(&self) -> SimplificationStats {
        SimplificationStats::from_result(&self.member_balances, &self.simplified_debts)
    }

    /// One member's position and the suggested transfers that involve them.
    ///
    /// Returns `Ok(None)` if the member has no balance row in this group.
    pub fn individual(&self, member_id: &MemberId) -> Result<Option<IndividualBalance>, MoneyError> {
        IndividualBalance::from_group(self, member_id)
    }
}

impl fmt::Display for GroupBalances {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let amount = |units: i64| self.to_decimal(units).map_err(|_| fmt::Error);

        writeln!(f, "=== Balances: {} ({}) ===", self.group_id, self.currency)?;
        for row in &self.member_balances {
            writeln!(
                f,
                "  {:<20} paid {:>12}  owed {:>12}  net {:>12}",
                row.display_name,
                amount(row.total_paid_minor_units)?,
                amount(row.total_owed_minor_units)?,
                amount(row.net_balance_minor_units)?,
            )?;
        }
        if self.rounding_residual_minor_units != 0 {
            writeln!(
                f,
                "  Residual corrected: {}",
                amount(self.rounding_residual_minor_units)?
            )?;
        }

        writeln!(f, "\n--- Suggested transfers ---")?;
        if self.simplified_debts.is_empty() {
            writeln!(f, "  Everyone is settled up.")?;
        }
        for debt in &self.simplified_debts {
            writeln!(
                f,
                "  {} -> {}: {}",
                debt.from_member_id,
                debt.to_member_id,
                amount(debt.amount_minor_units)?
            )?;
        }

        let stats = self.stats();
        writeln!(f, "\nGross owed:     {}", amount(stats.gross_owed_minor_units)?)?;
        writeln!(f, "Transfers:      {}", stats.transfer_count)?;
        write!(f, "Balanced:       {}", self.is_balanced())
    }
}
