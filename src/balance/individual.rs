use crate::balance::GroupBalances;
use crate::core::ids::MemberId;
use crate::core::money::MoneyError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The other side of a suggested transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counterparty {
    pub member_id: MemberId,
    pub amount: Decimal,
}

/// One member's view of the group: totals plus the transfers touching them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndividualBalance {
    pub member_id: MemberId,
    pub total_paid: Decimal,
    pub total_owed: Decimal,
    pub net_balance: Decimal,
    /// Members this member should pay.
    pub owes_to: Vec<Counterparty>,
    /// Members who should pay this member.
    pub owed_by: Vec<Counterparty>,
}

impl IndividualBalance {
    /// Filter `balances.simplified_debts` down to edges touching `member_id`.
    pub fn from_group(
        balances: &GroupBalances,
        member_id: &MemberId,
    ) -> Result<Option<Self>, MoneyError> {
        let Some(row) = balances.member(member_id) else {
            return Ok(None);
        };

        let mut owes_to = Vec::new();
        let mut owed_by = Vec::new();
        for debt in &balances.simplified_debts {
            if &debt.from_member_id == member_id {
                owes_to.push(Counterparty {
                    member_id: debt.to_member_id.clone(),
                    amount: balances.to_decimal(debt.amount_minor_units)?,
                });
            } else if &debt.to_member_id == member_id {
                owed_by.push(Counterparty {
                    member_id: debt.from_member_id.clone(),
                    amount: balances.to_decimal(debt.amount_minor_units)?,
                });
            }
        }

        Ok(Some(Self {
            member_id: row.member_id.clone(),
            total_paid: row.total_paid(&balances.currency)?,
            total_owed: row.total_owed(&balances.currency)?,
            net_balance: row.net_balance(&balances.currency)?,
            owes_to,
            owed_by,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::currency::CurrencyCode;
    use crate::core::ids::GroupId;
    use crate::core::ledger::MemberBalance;
    use crate::optimization::DebtSimplifier;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn row(id: &str, paid: i64, owed: i64) -> MemberBalance {
        MemberBalance {
            member_id: MemberId::new(id),
            display_name: id.to_string(),
            total_paid_minor_units: paid,
            total_owed_minor_units: owed,
            residual_adjustment_minor_units: 0,
            net_balance_minor_units: paid - owed,
        }
    }

    fn group() -> GroupBalances {
        let member_balances = vec![row("a", 9000, 3000), row("b", 0, 3000), row("c", 0, 3000)];
        let simplified_debts = DebtSimplifier::simplify(&member_balances);
        GroupBalances {
            group_id: GroupId::new("g"),
            currency: CurrencyCode::new("USD"),
            member_balances,
            simplified_debts,
            rounding_residual_minor_units: 0,
            calculated_at: Utc::now(),
        }
    }

    #[test]
    fn test_creditor_view() {
        let view = IndividualBalance::from_group(&group(), &MemberId::new("a"))
            .unwrap()
            .unwrap();
        assert_eq!(view.total_paid, dec!(90.00));
        assert_eq!(view.total_owed, dec!(30.00));
        assert_eq!(view.net_balance, dec!(60.00));
        assert!(view.owes_to.is_empty());
        assert_eq!(
            view.owed_by,
            vec![
                Counterparty {
                    member_id: MemberId::new("b"),
                    amount: dec!(30.00)
                },
                Counterparty {
                    member_id: MemberId::new("c"),
                    amount: dec!(30.00)
                },
            ]
        );
    }

    #[test]
    fn test_debtor_view() {
        let view = group().individual(&MemberId::new("c")).unwrap().unwrap();
        assert_eq!(view.net_balance, dec!(-30.00));
        assert_eq!(view.owes_to.len(), 1);
        assert_eq!(view.owes_to[0].member_id, MemberId::new("a"));
        assert!(view.owed_by.is_empty());
    }

    #[test]
    fn test_unknown_member_is_none() {
        assert!(group().individual(&MemberId::new("zed")).unwrap().is_none());
    }
}
