//! Pairwise ledger aggregator.
//!
//! Folds the one-to-one (non group) expenses and settlements of two users into
//! a single signed balance, seen from `me`: positive means `other` owes `me`.

use serde::Serialize;

use crate::{Expense, LedgerError, MoneyCents, ResultLedger, Settlement};

/// Balance between two users plus the records it was computed from, newest
/// first.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PairwiseBalance {
    pub balance: MoneyCents,
    pub expenses: Vec<Expense>,
    pub settlements: Vec<Settlement>,
}

/// `true` if the expense is one-to-one, paid by one of the two users and
/// involves both.
pub fn expense_qualifies(expense: &Expense, me: &str, other: &str) -> bool {
    expense.is_pairwise()
        && (expense.payer_id == me || expense.payer_id == other)
        && expense.involves(me)
        && expense.involves(other)
}

/// `true` if the settlement is one-to-one and between the two users.
pub fn settlement_qualifies(settlement: &Settlement, me: &str, other: &str) -> bool {
    settlement.is_pairwise() && settlement.is_between(me, other)
}

/// Signed contribution of a qualifying expense to `me`'s balance.
pub fn expense_delta(expense: &Expense, me: &str, other: &str) -> MoneyCents {
    if expense.payer_id == me {
        expense.unpaid_amount_of(other)
    } else if expense.payer_id == other {
        -expense.unpaid_amount_of(me)
    } else {
        MoneyCents::ZERO
    }
}

/// Signed contribution of a qualifying settlement to `me`'s balance.
pub fn settlement_delta(settlement: &Settlement, me: &str) -> MoneyCents {
    if settlement.payer_id == me {
        settlement.amount
    } else {
        -settlement.amount
    }
}

/// Orders records by date, newest first, ties by id.
pub(crate) fn newest_first(expenses: &mut [Expense], settlements: &mut [Settlement]) {
    expenses.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.id.cmp(&b.id)));
    settlements.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.id.cmp(&b.id)));
}

/// Computes the balance of `me` towards `other` from the given records.
///
/// Records not involving the pair (or belonging to a group) are ignored, so the
/// whole snapshot can be passed in. The result doesn't depend on the order of
/// the input.
pub fn pairwise_balance<'a>(
    me: &str,
    other: &str,
    expenses: impl IntoIterator<Item = &'a Expense>,
    settlements: impl IntoIterator<Item = &'a Settlement>,
) -> ResultLedger<PairwiseBalance> {
    if me == other {
        return Err(LedgerError::Validation(
            "cannot compute a balance with yourself".to_string(),
        ));
    }

    let mut expenses: Vec<Expense> = expenses
        .into_iter()
        .filter(|expense| expense_qualifies(expense, me, other))
        .cloned()
        .collect();
    let mut settlements: Vec<Settlement> = settlements
        .into_iter()
        .filter(|settlement| settlement_qualifies(settlement, me, other))
        .cloned()
        .collect();

    let balance = expenses
        .iter()
        .map(|expense| expense_delta(expense, me, other))
        .chain(settlements.iter().map(|settlement| settlement_delta(settlement, me)))
        .sum();

    newest_first(&mut expenses, &mut settlements);

    Ok(PairwiseBalance {
        balance,
        expenses,
        settlements,
    })
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};
    use uuid::Uuid;

    use super::*;
    use crate::{Split, SplitType};

    fn expense(payer: &str, splits: Vec<Split>, days: i64) -> Expense {
        let amount = splits.iter().map(|s| s.amount).sum();
        Expense {
            id: Uuid::new_v4(),
            description: "test".to_string(),
            amount,
            category: "Other".to_string(),
            date: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap() + Duration::days(days),
            payer_id: payer.to_string(),
            split_type: SplitType::Exact,
            splits,
            group_id: None,
            created_by: payer.to_string(),
        }
    }

    fn settlement(payer: &str, receiver: &str, cents: i64) -> Settlement {
        Settlement {
            id: Uuid::new_v4(),
            amount: MoneyCents::new(cents),
            note: None,
            date: Utc::now(),
            payer_id: payer.to_string(),
            receiver_id: receiver.to_string(),
            group_id: None,
            related_expense_ids: Vec::new(),
            created_by: payer.to_string(),
        }
    }

    fn half(payer: &str, other: &str, cents: i64) -> Vec<Split> {
        vec![
            Split::new(payer, MoneyCents::new(cents / 2)),
            Split::new(other, MoneyCents::new(cents / 2)),
        ]
    }

    #[test]
    fn equal_split_is_owed_to_payer() {
        let expenses = vec![expense("a", half("a", "b", 10_000), 0)];

        let ab = pairwise_balance("a", "b", &expenses, &[]).unwrap();
        let ba = pairwise_balance("b", "a", &expenses, &[]).unwrap();

        assert_eq!(ab.balance, MoneyCents::new(5000));
        assert_eq!(ba.balance, MoneyCents::new(-5000));
    }

    #[test]
    fn settlement_clears_balance() {
        let expenses = vec![expense("a", half("a", "b", 10_000), 0)];
        let settlements = vec![settlement("b", "a", 5000)];

        let ab = pairwise_balance("a", "b", &expenses, &settlements).unwrap();
        assert_eq!(ab.balance, MoneyCents::ZERO);
        assert_eq!(ab.settlements.len(), 1);
    }

    #[test]
    fn ignores_paid_splits_groups_and_third_parties() {
        let mut group_expense = expense("a", half("a", "b", 2000), 1);
        group_expense.group_id = Some(Uuid::new_v4());
        let paid = expense(
            "a",
            vec![
                Split::new("a", MoneyCents::new(500)),
                Split::new("b", MoneyCents::new(500)).paid(true),
            ],
            2,
        );
        let third_party = expense("c", half("c", "b", 4000), 3);
        let expenses = vec![group_expense, paid, third_party];

        let ab = pairwise_balance("a", "b", &expenses, &[]).unwrap();
        assert_eq!(ab.balance, MoneyCents::ZERO);
        // The paid expense still qualifies and is listed.
        assert_eq!(ab.expenses.len(), 1);
    }

    #[test]
    fn is_order_independent_and_sorted_newest_first() {
        let mut expenses = vec![
            expense("a", half("a", "b", 1000), 0),
            expense("b", half("b", "a", 3000), 5),
            expense("a", half("a", "b", 777 * 2), 2),
        ];
        let forward = pairwise_balance("a", "b", &expenses, &[]).unwrap();
        expenses.reverse();
        let backward = pairwise_balance("a", "b", &expenses, &[]).unwrap();

        assert_eq!(forward, backward);
        assert_eq!(forward.balance, MoneyCents::new(500 - 1500 + 777));
        assert!(forward.expenses.windows(2).all(|w| w[0].date >= w[1].date));
    }

    #[test]
    fn rejects_self_pair() {
        assert!(matches!(
            pairwise_balance("a", "a", &[], &[]),
            Err(LedgerError::Validation(_))
        ));
    }
}
