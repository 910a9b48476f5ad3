//! Group ledger builder.
//!
//! Builds, for one group, the debtor × creditor matrix and the net balance of
//! every member. The matrix is accumulated functionally from the records into
//! a `BTreeMap<(debtor, creditor), amount>`, then each pair is netted so that
//! at most one direction carries a positive amount.
//!
//! Invariants:
//! - `sum(totals) == 0` exactly: every credit has a matching debit.
//! - `totals[m] == sum(entry(x, m)) - sum(entry(m, x))` for every member `m`.

use std::collections::{BTreeMap, BTreeSet};

use crate::{Expense, Group, MoneyCents, Settlement, users::UserId};

type Pair = (UserId, UserId);

/// Debts inside one group, derived from its expenses and settlements.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GroupLedger {
    members: Vec<UserId>,
    entries: BTreeMap<Pair, MoneyCents>,
    totals: BTreeMap<UserId, MoneyCents>,
}

/// One contribution to the raw matrix: `debtor` owes `creditor` `amount`
/// more (negative for settlements).
struct Movement<'a> {
    debtor: &'a str,
    creditor: &'a str,
    amount: MoneyCents,
}

fn expense_movements(expense: &Expense) -> impl Iterator<Item = Movement<'_>> {
    expense
        .splits
        .iter()
        .filter(move |split| split.user_id != expense.payer_id && !split.paid)
        .map(move |split| Movement {
            debtor: split.user_id.as_str(),
            creditor: expense.payer_id.as_str(),
            amount: split.amount,
        })
}

fn settlement_movement(settlement: &Settlement) -> Movement<'_> {
    // Paying back reduces what the payer owed the receiver.
    Movement {
        debtor: settlement.payer_id.as_str(),
        creditor: settlement.receiver_id.as_str(),
        amount: -settlement.amount,
    }
}

impl GroupLedger {
    /// Builds the ledger of `group` from the given records.
    ///
    /// Records of other groups and one-to-one records are ignored, so the full
    /// snapshot can be passed in.
    pub fn build<'a>(
        group: &Group,
        expenses: impl IntoIterator<Item = &'a Expense>,
        settlements: impl IntoIterator<Item = &'a Settlement>,
    ) -> Self {
        let expenses: Vec<&Expense> = expenses
            .into_iter()
            .filter(|expense| expense.belongs_to(group.id))
            .collect();
        let settlements: Vec<&Settlement> = settlements
            .into_iter()
            .filter(|settlement| settlement.belongs_to(group.id))
            .collect();

        let movements: Vec<Movement<'_>> = expenses
            .iter()
            .flat_map(|expense| expense_movements(expense))
            .chain(settlements.iter().map(|settlement| settlement_movement(settlement)))
            .collect();

        let members: Vec<UserId> = group.member_ids().map(ToString::to_string).collect();

        // Everyone appearing in a record gets a row, members first.
        let participants: BTreeSet<&str> = members
            .iter()
            .map(String::as_str)
            .chain(movements.iter().flat_map(|m| [m.debtor, m.creditor]))
            .collect();

        let zero_totals: BTreeMap<UserId, MoneyCents> = participants
            .iter()
            .map(|user| (user.to_string(), MoneyCents::ZERO))
            .collect();
        let totals = movements.iter().fold(zero_totals, |mut totals, movement| {
            if let Some(total) = totals.get_mut(movement.creditor) {
                *total += movement.amount;
            }
            if let Some(total) = totals.get_mut(movement.debtor) {
                *total -= movement.amount;
            }
            totals
        });

        let raw = movements.iter().fold(
            BTreeMap::<(&str, &str), MoneyCents>::new(),
            |mut raw, movement| {
                *raw.entry((movement.debtor, movement.creditor))
                    .or_default() += movement.amount;
                raw
            },
        );

        let entries = net_pairs(&participants, &raw);

        Self {
            members,
            entries,
            totals,
        }
    }

    /// Member ids in group order.
    pub fn members(&self) -> &[UserId] {
        &self.members
    }

    /// Net balance of `user_id` in the group: positive when the group owes
    /// them.
    pub fn total(&self, user_id: &str) -> MoneyCents {
        self.totals.get(user_id).copied().unwrap_or_default()
    }

    pub fn totals(&self) -> &BTreeMap<UserId, MoneyCents> {
        &self.totals
    }

    /// Netted amount `debtor` owes `creditor` (never negative).
    pub fn owed(&self, debtor: &str, creditor: &str) -> MoneyCents {
        self.entries
            .get(&(debtor.to_string(), creditor.to_string()))
            .copied()
            .unwrap_or_default()
    }

    /// Signed balance between `me` and `other`: positive when `other` owes
    /// `me`.
    pub fn net_between(&self, me: &str, other: &str) -> MoneyCents {
        self.owed(other, me) - self.owed(me, other)
    }

    /// Creditors of `user_id` with a positive amount, largest first.
    pub fn owes(&self, user_id: &str) -> Vec<(UserId, MoneyCents)> {
        sorted_desc(
            self.entries
                .iter()
                .filter(|((debtor, _), amount)| debtor == user_id && amount.is_positive())
                .map(|((_, creditor), amount)| (creditor.clone(), *amount)),
        )
    }

    /// Debtors of `user_id` with a positive amount, largest first.
    pub fn owed_by(&self, user_id: &str) -> Vec<(UserId, MoneyCents)> {
        sorted_desc(
            self.entries
                .iter()
                .filter(|((_, creditor), amount)| creditor == user_id && amount.is_positive())
                .map(|((debtor, _), amount)| (debtor.clone(), *amount)),
        )
    }

    /// Every positive `(debtor, creditor, amount)` entry.
    pub fn debts(&self) -> impl Iterator<Item = (&str, &str, MoneyCents)> {
        self.entries
            .iter()
            .filter(|(_, amount)| amount.is_positive())
            .map(|((debtor, creditor), amount)| (debtor.as_str(), creditor.as_str(), *amount))
    }

    /// Sum of all member totals; always zero.
    pub fn totals_sum(&self) -> MoneyCents {
        self.totals.values().sum()
    }
}

/// Collapses the two directions of every pair into one non-negative entry.
///
/// Every ordered pair of distinct participants is present, zero when nothing
/// is owed in that direction.
fn net_pairs<'a>(
    participants: &BTreeSet<&'a str>,
    raw: &BTreeMap<(&'a str, &'a str), MoneyCents>,
) -> BTreeMap<Pair, MoneyCents> {
    let participants: Vec<&'a str> = participants.iter().copied().collect();
    let mut entries = BTreeMap::new();
    for (idx, a) in participants.iter().copied().enumerate() {
        for b in participants[idx + 1..].iter().copied() {
            let a_to_b = raw.get(&(a, b)).copied().unwrap_or_default();
            let b_to_a = raw.get(&(b, a)).copied().unwrap_or_default();
            let diff = a_to_b - b_to_a;
            let (a_owes_b, b_owes_a) = if diff.is_positive() {
                (diff, MoneyCents::ZERO)
            } else {
                (MoneyCents::ZERO, -diff)
            };
            entries.insert((a.to_string(), b.to_string()), a_owes_b);
            entries.insert((b.to_string(), a.to_string()), b_owes_a);
        }
    }
    entries
}

fn sorted_desc(rows: impl Iterator<Item = (UserId, MoneyCents)>) -> Vec<(UserId, MoneyCents)> {
    let mut rows: Vec<_> = rows.collect();
    rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    rows
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::{GroupMember, GroupRole, Split, SplitType};

    fn group(members: &[&str]) -> Group {
        Group {
            id: Uuid::new_v4(),
            name: "Flat".to_string(),
            description: String::new(),
            created_by: members[0].to_string(),
            members: members
                .iter()
                .map(|user| GroupMember {
                    user_id: user.to_string(),
                    role: GroupRole::Member,
                    joined_at: Utc::now(),
                })
                .collect(),
        }
    }

    fn expense(group: &Group, payer: &str, splits: &[(&str, i64)]) -> Expense {
        let splits: Vec<Split> = splits
            .iter()
            .map(|(user, cents)| Split::new(*user, MoneyCents::new(*cents)))
            .collect();
        Expense {
            id: Uuid::new_v4(),
            description: "Groceries".to_string(),
            amount: splits.iter().map(|s| s.amount).sum(),
            category: "Food".to_string(),
            date: Utc::now(),
            payer_id: payer.to_string(),
            split_type: SplitType::Exact,
            splits,
            group_id: Some(group.id),
            created_by: payer.to_string(),
        }
    }

    fn settlement(group: &Group, payer: &str, receiver: &str, cents: i64) -> Settlement {
        Settlement {
            id: Uuid::new_v4(),
            amount: MoneyCents::new(cents),
            note: None,
            date: Utc::now(),
            payer_id: payer.to_string(),
            receiver_id: receiver.to_string(),
            group_id: Some(group.id),
            related_expense_ids: Vec::new(),
            created_by: payer.to_string(),
        }
    }

    #[test]
    fn equal_expense_builds_totals_and_matrix() {
        let flat = group(&["a", "b", "c"]);
        let expenses = vec![expense(&flat, "a", &[("a", 3000), ("b", 3000), ("c", 3000)])];

        let ledger = GroupLedger::build(&flat, &expenses, &[]);

        assert_eq!(ledger.total("a"), MoneyCents::new(6000));
        assert_eq!(ledger.total("b"), MoneyCents::new(-3000));
        assert_eq!(ledger.total("c"), MoneyCents::new(-3000));
        assert_eq!(ledger.totals_sum(), MoneyCents::ZERO);
        assert_eq!(
            ledger.owed_by("a"),
            vec![
                ("b".to_string(), MoneyCents::new(3000)),
                ("c".to_string(), MoneyCents::new(3000)),
            ]
        );
        assert_eq!(ledger.owes("b"), vec![("a".to_string(), MoneyCents::new(3000))]);
        assert!(ledger.owes("a").is_empty());
    }

    #[test]
    fn opposite_debts_are_netted() {
        let flat = group(&["a", "b"]);
        let expenses = vec![
            expense(&flat, "a", &[("a", 1000), ("b", 3000)]),
            expense(&flat, "b", &[("a", 1000), ("b", 1000)]),
        ];

        let ledger = GroupLedger::build(&flat, &expenses, &[]);

        assert_eq!(ledger.owed("b", "a"), MoneyCents::new(2000));
        assert_eq!(ledger.owed("a", "b"), MoneyCents::ZERO);
        assert_eq!(ledger.net_between("a", "b"), MoneyCents::new(2000));
        assert_eq!(ledger.net_between("b", "a"), MoneyCents::new(-2000));
    }

    #[test]
    fn settlement_reduces_and_overshoot_flips_direction() {
        let flat = group(&["a", "b"]);
        let expenses = vec![expense(&flat, "a", &[("a", 5000), ("b", 5000)])];

        let partial = vec![settlement(&flat, "b", "a", 2000)];
        let ledger = GroupLedger::build(&flat, &expenses, &partial);
        assert_eq!(ledger.owed("b", "a"), MoneyCents::new(3000));
        assert_eq!(ledger.total("a"), MoneyCents::new(3000));

        let overshoot = vec![settlement(&flat, "b", "a", 7000)];
        let ledger = GroupLedger::build(&flat, &expenses, &overshoot);
        assert_eq!(ledger.owed("b", "a"), MoneyCents::ZERO);
        assert_eq!(ledger.owed("a", "b"), MoneyCents::new(2000));
        assert_eq!(ledger.total("b"), MoneyCents::new(2000));
        assert_eq!(ledger.totals_sum(), MoneyCents::ZERO);
    }

    #[test]
    fn paid_and_own_splits_do_not_create_debt() {
        let flat = group(&["a", "b"]);
        let mut paid = expense(&flat, "a", &[("a", 500), ("b", 500)]);
        paid.splits[1].paid = true;

        let ledger = GroupLedger::build(&flat, &[paid], &[]);
        assert_eq!(ledger.total("a"), MoneyCents::ZERO);
        assert!(ledger.debts().next().is_none());
    }

    #[test]
    fn ignores_records_of_other_groups() {
        let flat = group(&["a", "b"]);
        let other = group(&["a", "b"]);
        let expenses = vec![expense(&other, "a", &[("a", 500), ("b", 500)])];

        let ledger = GroupLedger::build(&flat, &expenses, &[]);
        assert_eq!(ledger.total("a"), MoneyCents::ZERO);
    }

    #[test]
    fn totals_match_matrix_and_build_is_deterministic() {
        let flat = group(&["a", "b", "c", "d"]);
        let expenses = vec![
            expense(&flat, "a", &[("a", 1234), ("b", 4321), ("c", 17)]),
            expense(&flat, "b", &[("a", 999), ("c", 1), ("d", 5000)]),
            expense(&flat, "d", &[("b", 250), ("c", 250), ("d", 250)]),
        ];
        let settlements = vec![
            settlement(&flat, "c", "a", 10),
            settlement(&flat, "d", "b", 6000),
        ];

        let ledger = GroupLedger::build(&flat, &expenses, &settlements);
        let again = GroupLedger::build(&flat, &expenses, &settlements);
        assert_eq!(ledger, again);
        assert_eq!(ledger.totals_sum(), MoneyCents::ZERO);

        for member in ledger.members() {
            let incoming: MoneyCents = ledger.owed_by(member).iter().map(|(_, a)| *a).sum();
            let outgoing: MoneyCents = ledger.owes(member).iter().map(|(_, a)| *a).sum();
            assert_eq!(ledger.total(member), incoming - outgoing, "member {member}");
        }
    }
}
