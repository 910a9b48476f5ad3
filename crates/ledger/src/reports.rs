//! Balance reporter.
//!
//! Shapes aggregator output into the results handed to callers. This is the
//! only place where the significance threshold filters rows; the numbers
//! themselves come straight from the exact aggregation.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use uuid::Uuid;

use crate::{
    Expense, GroupLedger, GroupRole, MoneyCents, PairwiseBalance, Settlement, Snapshot, Threshold,
    User,
    pairwise::{
        expense_delta, expense_qualifies, newest_first, settlement_delta, settlement_qualifies,
    },
    users::UserId,
};

/// A counterpart and the amount involved, for display.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceRow {
    pub user_id: UserId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub amount: MoneyCents,
}

impl BalanceRow {
    fn new(snapshot: &Snapshot, user_id: &str, amount: MoneyCents) -> Self {
        let user = snapshot.user(user_id);
        Self {
            user_id: user_id.to_string(),
            name: snapshot.display_name(user_id),
            image_url: user.and_then(|user| user.image_url.clone()),
            amount,
        }
    }
}

/// One-to-one balances of a user across all counterparts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserBalanceSummary {
    pub you_owe: MoneyCents,
    pub you_are_owed: MoneyCents,
    pub total_balance: MoneyCents,
    pub owe_list: Vec<BalanceRow>,
    pub owed_by_list: Vec<BalanceRow>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupMemberInfo {
    pub user_id: UserId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub role: GroupRole,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OwesEntry {
    pub to: UserId,
    pub amount: MoneyCents,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OwedByEntry {
    pub from: UserId,
    pub amount: MoneyCents,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberBalance {
    pub user_id: UserId,
    pub total_balance: MoneyCents,
    pub owes: Vec<OwesEntry>,
    pub owed_by: Vec<OwedByEntry>,
}

/// Who owes whom inside a group.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupLedgerReport {
    pub group_id: Uuid,
    pub name: String,
    pub members: Vec<GroupMemberInfo>,
    pub balances: Vec<MemberBalance>,
    /// Records of the group, newest first.
    pub expenses: Vec<Expense>,
    pub settlements: Vec<Settlement>,
}

/// A group seen from one member.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserGroupBalance {
    pub group_id: Uuid,
    pub name: String,
    pub description: String,
    pub member_count: usize,
    pub balance: MoneyCents,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactUser {
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl From<&User> for ContactUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            image_url: user.image_url.clone(),
        }
    }
}

/// A one-to-one balance together with the counterpart it is held with.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PairwiseReport {
    pub other_user: ContactUser,
    #[serde(flatten)]
    pub pairwise: PairwiseBalance,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactGroup {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub member_count: usize,
}

/// People and groups a user shares expenses with.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Contacts {
    pub users: Vec<ContactUser>,
    pub groups: Vec<ContactGroup>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebtRow {
    pub to: UserId,
    pub name: String,
    pub amount: MoneyCents,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_name: Option<String>,
}

/// Everything a user still has to pay, for payment reminders.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebtReminder {
    pub user_id: UserId,
    pub name: String,
    pub email: String,
    pub debts: Vec<DebtRow>,
}

/// Data the notification layer needs after a settlement is recorded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementNotice {
    pub settlement: Settlement,
    pub payer_name: String,
    pub payer_email: String,
    pub receiver_name: String,
    pub receiver_email: String,
    pub amount: MoneyCents,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_name: Option<String>,
}

impl SettlementNotice {
    pub fn new(snapshot: &Snapshot, settlement: Settlement, group_name: Option<String>) -> Self {
        let email = |user_id: &str| {
            snapshot
                .user(user_id)
                .map(|user| user.email.clone())
                .unwrap_or_default()
        };
        Self {
            payer_name: snapshot.display_name(&settlement.payer_id),
            payer_email: email(&settlement.payer_id),
            receiver_name: snapshot.display_name(&settlement.receiver_id),
            receiver_email: email(&settlement.receiver_id),
            amount: settlement.amount,
            note: settlement.note.clone(),
            group_name,
            settlement,
        }
    }
}

/// Net one-to-one balance of `me` with every counterpart, computed with the
/// same rules as [`crate::pairwise_balance`].
pub fn counterpart_balances(snapshot: &Snapshot, me: &str) -> BTreeMap<UserId, MoneyCents> {
    let mut nets: BTreeMap<UserId, MoneyCents> = BTreeMap::new();

    for expense in snapshot
        .expenses
        .iter()
        .filter(|expense| expense.is_pairwise() && expense.involves(me))
    {
        let others: BTreeSet<&str> = std::iter::once(expense.payer_id.as_str())
            .chain(expense.splits.iter().map(|split| split.user_id.as_str()))
            .filter(|user_id| *user_id != me)
            .collect();
        for other in others {
            if expense_qualifies(expense, me, other) {
                *nets.entry(other.to_string()).or_default() += expense_delta(expense, me, other);
            }
        }
    }

    for settlement in snapshot
        .settlements
        .iter()
        .filter(|settlement| settlement.is_pairwise() && settlement.involves(me))
    {
        let Some(other) = settlement.counterpart_of(me) else {
            continue;
        };
        if other != me && settlement_qualifies(settlement, me, other) {
            *nets.entry(other.to_string()).or_default() += settlement_delta(settlement, me);
        }
    }

    nets
}

fn sort_rows(rows: &mut [BalanceRow]) {
    rows.sort_by(|a, b| b.amount.cmp(&a.amount).then_with(|| a.user_id.cmp(&b.user_id)));
}

/// Builds the one-to-one summary of `me`.
///
/// Totals are exact; the lists only carry significant balances.
pub fn user_balance_summary(
    snapshot: &Snapshot,
    me: &str,
    threshold: Threshold,
) -> UserBalanceSummary {
    let nets = counterpart_balances(snapshot, me);

    let you_are_owed: MoneyCents = nets.values().filter(|net| net.is_positive()).sum();
    let you_owe: MoneyCents = nets
        .values()
        .filter(|net| net.is_negative())
        .map(|net| net.abs())
        .sum();

    let mut owe_list = Vec::new();
    let mut owed_by_list = Vec::new();
    for (user_id, net) in &nets {
        if threshold.is_significant_positive(*net) {
            owed_by_list.push(BalanceRow::new(snapshot, user_id, *net));
        } else if threshold.is_significant_negative(*net) {
            owe_list.push(BalanceRow::new(snapshot, user_id, net.abs()));
        }
    }
    sort_rows(&mut owe_list);
    sort_rows(&mut owed_by_list);

    UserBalanceSummary {
        you_owe,
        you_are_owed,
        total_balance: you_are_owed - you_owe,
        owe_list,
        owed_by_list,
    }
}

/// Shapes a built [`GroupLedger`] for display.
pub fn group_ledger_report(
    snapshot: &Snapshot,
    group: &crate::Group,
    ledger: &GroupLedger,
    threshold: Threshold,
) -> GroupLedgerReport {
    let members = group
        .members
        .iter()
        .map(|member| GroupMemberInfo {
            user_id: member.user_id.clone(),
            name: snapshot.display_name(&member.user_id),
            image_url: snapshot
                .user(&member.user_id)
                .and_then(|user| user.image_url.clone()),
            role: member.role,
        })
        .collect();

    let balances = group
        .member_ids()
        .map(|member| MemberBalance {
            user_id: member.to_string(),
            total_balance: ledger.total(member),
            owes: ledger
                .owes(member)
                .into_iter()
                .filter(|(_, amount)| threshold.is_significant(*amount))
                .map(|(to, amount)| OwesEntry { to, amount })
                .collect(),
            owed_by: ledger
                .owed_by(member)
                .into_iter()
                .filter(|(_, amount)| threshold.is_significant(*amount))
                .map(|(from, amount)| OwedByEntry { from, amount })
                .collect(),
        })
        .collect();

    let mut expenses: Vec<Expense> = snapshot
        .expenses
        .iter()
        .filter(|expense| expense.belongs_to(group.id))
        .cloned()
        .collect();
    let mut settlements: Vec<Settlement> = snapshot
        .settlements
        .iter()
        .filter(|settlement| settlement.belongs_to(group.id))
        .cloned()
        .collect();
    newest_first(&mut expenses, &mut settlements);

    GroupLedgerReport {
        group_id: group.id,
        name: group.name.clone(),
        members,
        balances,
        expenses,
        settlements,
    }
}

/// `true` when no member total and no pair entry of the group is significant.
pub fn is_settled_up(ledger: &GroupLedger, threshold: Threshold) -> bool {
    ledger
        .totals()
        .values()
        .all(|total| threshold.is_settled(*total))
        && ledger
            .debts()
            .all(|(_, _, amount)| threshold.is_settled(amount))
}

/// Groups of `me` with `me`'s balance in each.
pub fn user_groups(snapshot: &Snapshot, me: &str) -> Vec<UserGroupBalance> {
    snapshot
        .groups_of(me)
        .map(|group| {
            let ledger = GroupLedger::build(group, &snapshot.expenses, &snapshot.settlements);
            UserGroupBalance {
                group_id: group.id,
                name: group.name.clone(),
                description: group.description.clone(),
                member_count: group.members.len(),
                balance: ledger.total(me),
            }
        })
        .collect()
}

/// Users sharing one-to-one expenses with `me` and the groups of `me`, both
/// sorted by name.
pub fn contacts(snapshot: &Snapshot, me: &str) -> Contacts {
    let contact_ids: BTreeSet<&str> = snapshot
        .expenses
        .iter()
        .filter(|expense| expense.is_pairwise() && expense.involves(me))
        .flat_map(|expense| {
            std::iter::once(expense.payer_id.as_str())
                .chain(expense.splits.iter().map(|split| split.user_id.as_str()))
        })
        .filter(|user_id| *user_id != me)
        .collect();

    let mut users: Vec<ContactUser> = contact_ids
        .into_iter()
        .filter_map(|user_id| snapshot.user(user_id))
        .map(ContactUser::from)
        .collect();
    users.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));

    let mut groups: Vec<ContactGroup> = snapshot
        .groups_of(me)
        .map(|group| ContactGroup {
            id: group.id,
            name: group.name.clone(),
            description: group.description.clone(),
            member_count: group.members.len(),
        })
        .collect();
    groups.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));

    Contacts { users, groups }
}

/// Users with at least one significant debt, one-to-one or inside a group.
pub fn outstanding_debts(snapshot: &Snapshot, threshold: Threshold) -> Vec<DebtReminder> {
    let group_ledgers: Vec<(&crate::Group, GroupLedger)> = snapshot
        .groups
        .iter()
        .map(|group| {
            (
                group,
                GroupLedger::build(group, &snapshot.expenses, &snapshot.settlements),
            )
        })
        .collect();

    snapshot
        .users
        .iter()
        .filter_map(|user| {
            let mut debts: Vec<DebtRow> = user_balance_summary(snapshot, &user.id, threshold)
                .owe_list
                .into_iter()
                .map(|row| DebtRow {
                    to: row.user_id,
                    name: row.name,
                    amount: row.amount,
                    group_name: None,
                })
                .collect();

            for (group, ledger) in &group_ledgers {
                if !group.is_member(&user.id) {
                    continue;
                }
                debts.extend(
                    ledger
                        .owes(&user.id)
                        .into_iter()
                        .filter(|(_, amount)| threshold.is_significant(*amount))
                        .map(|(to, amount)| DebtRow {
                            name: snapshot.display_name(&to),
                            to,
                            amount,
                            group_name: Some(group.name.clone()),
                        }),
                );
            }

            (!debts.is_empty()).then(|| DebtReminder {
                user_id: user.id.clone(),
                name: user.name.clone(),
                email: user.email.clone(),
                debts,
            })
        })
        .collect()
}
