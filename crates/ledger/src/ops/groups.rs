use std::collections::BTreeSet;

use uuid::Uuid;

use crate::{
    Group, GroupCmd, GroupLedger, GroupLedgerReport, GroupMember, GroupRole, LedgerError,
    LedgerStore, ResultLedger, UserGroupBalance, reports,
};

use super::{Engine, normalize_optional_text, normalize_required_text};

impl<S: LedgerStore> Engine<S> {
    /// Creates a group. The creator is always a member and its admin.
    pub fn create_group(&self, cmd: GroupCmd) -> ResultLedger<Group> {
        self.with_tx(|_, snapshot| {
            let name = normalize_required_text(&cmd.name, "group name")?;
            let description = normalize_optional_text(cmd.description.as_deref()).unwrap_or_default();

            snapshot.require_user(&cmd.actor)?;
            let mut seen = BTreeSet::new();
            let mut members = vec![GroupMember {
                user_id: cmd.actor.clone(),
                role: GroupRole::Admin,
                joined_at: cmd.created_at,
            }];
            seen.insert(cmd.actor.as_str());
            for user_id in &cmd.members {
                if !seen.insert(user_id.as_str()) {
                    continue;
                }
                snapshot.require_user(user_id)?;
                members.push(GroupMember {
                    user_id: user_id.clone(),
                    role: GroupRole::Member,
                    joined_at: cmd.created_at,
                });
            }

            let group = Group {
                id: Uuid::new_v4(),
                name,
                description,
                created_by: cmd.actor.clone(),
                members,
            };
            snapshot.groups.push(group.clone());
            tracing::info!(
                group_id = %group.id,
                name = %group.name,
                members = group.members.len(),
                "group created"
            );
            Ok(group)
        })
    }

    /// Deletes a group with its expenses and settlements.
    ///
    /// Only the creator may do it, and only once every balance in the group is
    /// settled. The check runs on the same snapshot the deletion commits.
    pub fn delete_group(&self, group_id: Uuid, actor: &str) -> ResultLedger<()> {
        self.with_tx(|engine, snapshot| {
            let group = snapshot.group(group_id)?;
            if group.created_by != actor {
                return Err(LedgerError::Authorization(format!(
                    "only the creator can delete group {}",
                    group.name
                )));
            }
            let ledger = GroupLedger::build(group, &snapshot.expenses, &snapshot.settlements);
            if !reports::is_settled_up(&ledger, engine.threshold) {
                return Err(LedgerError::Consistency(format!(
                    "group {} still has unsettled balances",
                    group.name
                )));
            }

            snapshot.groups.retain(|group| group.id != group_id);
            snapshot.expenses.retain(|expense| !expense.belongs_to(group_id));
            snapshot
                .settlements
                .retain(|settlement| !settlement.belongs_to(group_id));
            tracing::info!(%group_id, actor, "group deleted");
            Ok(())
        })
    }

    /// `true` when no balance in the group is significant.
    pub fn can_delete_group(&self, group_id: Uuid) -> ResultLedger<bool> {
        self.with_snapshot(|engine, snapshot| {
            let group = snapshot.group(group_id)?;
            let ledger = GroupLedger::build(group, &snapshot.expenses, &snapshot.settlements);
            Ok(reports::is_settled_up(&ledger, engine.threshold))
        })
    }

    /// Who owes whom inside a group. `me` must be a member.
    pub fn group_ledger(&self, group_id: Uuid, me: &str) -> ResultLedger<GroupLedgerReport> {
        self.with_snapshot(|engine, snapshot| {
            let group = snapshot.group(group_id)?;
            group.require_member(me)?;
            let ledger = GroupLedger::build(group, &snapshot.expenses, &snapshot.settlements);
            tracing::debug!(
                %group_id,
                debts = ledger.debts().count(),
                "group ledger built"
            );
            Ok(reports::group_ledger_report(
                snapshot,
                group,
                &ledger,
                engine.threshold,
            ))
        })
    }

    /// Groups of `me`, each with `me`'s balance in it.
    pub fn user_groups(&self, me: &str) -> ResultLedger<Vec<UserGroupBalance>> {
        self.with_snapshot(|_, snapshot| Ok(reports::user_groups(snapshot, me)))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::{MemoryStore, Snapshot, User};

    fn engine() -> Engine {
        let snapshot = Snapshot {
            users: ["alice", "bob", "carol"]
                .into_iter()
                .map(|id| User::new(id, id.to_uppercase(), format!("{id}@example.com")))
                .collect(),
            ..Snapshot::default()
        };
        Engine::builder()
            .store(MemoryStore::new(snapshot))
            .build()
            .unwrap()
    }

    #[test]
    fn create_group_dedupes_members_and_adds_creator() {
        let engine = engine();
        let group = engine
            .create_group(
                GroupCmd::new("alice", "  Trip  ", Utc::now())
                    .description("  ")
                    .members(vec!["bob".to_string(), "bob".to_string(), "alice".to_string()]),
            )
            .unwrap();

        assert_eq!(group.name, "Trip");
        assert_eq!(group.description, "");
        assert_eq!(group.member_ids().collect::<Vec<_>>(), vec!["alice", "bob"]);
        assert_eq!(group.members[0].role, GroupRole::Admin);
        assert_eq!(group.members[1].role, GroupRole::Member);
    }

    #[test]
    fn create_group_rejects_unknown_members() {
        let engine = engine();
        let result = engine.create_group(
            GroupCmd::new("alice", "Trip", Utc::now()).members(vec!["zoe".to_string()]),
        );
        assert_eq!(result, Err(LedgerError::NotFound("user zoe".to_string())));
        assert!(engine.store().snapshot().unwrap().groups.is_empty());
    }

    #[test]
    fn create_group_requires_a_name() {
        let result = engine().create_group(GroupCmd::new("alice", "   ", Utc::now()));
        assert!(matches!(result, Err(LedgerError::Validation(_))));
    }

    #[test]
    fn only_creator_deletes_group() {
        let engine = engine();
        let group = engine
            .create_group(GroupCmd::new("alice", "Flat", Utc::now()).members(vec!["bob".to_string()]))
            .unwrap();

        assert!(matches!(
            engine.delete_group(group.id, "bob"),
            Err(LedgerError::Authorization(_))
        ));
        assert!(engine.can_delete_group(group.id).unwrap());
        engine.delete_group(group.id, "alice").unwrap();
        assert!(matches!(
            engine.can_delete_group(group.id),
            Err(LedgerError::NotFound(_))
        ));
    }

    #[test]
    fn group_ledger_is_members_only() {
        let engine = engine();
        let group = engine
            .create_group(GroupCmd::new("alice", "Flat", Utc::now()))
            .unwrap();
        assert!(matches!(
            engine.group_ledger(group.id, "carol"),
            Err(LedgerError::Authorization(_))
        ));
        assert!(engine.group_ledger(group.id, "alice").is_ok());
    }
}
