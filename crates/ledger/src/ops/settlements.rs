use uuid::Uuid;

use crate::{
    GroupLedger, LedgerStore, MoneyCents, ResolvedSettlement, ResultLedger, Settlement,
    SettlementCmd, SettlementNotice, SettlementRequest, Snapshot, pairwise_balance,
    resolve_settlement,
};

use super::{Engine, normalize_optional_text};

impl<S: LedgerStore> Engine<S> {
    /// Decides payer, receiver and amount of a settlement against the current
    /// balance, without recording anything.
    pub fn resolve_settlement(&self, cmd: &SettlementCmd) -> ResultLedger<ResolvedSettlement> {
        self.with_snapshot(|_, snapshot| resolve_in(snapshot, cmd))
    }

    /// Records a settlement. The balance it settles is recomputed inside the
    /// same write, so concurrent settlements can't both consume it.
    pub fn create_settlement(&self, cmd: SettlementCmd) -> ResultLedger<SettlementNotice> {
        self.with_tx(|_, snapshot| {
            let resolved = resolve_in(snapshot, &cmd)?;

            for expense_id in &cmd.related_expense_ids {
                snapshot.expense(*expense_id)?;
            }
            let group_name = match cmd.group_id {
                Some(group_id) => Some(snapshot.group(group_id)?.name.clone()),
                None => None,
            };

            if resolved.clamped {
                tracing::info!(
                    requested = %cmd.amount,
                    recorded = %resolved.amount,
                    "settlement amount lowered to the outstanding balance"
                );
            }

            let settlement = Settlement {
                id: Uuid::new_v4(),
                amount: resolved.amount,
                note: normalize_optional_text(cmd.note.as_deref()),
                date: cmd.date,
                payer_id: resolved.payer_id,
                receiver_id: resolved.receiver_id,
                group_id: cmd.group_id,
                related_expense_ids: cmd.related_expense_ids.clone(),
                created_by: cmd.actor.clone(),
            };
            snapshot.settlements.push(settlement.clone());
            tracing::info!(
                settlement_id = %settlement.id,
                payer = %settlement.payer_id,
                receiver = %settlement.receiver_id,
                amount = %settlement.amount,
                "settlement created"
            );

            Ok(SettlementNotice::new(snapshot, settlement, group_name))
        })
    }
}

/// Current balance of `actor` with `counterpart`, positive when the
/// counterpart owes the actor.
fn current_balance(
    snapshot: &Snapshot,
    actor: &str,
    counterpart: &str,
    group_id: Option<Uuid>,
) -> ResultLedger<MoneyCents> {
    match group_id {
        Some(group_id) => {
            let group = snapshot.group(group_id)?;
            group.require_member(actor)?;
            group.require_member(counterpart)?;
            let ledger = GroupLedger::build(group, &snapshot.expenses, &snapshot.settlements);
            Ok(ledger.net_between(actor, counterpart))
        }
        None => {
            snapshot.require_user(counterpart)?;
            let pairwise =
                pairwise_balance(actor, counterpart, &snapshot.expenses, &snapshot.settlements)?;
            Ok(pairwise.balance)
        }
    }
}

fn resolve_in(snapshot: &Snapshot, cmd: &SettlementCmd) -> ResultLedger<ResolvedSettlement> {
    snapshot.require_user(&cmd.actor)?;

    // Empty or self counterparts are rejected by the resolver itself.
    let degenerate = cmd.counterpart.trim().is_empty() || cmd.counterpart == cmd.actor;
    let net_balance = if degenerate {
        MoneyCents::ZERO
    } else {
        current_balance(snapshot, &cmd.actor, &cmd.counterpart, cmd.group_id)?
    };

    let request = SettlementRequest {
        entity_type: cmd.entity_type(),
        me: cmd.actor.clone(),
        counterpart: cmd.counterpart.clone(),
        net_balance,
        payment_type: cmd.payment_type,
        amount: cmd.amount,
        allow_clamp: cmd.allow_clamp,
    };
    resolve_settlement(&request).inspect_err(|err| {
        tracing::debug!(
            actor = %cmd.actor,
            counterpart = %cmd.counterpart,
            %net_balance,
            "settlement rejected: {err}"
        );
    })
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::{LedgerError, MemoryStore, PaymentType, User};

    fn engine() -> Engine {
        let snapshot = Snapshot {
            users: vec![
                User::new("alice", "Alice", "alice@example.com"),
                User::new("bob", "Bob", "bob@example.com"),
            ],
            ..Snapshot::default()
        };
        Engine::builder()
            .store(MemoryStore::new(snapshot))
            .build()
            .unwrap()
    }

    #[test]
    fn unknown_counterpart_is_not_found() {
        let cmd = SettlementCmd::new(
            "alice",
            "zoe",
            PaymentType::YouPaid,
            MoneyCents::new(100),
            Utc::now(),
        );
        assert_eq!(
            engine().resolve_settlement(&cmd),
            Err(LedgerError::NotFound("user zoe".to_string()))
        );
    }

    #[test]
    fn self_settlement_is_a_validation_error() {
        let cmd = SettlementCmd::new(
            "alice",
            "alice",
            PaymentType::YouPaid,
            MoneyCents::new(100),
            Utc::now(),
        );
        assert_eq!(
            engine().resolve_settlement(&cmd),
            Err(LedgerError::Validation("cannot settle with yourself".to_string()))
        );
    }

    #[test]
    fn nothing_to_settle_between_strangers() {
        let cmd = SettlementCmd::new(
            "alice",
            "bob",
            PaymentType::YouPaid,
            MoneyCents::new(100),
            Utc::now(),
        );
        assert_eq!(
            engine().create_settlement(cmd),
            Err(LedgerError::Validation("already settled up with bob".to_string()))
        );
    }
}
