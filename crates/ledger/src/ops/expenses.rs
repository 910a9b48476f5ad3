use uuid::Uuid;

use crate::{
    DEFAULT_CATEGORY, Expense, ExpenseCmd, LedgerError, LedgerStore, ResultLedger, Snapshot,
    SplitsInput, validate_expense,
};

use super::{Engine, normalize_optional_text, normalize_required_text};

impl<S: LedgerStore> Engine<S> {
    /// Checks a proposed expense without recording it.
    pub fn validate_expense(&self, cmd: &ExpenseCmd) -> ResultLedger<()> {
        self.with_snapshot(|_, snapshot| prepare_expense(snapshot, cmd).map(|_| ()))
    }

    /// Validates and records an expense, returning the stored record.
    pub fn create_expense(&self, cmd: ExpenseCmd) -> ResultLedger<Expense> {
        self.with_tx(|_, snapshot| {
            let expense = prepare_expense(snapshot, &cmd)?;
            snapshot.expenses.push(expense.clone());
            tracing::info!(
                expense_id = %expense.id,
                payer = %expense.payer_id,
                amount = %expense.amount,
                split_type = expense.split_type.as_str(),
                splits = expense.splits.len(),
                "expense created"
            );
            Ok(expense)
        })
    }

    /// Deletes an expense. Only its creator or its payer may do it.
    pub fn delete_expense(&self, expense_id: Uuid, actor: &str) -> ResultLedger<()> {
        self.with_tx(|_, snapshot| {
            let expense = snapshot.expense(expense_id)?;
            if expense.created_by != actor && expense.payer_id != actor {
                return Err(LedgerError::Authorization(format!(
                    "only the creator or the payer can delete expense {expense_id}"
                )));
            }
            snapshot.expenses.retain(|expense| expense.id != expense_id);
            tracing::info!(%expense_id, actor, "expense deleted");
            Ok(())
        })
    }
}

fn prepare_expense(snapshot: &Snapshot, cmd: &ExpenseCmd) -> ResultLedger<Expense> {
    let description = normalize_required_text(&cmd.description, "description")?;
    let category = normalize_optional_text(cmd.category.as_deref())
        .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());

    let group = match cmd.group_id {
        Some(group_id) => {
            let group = snapshot.group(group_id)?;
            group.require_member(&cmd.actor)?;
            Some(group)
        }
        None => None,
    };

    let (split_type, splits) = match &cmd.splits {
        SplitsInput::Given(split_type, splits) => (*split_type, splits.clone()),
        SplitsInput::Plan(plan) => (plan.split_type(), plan.build(cmd.amount, &cmd.payer_id)?),
    };

    validate_expense(cmd.amount, &cmd.payer_id, &splits, group)?;

    snapshot.require_user(&cmd.payer_id)?;
    for split in &splits {
        snapshot.require_user(&split.user_id)?;
    }

    Ok(Expense {
        id: Uuid::new_v4(),
        description,
        amount: cmd.amount,
        category,
        date: cmd.date,
        payer_id: cmd.payer_id.clone(),
        split_type,
        splits,
        group_id: cmd.group_id,
        created_by: cmd.actor.clone(),
    })
}
