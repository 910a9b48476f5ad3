use crate::{
    ContactUser, DebtReminder, LedgerStore, PairwiseReport, ResultLedger, UserBalanceSummary,
    pairwise_balance, reports,
};

use super::Engine;

impl<S: LedgerStore> Engine<S> {
    /// One-to-one balance of `me` with `other`, positive when `other` owes
    /// `me`, with the records it comes from (newest first) and `other`'s
    /// display row.
    pub fn pairwise_balance(&self, me: &str, other: &str) -> ResultLedger<PairwiseReport> {
        self.with_snapshot(|_, snapshot| {
            snapshot.require_user(me)?;
            let other_user = ContactUser::from(snapshot.require_user(other)?);
            let pairwise = pairwise_balance(me, other, &snapshot.expenses, &snapshot.settlements)?;
            tracing::debug!(
                me,
                other,
                balance = %pairwise.balance,
                expenses = pairwise.expenses.len(),
                settlements = pairwise.settlements.len(),
                "pairwise balance computed"
            );
            Ok(PairwiseReport {
                other_user,
                pairwise,
            })
        })
    }

    /// What `me` owes and is owed across all one-to-one balances.
    pub fn user_balance_summary(&self, me: &str) -> ResultLedger<UserBalanceSummary> {
        self.with_snapshot(|engine, snapshot| {
            let summary = reports::user_balance_summary(snapshot, me, engine.threshold);
            tracing::debug!(
                me,
                you_owe = %summary.you_owe,
                you_are_owed = %summary.you_are_owed,
                "balance summary computed"
            );
            Ok(summary)
        })
    }

    /// Users with significant debts, for payment reminders.
    pub fn outstanding_debts(&self) -> ResultLedger<Vec<DebtReminder>> {
        self.with_snapshot(|engine, snapshot| {
            Ok(reports::outstanding_debts(snapshot, engine.threshold))
        })
    }
}
