use crate::{Contacts, LedgerStore, MoneyCents, MonthlyTotal, ResultLedger, reports, spending};

use super::Engine;

impl<S: LedgerStore> Engine<S> {
    pub fn contacts(&self, me: &str) -> ResultLedger<Contacts> {
        self.with_snapshot(|_, snapshot| Ok(reports::contacts(snapshot, me)))
    }

    /// Sum of `me`'s shares on expenses dated in `year`.
    pub fn total_spent(&self, me: &str, year: i32) -> ResultLedger<MoneyCents> {
        self.with_snapshot(|_, snapshot| spending::total_spent(&snapshot.expenses, me, year))
    }

    pub fn monthly_spending(&self, me: &str, year: i32) -> ResultLedger<Vec<MonthlyTotal>> {
        self.with_snapshot(|_, snapshot| spending::monthly_spending(&snapshot.expenses, me, year))
    }
}
