//! Spending insights.
//!
//! A user's spending is the sum of their own split amounts, whoever paid.
//! Months are calendar months in UTC.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::Serialize;

use crate::{Expense, LedgerError, MoneyCents, ResultLedger};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MonthlyTotal {
    /// `YYYY-MM`.
    pub month: String,
    pub total: MoneyCents,
}

fn share_of(expense: &Expense, me: &str) -> MoneyCents {
    expense
        .split_of(me)
        .map_or(MoneyCents::ZERO, |split| split.amount)
}

fn check_year(year: i32) -> ResultLedger<()> {
    if NaiveDate::from_ymd_opt(year, 1, 1).is_none() {
        return Err(LedgerError::Validation(format!("invalid year {year}")));
    }
    Ok(())
}

fn in_year(date: &DateTime<Utc>, year: i32) -> bool {
    date.year() == year
}

/// Sum of `me`'s shares on expenses dated in `year`.
pub fn total_spent<'a>(
    expenses: impl IntoIterator<Item = &'a Expense>,
    me: &str,
    year: i32,
) -> ResultLedger<MoneyCents> {
    check_year(year)?;
    Ok(expenses
        .into_iter()
        .filter(|expense| in_year(&expense.date, year))
        .map(|expense| share_of(expense, me))
        .sum())
}

/// Twelve monthly totals of `me`'s shares for `year`, January first.
pub fn monthly_spending<'a>(
    expenses: impl IntoIterator<Item = &'a Expense>,
    me: &str,
    year: i32,
) -> ResultLedger<Vec<MonthlyTotal>> {
    check_year(year)?;

    let mut totals = [MoneyCents::ZERO; 12];
    for expense in expenses
        .into_iter()
        .filter(|expense| in_year(&expense.date, year))
    {
        // month0 is always in 0..12
        totals[expense.date.month0() as usize] += share_of(expense, me);
    }

    Ok(totals
        .iter()
        .enumerate()
        .map(|(index, total)| MonthlyTotal {
            month: format!("{year:04}-{:02}", index + 1),
            total: *total,
        })
        .collect())
}
