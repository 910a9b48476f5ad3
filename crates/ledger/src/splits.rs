//! Builders turning a split choice into concrete per-user amounts.
//!
//! All amounts are computed in cents. When the amount doesn't divide evenly
//! the leftover cents are handed out one at a time, starting with the payer
//! (when they take part) and then following the participant order, so the
//! splits always add up to the expense amount exactly.

use std::collections::HashSet;

use crate::{LedgerError, MoneyCents, ResultLedger, Split, SplitType, users::UserId};

/// Percentages are handled in hundredths of a percent; 100% = 10_000.
const FULL_BASIS_POINTS: i64 = 10_000;

/// How the amount should be divided.
#[derive(Clone, Debug, PartialEq)]
pub enum SplitPlan {
    /// Same share for every participant.
    Equal(Vec<UserId>),
    /// Share per participant as a percentage (0..=100) of the amount.
    Percentage(Vec<(UserId, f64)>),
    /// Explicit amounts, used as given.
    Exact(Vec<(UserId, MoneyCents)>),
}

impl SplitPlan {
    #[must_use]
    pub fn split_type(&self) -> SplitType {
        match self {
            SplitPlan::Equal(_) => SplitType::Equal,
            SplitPlan::Percentage(_) => SplitType::Percentage,
            SplitPlan::Exact(_) => SplitType::Exact,
        }
    }

    /// Computes the splits of `amount` paid by `payer_id`.
    ///
    /// `Exact` plans are not checked against the amount here; that is the job
    /// of the split validator.
    pub fn build(&self, amount: MoneyCents, payer_id: &str) -> ResultLedger<Vec<Split>> {
        match self {
            SplitPlan::Equal(participants) => {
                ensure_unique(participants.iter().map(String::as_str))?;
                if participants.is_empty() {
                    return Err(LedgerError::Validation(
                        "an equal split needs at least one participant".to_string(),
                    ));
                }
                let count = participants.len() as i64;
                let base = amount.cents() / count;
                let shares = participants
                    .iter()
                    .map(|user_id| (user_id.clone(), base))
                    .collect();
                Ok(distribute_remainder(shares, amount, payer_id))
            }
            SplitPlan::Percentage(shares) => {
                ensure_unique(shares.iter().map(|(user_id, _)| user_id.as_str()))?;
                if shares.is_empty() {
                    return Err(LedgerError::Validation(
                        "a percentage split needs at least one participant".to_string(),
                    ));
                }
                let mut basis_points = Vec::with_capacity(shares.len());
                for (user_id, percentage) in shares {
                    if !percentage.is_finite() || *percentage < 0.0 || *percentage > 100.0 {
                        return Err(LedgerError::Validation(format!(
                            "invalid percentage for {user_id}: {percentage}"
                        )));
                    }
                    basis_points.push((user_id.clone(), (percentage * 100.0).round() as i64));
                }
                let total: i64 = basis_points.iter().map(|(_, bp)| bp).sum();
                if (total - FULL_BASIS_POINTS).abs() > 1 {
                    return Err(LedgerError::Validation(format!(
                        "percentages must add up to 100, got {}.{:02}",
                        total / 100,
                        total % 100
                    )));
                }
                let shares = basis_points
                    .into_iter()
                    .map(|(user_id, bp)| -> ResultLedger<(UserId, i64)> {
                        let share = amount.cents().checked_mul(bp).ok_or_else(|| {
                            LedgerError::Validation(format!("amount {amount} is too large"))
                        })?;
                        Ok((user_id, share / total))
                    })
                    .collect::<ResultLedger<_>>()?;
                Ok(distribute_remainder(shares, amount, payer_id))
            }
            SplitPlan::Exact(shares) => {
                ensure_unique(shares.iter().map(|(user_id, _)| user_id.as_str()))?;
                Ok(shares
                    .iter()
                    .map(|(user_id, share)| Split::new(user_id.clone(), *share))
                    .collect())
            }
        }
    }
}

fn ensure_unique<'a>(user_ids: impl Iterator<Item = &'a str>) -> ResultLedger<()> {
    let mut seen = HashSet::new();
    for user_id in user_ids {
        if !seen.insert(user_id) {
            return Err(LedgerError::Validation(format!(
                "{user_id} appears more than once in the splits"
            )));
        }
    }
    Ok(())
}

/// Hands out `amount - sum(shares)` one cent at a time, payer first.
fn distribute_remainder(shares: Vec<(UserId, i64)>, amount: MoneyCents, payer_id: &str) -> Vec<Split> {
    let mut cents: Vec<i64> = shares.iter().map(|(_, share)| *share).collect();
    let mut remainder = amount.cents() - cents.iter().sum::<i64>();

    let payer_position = shares.iter().position(|(user_id, _)| user_id == payer_id);
    let order = payer_position
        .into_iter()
        .chain((0..shares.len()).filter(|idx| Some(*idx) != payer_position));

    let order: Vec<usize> = order.collect();
    let step = remainder.signum();
    let mut cursor = 0;
    while remainder != 0 && !order.is_empty() {
        cents[order[cursor % order.len()]] += step;
        remainder -= step;
        cursor += 1;
    }

    shares
        .into_iter()
        .zip(cents)
        .map(|((user_id, _), share)| Split::new(user_id, MoneyCents::new(share)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(names: &[&str]) -> Vec<UserId> {
        names.iter().map(|name| name.to_string()).collect()
    }

    fn amounts(splits: &[Split]) -> Vec<i64> {
        splits.iter().map(|split| split.amount.cents()).collect()
    }

    #[test]
    fn equal_split_gives_leftover_cent_to_payer() {
        let plan = SplitPlan::Equal(ids(&["alice", "bob", "carol"]));
        let splits = plan.build(MoneyCents::new(1000), "bob").unwrap();

        assert_eq!(amounts(&splits), vec![333, 334, 333]);
        assert_eq!(splits.iter().map(|s| s.amount).sum::<MoneyCents>(), MoneyCents::new(1000));
        assert!(splits.iter().all(|s| !s.paid));
    }

    #[test]
    fn equal_split_without_payer_starts_from_first_participant() {
        let plan = SplitPlan::Equal(ids(&["bob", "carol", "dave"]));
        let splits = plan.build(MoneyCents::new(1001), "alice").unwrap();

        assert_eq!(amounts(&splits), vec![334, 334, 333]);
    }

    #[test]
    fn equal_split_rejects_duplicates() {
        let plan = SplitPlan::Equal(ids(&["alice", "alice"]));
        assert_eq!(
            plan.build(MoneyCents::new(1000), "alice"),
            Err(LedgerError::Validation(
                "alice appears more than once in the splits".to_string()
            ))
        );
    }

    #[test]
    fn percentage_split_adds_up() {
        let plan = SplitPlan::Percentage(vec![
            ("alice".to_string(), 33.33),
            ("bob".to_string(), 33.33),
            ("carol".to_string(), 33.34),
        ]);
        let splits = plan.build(MoneyCents::new(10_000), "alice").unwrap();

        assert_eq!(amounts(&splits), vec![3333, 3333, 3334]);
        assert_eq!(plan.split_type(), SplitType::Percentage);
    }

    #[test]
    fn percentage_split_rejects_bad_total() {
        let plan = SplitPlan::Percentage(vec![
            ("alice".to_string(), 50.0),
            ("bob".to_string(), 40.0),
        ]);
        assert!(plan.build(MoneyCents::new(10_000), "alice").is_err());
    }

    #[test]
    fn percentage_split_of_huge_amount_is_rejected() {
        let plan = SplitPlan::Percentage(vec![
            ("alice".to_string(), 50.0),
            ("bob".to_string(), 50.0),
        ]);
        assert!(matches!(
            plan.build(MoneyCents::new(i64::MAX / 2), "alice"),
            Err(LedgerError::Validation(_))
        ));
    }

    #[test]
    fn exact_split_is_used_verbatim() {
        let plan = SplitPlan::Exact(vec![
            ("alice".to_string(), MoneyCents::new(700)),
            ("bob".to_string(), MoneyCents::new(300)),
        ]);
        let splits = plan.build(MoneyCents::new(1000), "alice").unwrap();
        assert_eq!(amounts(&splits), vec![700, 300]);
    }
}
