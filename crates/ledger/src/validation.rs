//! Split validator.
//!
//! Structural checks run on a proposed expense before it is accepted. They are
//! pure: nothing is read or written here.

use std::collections::HashSet;

use crate::{Group, LedgerError, MoneyCents, ResultLedger, Split};

/// Allowed gap between the sum of the splits and the expense amount (0.01).
pub const SPLIT_TOLERANCE: MoneyCents = MoneyCents::new(1);

/// Rejects empty splits, repeated users, negative shares, shares above
/// `amount` and splits whose sum is more than [`SPLIT_TOLERANCE`] away from
/// `amount`.
pub fn validate_splits(amount: MoneyCents, splits: &[Split]) -> ResultLedger<()> {
    if splits.is_empty() {
        return Err(LedgerError::Validation(
            "an expense needs at least one split".to_string(),
        ));
    }

    let mut seen = HashSet::with_capacity(splits.len());
    for split in splits {
        if split.user_id.trim().is_empty() {
            return Err(LedgerError::Validation(
                "split user must not be empty".to_string(),
            ));
        }
        if !seen.insert(split.user_id.as_str()) {
            return Err(LedgerError::Validation(format!(
                "{} appears more than once in the splits",
                split.user_id
            )));
        }
        if split.amount.is_negative() {
            return Err(LedgerError::Validation(format!(
                "split amount for {} must be >= 0",
                split.user_id
            )));
        }
        if split.amount > amount {
            return Err(LedgerError::Validation(format!(
                "split amount for {} is larger than the expense",
                split.user_id
            )));
        }
    }

    let total = splits
        .iter()
        .try_fold(MoneyCents::ZERO, |total, split| total.checked_add(split.amount))
        .ok_or_else(|| {
            LedgerError::Validation("splits do not add up to the total amount".to_string())
        })?;
    if (total - amount).abs() > SPLIT_TOLERANCE {
        return Err(LedgerError::Validation(format!(
            "splits do not add up to the total amount ({total} vs {amount})"
        )));
    }
    Ok(())
}

/// On group expenses the payer and every split user must be members.
pub fn validate_group_participants(
    group: &Group,
    payer_id: &str,
    splits: &[Split],
) -> ResultLedger<()> {
    if !group.is_member(payer_id) {
        return Err(LedgerError::Authorization(format!(
            "payer {payer_id} is not a member of group {}",
            group.name
        )));
    }
    if let Some(outsider) = splits.iter().find(|split| !group.is_member(&split.user_id)) {
        return Err(LedgerError::Authorization(format!(
            "{} is not a member of group {}",
            outsider.user_id, group.name
        )));
    }
    Ok(())
}

/// Full check of a proposed expense: amount, splits and, for group expenses,
/// membership of everyone involved.
pub fn validate_expense(
    amount: MoneyCents,
    payer_id: &str,
    splits: &[Split],
    group: Option<&Group>,
) -> ResultLedger<()> {
    if !amount.is_positive() {
        return Err(LedgerError::Validation(format!(
            "expense amount must be > 0, got {amount}"
        )));
    }
    if payer_id.trim().is_empty() {
        return Err(LedgerError::Validation("payer must not be empty".to_string()));
    }
    validate_splits(amount, splits)?;
    if let Some(group) = group {
        validate_group_participants(group, payer_id, splits)?;
    }
    Ok(())
}
