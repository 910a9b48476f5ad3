//! Significance threshold for balances.
//!
//! Aggregation is always exact. The threshold is applied on top of it, wherever
//! a balance becomes visible to a user: hiding near-zero rows, deciding whether
//! a group is settled up and choosing the sign of a displayed balance.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{LedgerError, MoneyCents, ResultLedger};

/// Minimum absolute balance treated as a real debt (θ).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "MoneyCents", into = "MoneyCents")]
pub struct Threshold(MoneyCents);

impl Threshold {
    /// 0.50 in major units.
    pub const DEFAULT: Threshold = Threshold(MoneyCents::new(50));

    /// Creates a threshold; negative values are rejected.
    pub fn new(amount: MoneyCents) -> ResultLedger<Self> {
        if amount.is_negative() {
            return Err(LedgerError::Validation(format!(
                "balance threshold must be >= 0, got {amount}"
            )));
        }
        Ok(Self(amount))
    }

    #[must_use]
    pub const fn amount(self) -> MoneyCents {
        self.0
    }

    /// `|balance| >= θ`. A zero balance is never significant, even with θ = 0.
    #[must_use]
    pub fn is_significant(self, balance: MoneyCents) -> bool {
        !balance.is_zero() && balance.abs() >= self.0
    }

    /// Significant and owed to the reference party.
    #[must_use]
    pub fn is_significant_positive(self, balance: MoneyCents) -> bool {
        self.is_significant(balance) && balance.is_positive()
    }

    /// Significant and owed by the reference party.
    #[must_use]
    pub fn is_significant_negative(self, balance: MoneyCents) -> bool {
        self.is_significant(balance) && balance.is_negative()
    }

    /// `true` when the balance counts as settled.
    #[must_use]
    pub fn is_settled(self, balance: MoneyCents) -> bool {
        !self.is_significant(balance)
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<MoneyCents> for Threshold {
    type Error = LedgerError;

    fn try_from(value: MoneyCents) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Threshold> for MoneyCents {
    fn from(value: Threshold) -> Self {
        value.0
    }
}

impl FromStr for Threshold {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.parse()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_half_unit() {
        assert_eq!(Threshold::default().amount(), MoneyCents::new(50));
    }

    #[test]
    fn boundary_is_significant() {
        let theta = Threshold::default();
        assert!(theta.is_significant(MoneyCents::new(50)));
        assert!(theta.is_significant(MoneyCents::new(-50)));
        assert!(!theta.is_significant(MoneyCents::new(49)));
        assert!(theta.is_settled(MoneyCents::new(-49)));
    }

    #[test]
    fn signed_helpers() {
        let theta = Threshold::default();
        assert!(theta.is_significant_positive(MoneyCents::new(100)));
        assert!(!theta.is_significant_positive(MoneyCents::new(-100)));
        assert!(theta.is_significant_negative(MoneyCents::new(-100)));
        assert!(!theta.is_significant_negative(MoneyCents::new(-10)));
    }

    #[test]
    fn zero_threshold_flags_any_nonzero_balance() {
        let theta: Threshold = "0".parse().unwrap();
        assert!(theta.is_significant(MoneyCents::new(1)));
        assert!(!theta.is_significant(MoneyCents::ZERO));
    }

    #[test]
    fn rejects_negative_threshold() {
        assert!("-0.5".parse::<Threshold>().is_err());
    }
}
