//! Expenses and their splits.
//!
//! An expense is paid by one user and attributed to participants through its
//! splits. A split flagged as `paid` has been settled out of band and never
//! contributes to an outstanding balance.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{LedgerError, MoneyCents, users::UserId};

/// Category used when the caller doesn't provide one.
pub const DEFAULT_CATEGORY: &str = "Other";

/// How the expense amount was divided among participants.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitType {
    #[default]
    Equal,
    Exact,
    Percentage,
}

impl SplitType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            SplitType::Equal => "equal",
            SplitType::Exact => "exact",
            SplitType::Percentage => "percentage",
        }
    }
}

impl TryFrom<&str> for SplitType {
    type Error = LedgerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "equal" => Ok(SplitType::Equal),
            "exact" => Ok(SplitType::Exact),
            "percentage" => Ok(SplitType::Percentage),
            other => Err(LedgerError::Validation(format!(
                "unsupported split type: {other}"
            ))),
        }
    }
}

/// Portion of an expense attributed to one participant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Split {
    pub user_id: UserId,
    pub amount: MoneyCents,
    #[serde(default)]
    pub paid: bool,
}

impl Split {
    pub fn new(user_id: impl Into<UserId>, amount: MoneyCents) -> Self {
        Self {
            user_id: user_id.into(),
            amount,
            paid: false,
        }
    }

    #[must_use]
    pub fn paid(mut self, paid: bool) -> Self {
        self.paid = paid;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: Uuid,
    pub description: String,
    pub amount: MoneyCents,
    #[serde(default = "default_category")]
    pub category: String,
    pub date: DateTime<Utc>,
    pub payer_id: UserId,
    #[serde(default)]
    pub split_type: SplitType,
    pub splits: Vec<Split>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<Uuid>,
    pub created_by: UserId,
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

impl Expense {
    /// The split entry of `user_id`, if any.
    pub fn split_of(&self, user_id: &str) -> Option<&Split> {
        self.splits.iter().find(|split| split.user_id == user_id)
    }

    /// Amount `user_id` still owes on this expense (0 when settled or absent).
    pub fn unpaid_amount_of(&self, user_id: &str) -> MoneyCents {
        self.split_of(user_id)
            .filter(|split| !split.paid)
            .map_or(MoneyCents::ZERO, |split| split.amount)
    }

    /// `true` if the user paid the expense or has a split in it.
    pub fn involves(&self, user_id: &str) -> bool {
        self.payer_id == user_id || self.split_of(user_id).is_some()
    }

    /// `true` for one-to-one expenses (no group).
    pub fn is_pairwise(&self) -> bool {
        self.group_id.is_none()
    }

    pub fn belongs_to(&self, group_id: Uuid) -> bool {
        self.group_id == Some(group_id)
    }
}
