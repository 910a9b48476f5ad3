//! Settlements: recorded repayments between two users.
//!
//! A settlement without `group_id` settles the one-to-one balance of the pair,
//! otherwise it settles their balance inside that group.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{MoneyCents, users::UserId};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settlement {
    pub id: Uuid,
    pub amount: MoneyCents,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub date: DateTime<Utc>,
    pub payer_id: UserId,
    pub receiver_id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related_expense_ids: Vec<Uuid>,
    pub created_by: UserId,
}

impl Settlement {
    /// `true` if the settlement is between `a` and `b`, in either direction.
    pub fn is_between(&self, a: &str, b: &str) -> bool {
        (self.payer_id == a && self.receiver_id == b)
            || (self.payer_id == b && self.receiver_id == a)
    }

    pub fn involves(&self, user_id: &str) -> bool {
        self.payer_id == user_id || self.receiver_id == user_id
    }

    /// The other side of the settlement, seen from `user_id`.
    pub fn counterpart_of(&self, user_id: &str) -> Option<&str> {
        if self.payer_id == user_id {
            Some(self.receiver_id.as_str())
        } else if self.receiver_id == user_id {
            Some(self.payer_id.as_str())
        } else {
            None
        }
    }

    pub fn is_pairwise(&self) -> bool {
        self.group_id.is_none()
    }

    pub fn belongs_to(&self, group_id: Uuid) -> bool {
        self.group_id == Some(group_id)
    }
}
