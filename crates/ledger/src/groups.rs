//! Groups and their members.
//!
//! Membership is fixed when the group is created: the creator is the `admin`,
//! everyone else joins as `member`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{LedgerError, ResultLedger, users::UserId};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupRole {
    Admin,
    #[default]
    Member,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupMember {
    pub user_id: UserId,
    #[serde(default)]
    pub role: GroupRole,
    pub joined_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub created_by: UserId,
    pub members: Vec<GroupMember>,
}

impl Group {
    pub fn is_member(&self, user_id: &str) -> bool {
        self.members.iter().any(|m| m.user_id == user_id)
    }

    /// Member ids in the order they were stored.
    pub fn member_ids(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(|m| m.user_id.as_str())
    }

    /// Fails with [`LedgerError::Authorization`] unless `user_id` is a member.
    pub fn require_member(&self, user_id: &str) -> ResultLedger<()> {
        if !self.is_member(user_id) {
            return Err(LedgerError::Authorization(format!(
                "{user_id} is not a member of group {}",
                self.name
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_member_rejects_outsiders() {
        let group = Group {
            id: Uuid::new_v4(),
            name: "Trip".to_string(),
            description: String::new(),
            created_by: "alice".to_string(),
            members: vec![GroupMember {
                user_id: "alice".to_string(),
                role: GroupRole::Admin,
                joined_at: Utc::now(),
            }],
        };

        assert!(group.require_member("alice").is_ok());
        assert_eq!(
            group.require_member("mallory"),
            Err(LedgerError::Authorization(
                "mallory is not a member of group Trip".to_string()
            ))
        );
    }
}
