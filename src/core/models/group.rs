use super::membership::{GroupMemberView, Membership};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub leader_id: String,
    pub max_members: usize,
    pub is_active: bool,
    #[schema(value_type = String, example = "2024-06-01T12:34:56Z")]
    pub created_at: DateTime<Utc>,
    #[schema(value_type = String, example = "2024-06-01T12:34:56Z")]
    pub updated_at: DateTime<Utc>,
}

impl Group {
    pub fn is_led_by(&self, user_id: &str) -> bool {
        self.leader_id == user_id
    }

    pub fn has_capacity(&self, member_count: usize) -> bool {
        member_count < self.max_members
    }

    /// Applies already validated changes. Limits that depend on other
    /// records are checked by storage.
    pub fn apply(&mut self, changes: &GroupChanges, now: DateTime<Utc>) {
        if let Some(name) = &changes.name {
            self.name = name.trim().to_string();
        }
        if let Some(description) = &changes.description {
            self.description = Some(description.clone());
        }
        if let Some(max_members) = changes.max_members {
            self.max_members = max_members;
        }
        if let Some(is_active) = changes.is_active {
            self.is_active = is_active;
        }
        self.updated_at = now;
    }
}

/// Partial group update; absent fields keep their current value.
#[derive(Debug, Clone, Default)]
pub struct GroupChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub max_members: Option<usize>,
    pub is_active: Option<bool>,
}

/// A group together with its current members.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GroupDetails {
    pub group: Group,
    pub member_count: usize,
    pub members: Vec<GroupMemberView>,
}

/// A membership seen from the member's side.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MembershipDetails {
    pub membership: Membership,
    pub group: Group,
    pub member_count: usize,
}
