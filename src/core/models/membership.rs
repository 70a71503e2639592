use super::user::UserSummary;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const MEMBER_ROLE_LABEL: &str = "member";

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    pub id: String,
    pub group_id: String,
    pub user_id: String,
    /// Display label only; authority comes from group ownership.
    pub role: String,
    pub invited_by: String,
    #[schema(value_type = String, example = "2024-06-01T12:34:56Z")]
    pub joined_at: DateTime<Utc>,
    pub can_leader_manage_configs: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GroupMemberView {
    pub membership: Membership,
    pub user: UserSummary,
}
