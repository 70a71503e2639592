use super::NeosecService;
use crate::auth::session::Session;
use crate::constants::{
    DEFAULT_MAX_MEMBERS, GROUP_CREATED, GROUP_DELETED, GROUP_UPDATED, MAX_DESCRIPTION_LENGTH, MAX_GROUP_MEMBERS,
    MAX_NAME_LENGTH, MEMBER_PERMISSIONS_UPDATED, MEMBER_REMOVED,
};
use crate::core::errors::NeosecError;
use crate::core::models::{
    audit::GroupAudit,
    group::{Group, GroupChanges, GroupDetails},
    membership::{GroupMemberView, Membership},
    user::User,
};
use crate::core::validation::{validate_optional_text, validate_string_input};
use crate::infrastructure::cache::Cache;
use crate::infrastructure::logging::LoggingService;
use crate::infrastructure::storage::Storage;
use chrono::Utc;
use futures::future::try_join_all;
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct NewGroup {
    pub name: String,
    pub description: Option<String>,
    pub max_members: Option<usize>,
}

fn validate_max_members(max_members: usize) -> Result<(), NeosecError> {
    if !(1..=MAX_GROUP_MEMBERS).contains(&max_members) {
        return Err(NeosecError::invalid_input(
            "maxMembers",
            "Invalid member limit",
            format!("maxMembers must be between 1 and {}", MAX_GROUP_MEMBERS),
        ));
    }
    Ok(())
}

/// How many active groups `user` may lead; admins are unlimited.
fn active_group_limit(user: &User) -> Option<usize> {
    (!user.is_admin()).then(|| user.subscription_tier.max_groups())
}

fn warn_on_limit(error: &NeosecError, user: &User) {
    if let NeosecError::GroupLimitReached(limit) = error {
        warn!(user_id = %user.id, limit, "group limit reached");
    }
}

impl<L: LoggingService, S: Storage, C: Cache> NeosecService<L, S, C> {
    pub async fn create_group(&self, session: &Session, new_group: NewGroup) -> Result<Group, NeosecError> {
        let leader = &session.user;
        self.require_leader(leader)?;

        validate_string_input("name", &new_group.name, MAX_NAME_LENGTH)?;
        validate_optional_text("description", new_group.description.as_deref(), MAX_DESCRIPTION_LENGTH)?;
        let max_members = new_group.max_members.unwrap_or(DEFAULT_MAX_MEMBERS);
        validate_max_members(max_members)?;

        let now = Utc::now();
        let group = Group {
            id: Uuid::new_v4().to_string(),
            name: new_group.name.trim().to_string(),
            description: new_group.description,
            leader_id: leader.id.clone(),
            max_members,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        let group = self
            .storage
            .create_group(group, active_group_limit(leader))
            .await
            .inspect_err(|e| warn_on_limit(e, leader))?;

        self.log_and_audit(
            Some(&group.id),
            GROUP_CREATED,
            json!({ "group_id": group.id, "name": group.name, "max_members": max_members }),
            Some(leader.id.as_str()),
        )
        .await?;
        info!(group_id = %group.id, leader_id = %leader.id, "group created");
        Ok(group)
    }

    /// Groups led by the caller, newest first.
    pub async fn get_my_groups(&self, session: &Session) -> Result<Vec<GroupDetails>, NeosecError> {
        let groups = self.storage.get_groups_by_leader(session.user_id()).await?;
        try_join_all(groups.into_iter().map(|group| self.group_details(group))).await
    }

    /// Visible to the group's leader, its members and admins.
    pub async fn get_group_details(&self, session: &Session, group_id: &str) -> Result<GroupDetails, NeosecError> {
        let group = self.load_group(group_id).await?;
        let user = &session.user;
        if !group.is_led_by(&user.id)
            && !user.is_admin()
            && self.storage.get_membership_for(group_id, &user.id).await?.is_none()
        {
            return Err(NeosecError::forbidden(format!(
                "User {} has no access to group {}",
                user.id, group_id
            )));
        }
        self.group_details(group).await
    }

    pub async fn update_group(
        &self,
        session: &Session,
        group_id: &str,
        changes: GroupChanges,
    ) -> Result<Group, NeosecError> {
        self.validate_group_and_leader(group_id, &session.user).await?;

        if let Some(name) = &changes.name {
            validate_string_input("name", name, MAX_NAME_LENGTH)?;
        }
        validate_optional_text("description", changes.description.as_deref(), MAX_DESCRIPTION_LENGTH)?;
        if let Some(max_members) = changes.max_members {
            validate_max_members(max_members)?;
        }

        let group = self
            .storage
            .update_group(group_id, changes, active_group_limit(&session.user), Utc::now())
            .await
            .inspect_err(|e| warn_on_limit(e, &session.user))?;

        self.log_and_audit(
            Some(group_id),
            GROUP_UPDATED,
            json!({ "group_id": group_id, "max_members": group.max_members, "is_active": group.is_active }),
            Some(session.user_id()),
        )
        .await?;
        Ok(group)
    }

    /// Deletes the group together with its memberships, invitations and audits.
    pub async fn delete_group(&self, session: &Session, group_id: &str) -> Result<(), NeosecError> {
        self.validate_group_and_leader(group_id, &session.user).await?;
        self.storage
            .delete_group(group_id)
            .await?
            .ok_or_else(|| NeosecError::GroupNotFound(group_id.to_string()))?;
        self.cache.invalidate_group_members(group_id).await?;

        // The group's audit trail goes with it; the activity log keeps the record.
        self.logging
            .log_action(GROUP_DELETED, json!({ "group_id": group_id }), Some(session.user_id()))
            .await?;
        info!(group_id, "group deleted");
        Ok(())
    }

    pub async fn get_group_members(
        &self,
        session: &Session,
        group_id: &str,
    ) -> Result<Vec<GroupMemberView>, NeosecError> {
        self.validate_group_and_leader(group_id, &session.user).await?;
        self.cached_group_members(group_id).await
    }

    pub async fn remove_member(&self, session: &Session, group_id: &str, member_id: &str) -> Result<(), NeosecError> {
        self.validate_group_and_leader(group_id, &session.user).await?;
        let membership = self.membership_in(group_id, member_id).await?;
        self.storage.delete_membership(&membership.id).await?;
        self.cache.invalidate_group_members(group_id).await?;

        self.log_and_audit(
            Some(group_id),
            MEMBER_REMOVED,
            json!({ "group_id": group_id, "member_id": member_id }),
            Some(session.user_id()),
        )
        .await?;
        info!(group_id, member_id, "member removed");
        Ok(())
    }

    /// Sets whether the leader may change this member's security settings.
    pub async fn update_member_permissions(
        &self,
        session: &Session,
        group_id: &str,
        member_id: &str,
        can_leader_manage_configs: bool,
    ) -> Result<Membership, NeosecError> {
        self.validate_group_and_leader(group_id, &session.user).await?;
        let mut membership = self.membership_in(group_id, member_id).await?;
        membership.can_leader_manage_configs = can_leader_manage_configs;
        self.storage.save_membership(membership.clone()).await?;
        self.cache.invalidate_group_members(group_id).await?;

        self.log_and_audit(
            Some(group_id),
            MEMBER_PERMISSIONS_UPDATED,
            json!({
                "group_id": group_id,
                "member_id": member_id,
                "can_leader_manage_configs": can_leader_manage_configs,
            }),
            Some(session.user_id()),
        )
        .await?;
        Ok(membership)
    }

    pub async fn get_group_audits(&self, session: &Session, group_id: &str) -> Result<Vec<GroupAudit>, NeosecError> {
        let group = self.load_group(group_id).await?;
        if !group.is_led_by(session.user_id()) && !session.user.is_admin() {
            return Err(NeosecError::forbidden(format!(
                "User {} is not the leader of group {}",
                session.user_id(),
                group_id
            )));
        }
        self.storage.get_group_audits(group_id).await
    }

    async fn membership_in(&self, group_id: &str, member_id: &str) -> Result<Membership, NeosecError> {
        self.storage
            .get_membership_for(group_id, member_id)
            .await?
            .ok_or_else(|| NeosecError::NotGroupMember(member_id.to_string()))
    }
}
