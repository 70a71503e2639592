mod accounts;
mod delegation;
mod groups;
mod invitations;
mod memberships;
mod security;
mod subscriptions;
mod vpn;

pub use accounts::{LoginContext, LoginResult, ProfileChanges, Registration};
pub use crate::core::models::group::GroupChanges;
pub use groups::NewGroup;
pub use vpn::VpnDownload;

use crate::auth::jwt::{Claims, JwtService};
use crate::auth::session::Session;
use crate::core::errors::NeosecError;
use crate::core::models::{
    audit::GroupAudit,
    group::{Group, GroupDetails},
    membership::{GroupMemberView, Membership},
    user::User,
};
use crate::infrastructure::cache::Cache;
use crate::infrastructure::logging::LoggingService;
use crate::infrastructure::storage::Storage;
use chrono::Utc;
use uuid::Uuid;

const DEFAULT_MEMBER_CACHE_TTL: std::time::Duration = std::time::Duration::from_secs(60);

pub struct NeosecService<L: LoggingService, S: Storage, C: Cache> {
    storage: S,
    logging: L,
    cache: C,
    jwt_service: JwtService,
    password_cost: u32,
    member_cache_ttl: std::time::Duration,
}

impl<L: LoggingService, S: Storage, C: Cache> NeosecService<L, S, C> {
    pub fn new(storage: S, logging: L, cache: C, jwt_service: JwtService) -> Self {
        NeosecService {
            storage,
            logging,
            cache,
            jwt_service,
            password_cost: bcrypt::DEFAULT_COST,
            member_cache_ttl: DEFAULT_MEMBER_CACHE_TTL,
        }
    }

    pub fn with_password_cost(mut self, cost: u32) -> Self {
        self.password_cost = cost;
        self
    }

    pub fn with_member_cache_ttl(mut self, ttl: std::time::Duration) -> Self {
        self.member_cache_ttl = ttl;
        self
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, NeosecError> {
        self.jwt_service.validate_token(token)
    }

    /// Turns validated claims into a session for a user that still exists.
    pub async fn resolve_session(&self, claims: &Claims) -> Result<Session, NeosecError> {
        let user = self
            .storage
            .get_user(&claims.sub)
            .await?
            .ok_or_else(|| NeosecError::Unauthorized("User not found".to_string()))?;
        Ok(Session::new(user))
    }

    async fn log_and_audit(
        &self,
        group_id: Option<&str>,
        action: &str,
        log_details: serde_json::Value,
        user_id: Option<&str>,
    ) -> Result<(), NeosecError> {
        self.logging.log_action(action, log_details.clone(), user_id).await?;
        if let Some(gid) = group_id {
            self.storage
                .save_group_audit(GroupAudit {
                    id: Uuid::new_v4().to_string(),
                    group_id: gid.to_string(),
                    action: action.to_string(),
                    user_id: user_id.map(String::from),
                    details: serde_json::from_value(log_details).map_err(|e| {
                        NeosecError::StorageError(format!("Failed to serialize audit details: {}", e))
                    })?,
                    timestamp: Utc::now(),
                })
                .await?;
        }
        Ok(())
    }

    fn require_leader(&self, user: &User) -> Result<(), NeosecError> {
        if user.is_leader() {
            Ok(())
        } else {
            Err(NeosecError::forbidden(
                "Leader privileges required. Please upgrade your account.",
            ))
        }
    }

    async fn load_group(&self, group_id: &str) -> Result<Group, NeosecError> {
        self.storage
            .get_group(group_id)
            .await?
            .ok_or_else(|| NeosecError::GroupNotFound(group_id.to_string()))
    }

    /// Group the caller may administer: a leader account that owns it, or an
    /// admin.
    async fn validate_group_and_leader(&self, group_id: &str, user: &User) -> Result<Group, NeosecError> {
        self.require_leader(user)?;
        let group = self.load_group(group_id).await?;
        if !group.is_led_by(&user.id) && !user.is_admin() {
            return Err(NeosecError::forbidden(format!(
                "User {} is not the leader of group {}",
                user.id, group_id
            )));
        }
        Ok(group)
    }

    async fn member_views(&self, memberships: Vec<Membership>) -> Result<Vec<GroupMemberView>, NeosecError> {
        let lookups = memberships.into_iter().map(|membership| async move {
            let user = self
                .storage
                .get_user(&membership.user_id)
                .await?
                .ok_or_else(|| NeosecError::UserNotFound(membership.user_id.clone()))?;
            Ok::<_, NeosecError>(GroupMemberView {
                user: user.summary(),
                membership,
            })
        });
        futures::future::try_join_all(lookups).await
    }

    /// Member list of a group, served from the cache while fresh.
    async fn cached_group_members(&self, group_id: &str) -> Result<Vec<GroupMemberView>, NeosecError> {
        if let Some(members) = self.cache.get_group_members(group_id).await? {
            return Ok(members);
        }
        let memberships = self.storage.get_group_memberships(group_id).await?;
        let members = self.member_views(memberships).await?;
        self.cache
            .save_group_members(group_id, &members, self.member_cache_ttl)
            .await?;
        Ok(members)
    }

    async fn group_details(&self, group: Group) -> Result<GroupDetails, NeosecError> {
        let members = self.cached_group_members(&group.id).await?;
        Ok(GroupDetails {
            member_count: members.len(),
            members,
            group,
        })
    }
}
