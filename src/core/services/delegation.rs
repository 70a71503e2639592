//! Leader access to the security settings of the members they lead.
//!
//! Reads need a membership of `member_id` in any group the caller leads.
//! Writes additionally need the member to have opted in through
//! `can_leader_manage_configs` on at least one of those memberships.

use super::NeosecService;
use crate::auth::session::Session;
use crate::constants::{MEMBER_FIREWALL_RULE_UPDATED, MEMBER_PROFILE_UPDATED, MEMBER_VPN_CONFIG_UPDATED};
use crate::core::errors::NeosecError;
use crate::core::models::{
    firewall::{FirewallRule, FirewallRuleUpdate},
    membership::Membership,
    profile::{Profile, ProfileUpdate},
    vpn::{VpnConfig, VpnConfigUpdate},
};
use crate::infrastructure::cache::Cache;
use crate::infrastructure::logging::LoggingService;
use crate::infrastructure::storage::Storage;
use serde_json::json;
use tracing::{info, warn};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Access {
    Read,
    Write,
}

impl<L: LoggingService, S: Storage, C: Cache> NeosecService<L, S, C> {
    pub async fn get_member_profiles(&self, session: &Session, member_id: &str) -> Result<Vec<Profile>, NeosecError> {
        self.delegated_memberships(session, member_id, Access::Read).await?;
        self.storage.get_profiles(member_id).await
    }

    pub async fn get_member_firewall_rules(
        &self,
        session: &Session,
        member_id: &str,
    ) -> Result<Vec<FirewallRule>, NeosecError> {
        self.delegated_memberships(session, member_id, Access::Read).await?;
        self.storage.get_firewall_rules(member_id).await
    }

    pub async fn get_member_vpn_configs(&self, session: &Session, member_id: &str) -> Result<Vec<VpnConfig>, NeosecError> {
        self.delegated_memberships(session, member_id, Access::Read).await?;
        self.storage.get_vpn_configs(member_id).await
    }

    pub async fn update_member_profile(
        &self,
        session: &Session,
        member_id: &str,
        profile_id: &str,
        update: ProfileUpdate,
    ) -> Result<Profile, NeosecError> {
        let memberships = self.delegated_memberships(session, member_id, Access::Write).await?;
        let profile = self.apply_profile_update(member_id, profile_id, &update).await?;
        self.audit_delegated_write(
            session,
            &memberships,
            MEMBER_PROFILE_UPDATED,
            json!({ "member_id": member_id, "profile_id": profile_id }),
        )
        .await?;
        Ok(profile)
    }

    pub async fn update_member_firewall_rule(
        &self,
        session: &Session,
        member_id: &str,
        rule_id: &str,
        update: FirewallRuleUpdate,
    ) -> Result<FirewallRule, NeosecError> {
        let memberships = self.delegated_memberships(session, member_id, Access::Write).await?;
        let rule = self.apply_firewall_update(member_id, rule_id, &update).await?;
        self.audit_delegated_write(
            session,
            &memberships,
            MEMBER_FIREWALL_RULE_UPDATED,
            json!({ "member_id": member_id, "rule_id": rule_id }),
        )
        .await?;
        Ok(rule)
    }

    pub async fn update_member_vpn_config(
        &self,
        session: &Session,
        member_id: &str,
        config_id: &str,
        update: VpnConfigUpdate,
    ) -> Result<VpnConfig, NeosecError> {
        let memberships = self.delegated_memberships(session, member_id, Access::Write).await?;
        let config = self.apply_vpn_update(member_id, config_id, &update).await?;
        self.audit_delegated_write(
            session,
            &memberships,
            MEMBER_VPN_CONFIG_UPDATED,
            json!({ "member_id": member_id, "config_id": config_id, "is_active": config.is_active }),
        )
        .await?;
        Ok(config)
    }

    /// Memberships through which the caller leads `member_id`, or
    /// `Forbidden` if there are none (or none grants write access).
    async fn delegated_memberships(
        &self,
        session: &Session,
        member_id: &str,
        access: Access,
    ) -> Result<Vec<Membership>, NeosecError> {
        self.require_leader(&session.user)?;
        let memberships = self.storage.get_memberships_led_by(session.user_id(), member_id).await?;
        if memberships.is_empty() {
            warn!(leader_id = %session.user_id(), member_id, "delegated access refused, not a member");
            return Err(NeosecError::forbidden("Member not found in your groups"));
        }
        if access == Access::Write && !memberships.iter().any(|m| m.can_leader_manage_configs) {
            warn!(leader_id = %session.user_id(), member_id, "delegated write refused, not permitted");
            return Err(NeosecError::forbidden(
                "Member has not allowed the leader to manage their configurations",
            ));
        }
        Ok(memberships)
    }

    /// Records the write against the first group that granted it.
    async fn audit_delegated_write(
        &self,
        session: &Session,
        memberships: &[Membership],
        action: &str,
        details: serde_json::Value,
    ) -> Result<(), NeosecError> {
        let group_id = memberships
            .iter()
            .find(|m| m.can_leader_manage_configs)
            .map(|m| m.group_id.as_str());
        self.log_and_audit(group_id, action, details, Some(session.user_id()))
            .await?;
        info!(leader_id = %session.user_id(), action, "delegated update applied");
        Ok(())
    }
}
