use super::NeosecService;
use crate::auth::session::Session;
use crate::constants::{
    FIREWALL_RULE_CREATED, FIREWALL_RULE_DELETED, FIREWALL_RULE_UPDATED, MAX_DESCRIPTION_LENGTH,
    MAX_PROFILE_NAME_LENGTH, MIN_PROFILE_NAME_LENGTH, SECURITY_PROFILE_CREATED, SECURITY_PROFILE_DELETED,
    SECURITY_PROFILE_UPDATED,
};
use crate::core::errors::NeosecError;
use crate::core::models::{
    firewall::{FirewallRule, FirewallRuleUpdate, NewFirewallRule},
    profile::{NewProfile, Profile, ProfileUpdate},
};
use crate::core::validation::{validate_ip_address, validate_optional_text, validate_port, validate_string_input};
use crate::infrastructure::cache::Cache;
use crate::infrastructure::logging::LoggingService;
use crate::infrastructure::storage::Storage;
use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

fn validate_profile(profile: &Profile) -> Result<(), NeosecError> {
    validate_string_input("name", &profile.name, MAX_PROFILE_NAME_LENGTH)?;
    if profile.name.chars().count() < MIN_PROFILE_NAME_LENGTH {
        return Err(NeosecError::invalid_input(
            "name",
            "name Too Short",
            format!("name must be at least {} characters", MIN_PROFILE_NAME_LENGTH),
        ));
    }
    validate_optional_text("description", profile.description.as_deref(), MAX_DESCRIPTION_LENGTH)
}

fn validate_firewall_rule(rule: &FirewallRule) -> Result<(), NeosecError> {
    if let Some(ip) = &rule.ip_address {
        validate_ip_address(ip)?;
    }
    if let Some(port) = rule.port {
        validate_port(port)?;
    }
    validate_optional_text("description", rule.description.as_deref(), MAX_DESCRIPTION_LENGTH)
}

impl<L: LoggingService, S: Storage, C: Cache> NeosecService<L, S, C> {
    pub async fn list_profiles(&self, session: &Session) -> Result<Vec<Profile>, NeosecError> {
        self.storage.get_profiles(session.user_id()).await
    }

    pub async fn create_profile(&self, session: &Session, new_profile: NewProfile) -> Result<Profile, NeosecError> {
        let now = Utc::now();
        let profile = Profile {
            id: Uuid::new_v4().to_string(),
            user_id: session.user_id().to_string(),
            name: new_profile.name.trim().to_string(),
            description: new_profile.description,
            profile_type: new_profile.profile_type,
            vpn_enabled: new_profile.vpn_enabled,
            vpn_protocol: new_profile.vpn_protocol,
            firewall_enabled: new_profile.firewall_enabled,
            default_firewall_action: new_profile.default_firewall_action,
            is_active: false,
            created_at: now,
            updated_at: now,
        };
        validate_profile(&profile)?;
        self.storage.save_profile(profile.clone()).await?;

        self.log_and_audit(
            None,
            SECURITY_PROFILE_CREATED,
            json!({ "profile_id": profile.id, "name": profile.name }),
            Some(session.user_id()),
        )
        .await?;
        Ok(profile)
    }

    pub async fn update_profile_settings(
        &self,
        session: &Session,
        profile_id: &str,
        update: ProfileUpdate,
    ) -> Result<Profile, NeosecError> {
        let profile = self.apply_profile_update(session.user_id(), profile_id, &update).await?;
        self.log_and_audit(
            None,
            SECURITY_PROFILE_UPDATED,
            json!({ "profile_id": profile_id }),
            Some(session.user_id()),
        )
        .await?;
        Ok(profile)
    }

    pub async fn delete_profile(&self, session: &Session, profile_id: &str) -> Result<(), NeosecError> {
        self.owned_profile(session.user_id(), profile_id).await?;
        self.storage.delete_profile(profile_id).await?;
        self.log_and_audit(
            None,
            SECURITY_PROFILE_DELETED,
            json!({ "profile_id": profile_id }),
            Some(session.user_id()),
        )
        .await?;
        Ok(())
    }

    pub async fn list_firewall_rules(&self, session: &Session) -> Result<Vec<FirewallRule>, NeosecError> {
        self.storage.get_firewall_rules(session.user_id()).await
    }

    pub async fn create_firewall_rule(
        &self,
        session: &Session,
        new_rule: NewFirewallRule,
    ) -> Result<FirewallRule, NeosecError> {
        let now = Utc::now();
        let rule = FirewallRule {
            id: Uuid::new_v4().to_string(),
            user_id: session.user_id().to_string(),
            action: new_rule.action,
            direction: new_rule.direction,
            ip_address: new_rule.ip_address.map(|ip| ip.trim().to_string()),
            port: new_rule.port,
            description: new_rule.description,
            created_at: now,
            updated_at: now,
        };
        validate_firewall_rule(&rule)?;
        self.storage.save_firewall_rule(rule.clone()).await?;

        self.log_and_audit(None, FIREWALL_RULE_CREATED, json!({ "rule_id": rule.id }), Some(session.user_id()))
            .await?;
        Ok(rule)
    }

    pub async fn update_firewall_rule(
        &self,
        session: &Session,
        rule_id: &str,
        update: FirewallRuleUpdate,
    ) -> Result<FirewallRule, NeosecError> {
        let rule = self.apply_firewall_update(session.user_id(), rule_id, &update).await?;
        self.log_and_audit(None, FIREWALL_RULE_UPDATED, json!({ "rule_id": rule_id }), Some(session.user_id()))
            .await?;
        Ok(rule)
    }

    pub async fn delete_firewall_rule(&self, session: &Session, rule_id: &str) -> Result<(), NeosecError> {
        self.owned_firewall_rule(session.user_id(), rule_id).await?;
        self.storage.delete_firewall_rule(rule_id).await?;
        self.log_and_audit(None, FIREWALL_RULE_DELETED, json!({ "rule_id": rule_id }), Some(session.user_id()))
            .await?;
        Ok(())
    }

    pub(super) async fn owned_profile(&self, owner_id: &str, profile_id: &str) -> Result<Profile, NeosecError> {
        self.storage
            .get_profile(profile_id)
            .await?
            .filter(|p| p.user_id == owner_id)
            .ok_or_else(|| NeosecError::ProfileNotFound(profile_id.to_string()))
    }

    pub(super) async fn owned_firewall_rule(&self, owner_id: &str, rule_id: &str) -> Result<FirewallRule, NeosecError> {
        self.storage
            .get_firewall_rule(rule_id)
            .await?
            .filter(|r| r.user_id == owner_id)
            .ok_or_else(|| NeosecError::FirewallRuleNotFound(rule_id.to_string()))
    }

    pub(super) async fn apply_profile_update(
        &self,
        owner_id: &str,
        profile_id: &str,
        update: &ProfileUpdate,
    ) -> Result<Profile, NeosecError> {
        let mut profile = self.owned_profile(owner_id, profile_id).await?;
        profile.apply(update, Utc::now());
        validate_profile(&profile)?;
        self.storage.save_profile(profile.clone()).await?;
        Ok(profile)
    }

    pub(super) async fn apply_firewall_update(
        &self,
        owner_id: &str,
        rule_id: &str,
        update: &FirewallRuleUpdate,
    ) -> Result<FirewallRule, NeosecError> {
        let mut rule = self.owned_firewall_rule(owner_id, rule_id).await?;
        rule.apply(update, Utc::now());
        validate_firewall_rule(&rule)?;
        self.storage.save_firewall_rule(rule.clone()).await?;
        Ok(rule)
    }
}
