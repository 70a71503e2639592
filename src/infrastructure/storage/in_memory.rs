use crate::core::errors::NeosecError;
use crate::core::models::{
    audit::{GroupAudit, LoginRecord},
    firewall::FirewallRule,
    group::{Group, GroupChanges},
    invitation::{Invitation, InvitationStatus},
    membership::Membership,
    profile::Profile,
    subscription::Subscription,
    user::User,
    vpn::{VpnConfig, VpnConfigUpdate},
};
use crate::infrastructure::storage::{Storage, Validator};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::debug;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

// Lock order when several maps are held at once:
// users_by_email -> users, groups -> memberships -> invitations -> group_audits.
#[derive(Clone, Default)]
pub struct InMemoryStorage {
    users: Arc<RwLock<HashMap<String, User>>>,
    users_by_email: Arc<RwLock<HashMap<String, String>>>,
    subscriptions: Arc<RwLock<HashMap<String, Subscription>>>,
    groups: Arc<RwLock<HashMap<String, Group>>>,
    memberships: Arc<RwLock<HashMap<String, Membership>>>,
    invitations: Arc<RwLock<HashMap<String, Invitation>>>,
    vpn_configs: Arc<RwLock<HashMap<String, VpnConfig>>>,
    profiles: Arc<RwLock<HashMap<String, Profile>>>,
    firewall_rules: Arc<RwLock<HashMap<String, FirewallRule>>>,
    group_audits: Arc<RwLock<HashMap<String, Vec<GroupAudit>>>>,
    login_records: Arc<RwLock<Vec<LoginRecord>>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first<T, F>(mut items: Vec<T>, key: F) -> Vec<T>
where
    F: Fn(&T) -> DateTime<Utc>,
{
    items.sort_by_key(|item| std::cmp::Reverse(key(item)));
    items
}

fn active_groups_led_by(groups: &HashMap<String, Group>, leader_id: &str) -> usize {
    groups.values().filter(|g| g.leader_id == leader_id && g.is_active).count()
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn insert_user(&self, user: User) -> Result<User, NeosecError> {
        let mut users_by_email = self.users_by_email.write().await;
        if users_by_email.contains_key(&user.email) {
            return Err(NeosecError::EmailAlreadyRegistered(user.email));
        }
        let mut users = self.users.write().await;
        users_by_email.insert(user.email.clone(), user.id.clone());
        users.insert(user.id.clone(), user.clone());
        debug!("stored user {}", user.id);
        Ok(user)
    }

    async fn update_user(&self, user: User) -> Result<(), NeosecError> {
        let mut users = self.users.write().await;
        if !users.contains_key(&user.id) {
            return Err(NeosecError::UserNotFound(user.id));
        }
        users.insert(user.id.clone(), user);
        Ok(())
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<User>, NeosecError> {
        let users = self.users.read().await;
        Ok(users.get(user_id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, NeosecError> {
        let users_by_email = self.users_by_email.read().await;
        let users = self.users.read().await;
        Ok(users_by_email.get(email).and_then(|id| users.get(id).cloned()))
    }

    async fn count_users(&self) -> Result<usize, NeosecError> {
        Ok(self.users.read().await.len())
    }

    async fn save_subscription(&self, subscription: Subscription) -> Result<(), NeosecError> {
        let mut subscriptions = self.subscriptions.write().await;
        subscriptions.insert(subscription.user_id.clone(), subscription);
        Ok(())
    }

    async fn get_subscription(&self, user_id: &str) -> Result<Option<Subscription>, NeosecError> {
        let subscriptions = self.subscriptions.read().await;
        Ok(subscriptions.get(user_id).cloned())
    }

    async fn create_group(&self, group: Group, active_limit: Option<usize>) -> Result<Group, NeosecError> {
        let mut groups = self.groups.write().await;
        if let Some(limit) = active_limit {
            if active_groups_led_by(&groups, &group.leader_id) >= limit {
                return Err(NeosecError::GroupLimitReached(limit));
            }
        }
        groups.insert(group.id.clone(), group.clone());
        debug!("stored group {}", group.id);
        Ok(group)
    }

    async fn update_group(
        &self,
        group_id: &str,
        changes: GroupChanges,
        active_limit: Option<usize>,
        now: DateTime<Utc>,
    ) -> Result<Group, NeosecError> {
        let mut groups = self.groups.write().await;
        let memberships = self.memberships.read().await;
        let current = groups
            .get(group_id)
            .ok_or_else(|| NeosecError::GroupNotFound(group_id.to_string()))?;

        if let Some(max_members) = changes.max_members {
            let member_count = memberships.values().filter(|m| m.group_id == group_id).count();
            if max_members < member_count {
                return Err(NeosecError::invalid_input(
                    "maxMembers",
                    "Member limit too low",
                    format!("Group already has {} members", member_count),
                ));
            }
        }
        if let (Some(true), Some(limit)) = (changes.is_active, active_limit) {
            if !current.is_active && active_groups_led_by(&groups, &current.leader_id) >= limit {
                return Err(NeosecError::GroupLimitReached(limit));
            }
        }

        let group = groups
            .get_mut(group_id)
            .ok_or_else(|| NeosecError::GroupNotFound(group_id.to_string()))?;
        group.apply(&changes, now);
        Ok(group.clone())
    }

    async fn get_group(&self, group_id: &str) -> Result<Option<Group>, NeosecError> {
        let groups = self.groups.read().await;
        Ok(groups.get(group_id).cloned())
    }

    async fn get_groups_by_leader(&self, leader_id: &str) -> Result<Vec<Group>, NeosecError> {
        let groups = self.groups.read().await;
        let led = groups.values().filter(|g| g.leader_id == leader_id).cloned().collect();
        Ok(newest_first(led, |g: &Group| g.created_at))
    }

    async fn delete_group(&self, group_id: &str) -> Result<Option<Group>, NeosecError> {
        let mut groups = self.groups.write().await;
        let mut memberships = self.memberships.write().await;
        let mut invitations = self.invitations.write().await;
        let mut group_audits = self.group_audits.write().await;
        let removed = groups.remove(group_id);
        if removed.is_some() {
            memberships.retain(|_, m| m.group_id != group_id);
            invitations.retain(|_, i| i.group_id != group_id);
            group_audits.remove(group_id);
            debug!("deleted group {} with its memberships, invitations and audits", group_id);
        }
        Ok(removed)
    }

    async fn save_membership(&self, membership: Membership) -> Result<(), NeosecError> {
        let mut memberships = self.memberships.write().await;
        memberships.insert(membership.id.clone(), membership);
        Ok(())
    }

    async fn get_membership(&self, membership_id: &str) -> Result<Option<Membership>, NeosecError> {
        let memberships = self.memberships.read().await;
        Ok(memberships.get(membership_id).cloned())
    }

    async fn get_membership_for(&self, group_id: &str, user_id: &str) -> Result<Option<Membership>, NeosecError> {
        let memberships = self.memberships.read().await;
        Ok(memberships
            .values()
            .find(|m| m.group_id == group_id && m.user_id == user_id)
            .cloned())
    }

    async fn get_group_memberships(&self, group_id: &str) -> Result<Vec<Membership>, NeosecError> {
        let memberships = self.memberships.read().await;
        let mut members: Vec<Membership> = memberships.values().filter(|m| m.group_id == group_id).cloned().collect();
        members.sort_by_key(|m| m.joined_at);
        Ok(members)
    }

    async fn get_user_memberships(&self, user_id: &str) -> Result<Vec<Membership>, NeosecError> {
        let memberships = self.memberships.read().await;
        let mine = memberships.values().filter(|m| m.user_id == user_id).cloned().collect();
        Ok(newest_first(mine, |m: &Membership| m.joined_at))
    }

    async fn count_group_members(&self, group_id: &str) -> Result<usize, NeosecError> {
        let memberships = self.memberships.read().await;
        Ok(memberships.values().filter(|m| m.group_id == group_id).count())
    }

    async fn delete_membership(&self, membership_id: &str) -> Result<Option<Membership>, NeosecError> {
        let mut memberships = self.memberships.write().await;
        Ok(memberships.remove(membership_id))
    }

    async fn get_memberships_led_by(
        &self,
        leader_id: &str,
        member_id: &str,
    ) -> Result<Vec<Membership>, NeosecError> {
        let groups = self.groups.read().await;
        let memberships = self.memberships.read().await;
        Ok(memberships
            .values()
            .filter(|m| m.user_id == member_id)
            .filter(|m| groups.get(&m.group_id).is_some_and(|g| g.leader_id == leader_id))
            .cloned()
            .collect())
    }

    async fn save_invitation(&self, invitation: Invitation) -> Result<(), NeosecError> {
        let mut invitations = self.invitations.write().await;
        invitations.insert(invitation.id.clone(), invitation);
        Ok(())
    }

    async fn get_invitation(&self, invitation_id: &str) -> Result<Option<Invitation>, NeosecError> {
        let invitations = self.invitations.read().await;
        Ok(invitations.get(invitation_id).cloned())
    }

    async fn get_group_invitations(&self, group_id: &str) -> Result<Vec<Invitation>, NeosecError> {
        let invitations = self.invitations.read().await;
        let for_group = invitations.values().filter(|i| i.group_id == group_id).cloned().collect();
        Ok(newest_first(for_group, |i: &Invitation| i.created_at))
    }

    async fn get_pending_invitations_for(
        &self,
        user_id: &str,
        email: &str,
    ) -> Result<Vec<Invitation>, NeosecError> {
        let invitations = self.invitations.read().await;
        let pending = invitations
            .values()
            .filter(|i| i.status == InvitationStatus::Pending && i.is_addressed_to(user_id, email))
            .cloned()
            .collect();
        Ok(newest_first(pending, |i: &Invitation| i.created_at))
    }

    async fn accept_invitation(
        &self,
        invitation_id: &str,
        membership: Membership,
        now: DateTime<Utc>,
    ) -> Result<Membership, NeosecError> {
        let groups = self.groups.read().await;
        let mut memberships = self.memberships.write().await;
        let mut invitations = self.invitations.write().await;

        let invitation = invitations
            .get_mut(invitation_id)
            .ok_or_else(|| NeosecError::InvitationNotFound(invitation_id.to_string()))?;
        if invitation.status != InvitationStatus::Pending {
            return Err(NeosecError::InvitationAlreadyResolved(invitation_id.to_string()));
        }

        let group_id = &membership.group_id;
        let group = groups
            .get(group_id)
            .ok_or_else(|| NeosecError::GroupNotFound(group_id.clone()))?;
        if !group.is_active {
            return Err(NeosecError::GroupInactive(group_id.clone()));
        }
        if memberships
            .values()
            .any(|m| m.group_id == *group_id && m.user_id == membership.user_id)
        {
            return Err(NeosecError::AlreadyGroupMember(membership.user_id.clone()));
        }
        let member_count = memberships.values().filter(|m| m.group_id == *group_id).count();
        if !group.has_capacity(member_count) {
            return Err(NeosecError::GroupFull(group_id.clone()));
        }

        invitation.status = InvitationStatus::Accepted;
        invitation.invitee_id = Some(membership.user_id.clone());
        invitation.responded_at = Some(now);
        memberships.insert(membership.id.clone(), membership.clone());
        debug!(
            "invitation {} accepted, group {} now has {} members",
            invitation_id,
            group_id,
            member_count + 1
        );
        Ok(membership)
    }

    async fn save_vpn_config(&self, config: VpnConfig) -> Result<(), NeosecError> {
        let mut vpn_configs = self.vpn_configs.write().await;
        vpn_configs.insert(config.id.clone(), config);
        Ok(())
    }

    async fn get_vpn_config(&self, config_id: &str) -> Result<Option<VpnConfig>, NeosecError> {
        let vpn_configs = self.vpn_configs.read().await;
        Ok(vpn_configs.get(config_id).cloned())
    }

    async fn get_vpn_configs(&self, user_id: &str) -> Result<Vec<VpnConfig>, NeosecError> {
        let vpn_configs = self.vpn_configs.read().await;
        let mine = vpn_configs.values().filter(|c| c.user_id == user_id).cloned().collect();
        Ok(newest_first(mine, |c: &VpnConfig| c.created_at))
    }

    async fn delete_vpn_config(&self, config_id: &str) -> Result<Option<VpnConfig>, NeosecError> {
        let mut vpn_configs = self.vpn_configs.write().await;
        Ok(vpn_configs.remove(config_id))
    }

    async fn update_vpn_config(
        &self,
        owner_id: &str,
        config_id: &str,
        update: VpnConfigUpdate,
        validate: Validator<VpnConfig>,
        now: DateTime<Utc>,
    ) -> Result<VpnConfig, NeosecError> {
        let mut vpn_configs = self.vpn_configs.write().await;
        let mut config = vpn_configs
            .get(config_id)
            .filter(|c| c.user_id == owner_id)
            .cloned()
            .ok_or_else(|| NeosecError::VpnConfigNotFound(config_id.to_string()))?;
        config.apply(&update, now);
        validate(&config)?;
        if vpn_configs
            .values()
            .any(|c| c.user_id == owner_id && c.id != config_id && c.name == config.name)
        {
            return Err(NeosecError::VpnConfigNameTaken(config.name));
        }

        match update.is_active {
            Some(true) => {
                for other in vpn_configs
                    .values_mut()
                    .filter(|c| c.user_id == owner_id && c.id != config_id && c.is_active)
                {
                    other.is_active = false;
                    other.updated_at = now;
                }
                config.is_active = true;
            }
            Some(false) => config.is_active = false,
            None => {}
        }
        vpn_configs.insert(config.id.clone(), config.clone());
        Ok(config)
    }

    async fn activate_vpn_config(
        &self,
        user_id: &str,
        config_id: &str,
        now: DateTime<Utc>,
    ) -> Result<VpnConfig, NeosecError> {
        let mut vpn_configs = self.vpn_configs.write().await;
        if !vpn_configs
            .get(config_id)
            .is_some_and(|c| c.user_id == user_id)
        {
            return Err(NeosecError::VpnConfigNotFound(config_id.to_string()));
        }
        for config in vpn_configs.values_mut().filter(|c| c.user_id == user_id) {
            let should_be_active = config.id == config_id;
            if config.is_active != should_be_active {
                config.is_active = should_be_active;
                config.updated_at = now;
            }
        }
        vpn_configs
            .get(config_id)
            .cloned()
            .ok_or_else(|| NeosecError::VpnConfigNotFound(config_id.to_string()))
    }

    async fn save_profile(&self, profile: Profile) -> Result<(), NeosecError> {
        let mut profiles = self.profiles.write().await;
        profiles.insert(profile.id.clone(), profile);
        Ok(())
    }

    async fn get_profile(&self, profile_id: &str) -> Result<Option<Profile>, NeosecError> {
        let profiles = self.profiles.read().await;
        Ok(profiles.get(profile_id).cloned())
    }

    async fn get_profiles(&self, user_id: &str) -> Result<Vec<Profile>, NeosecError> {
        let profiles = self.profiles.read().await;
        let mine = profiles.values().filter(|p| p.user_id == user_id).cloned().collect();
        Ok(newest_first(mine, |p: &Profile| p.created_at))
    }

    async fn delete_profile(&self, profile_id: &str) -> Result<Option<Profile>, NeosecError> {
        let mut profiles = self.profiles.write().await;
        Ok(profiles.remove(profile_id))
    }

    async fn save_firewall_rule(&self, rule: FirewallRule) -> Result<(), NeosecError> {
        let mut firewall_rules = self.firewall_rules.write().await;
        firewall_rules.insert(rule.id.clone(), rule);
        Ok(())
    }

    async fn get_firewall_rule(&self, rule_id: &str) -> Result<Option<FirewallRule>, NeosecError> {
        let firewall_rules = self.firewall_rules.read().await;
        Ok(firewall_rules.get(rule_id).cloned())
    }

    async fn get_firewall_rules(&self, user_id: &str) -> Result<Vec<FirewallRule>, NeosecError> {
        let firewall_rules = self.firewall_rules.read().await;
        let mine = firewall_rules.values().filter(|r| r.user_id == user_id).cloned().collect();
        Ok(newest_first(mine, |r: &FirewallRule| r.created_at))
    }

    async fn delete_firewall_rule(&self, rule_id: &str) -> Result<Option<FirewallRule>, NeosecError> {
        let mut firewall_rules = self.firewall_rules.write().await;
        Ok(firewall_rules.remove(rule_id))
    }

    async fn save_group_audit(&self, audit: GroupAudit) -> Result<(), NeosecError> {
        let mut group_audits = self.group_audits.write().await;
        group_audits.entry(audit.group_id.clone()).or_default().push(audit);
        Ok(())
    }

    async fn get_group_audits(&self, group_id: &str) -> Result<Vec<GroupAudit>, NeosecError> {
        let group_audits = self.group_audits.read().await;
        Ok(group_audits.get(group_id).cloned().unwrap_or_default())
    }

    async fn save_login_record(&self, record: LoginRecord) -> Result<(), NeosecError> {
        let mut login_records = self.login_records.write().await;
        login_records.push(record);
        Ok(())
    }

    async fn get_login_records(&self, user_id: &str) -> Result<Vec<LoginRecord>, NeosecError> {
        let login_records = self.login_records.read().await;
        let mine = login_records
            .iter()
            .filter(|r| r.user_id.as_deref() == Some(user_id))
            .cloned()
            .collect();
        Ok(newest_first(mine, |r: &LoginRecord| r.timestamp))
    }

    async fn get_security_events(&self, since: DateTime<Utc>) -> Result<Vec<LoginRecord>, NeosecError> {
        let login_records = self.login_records.read().await;
        let events = login_records
            .iter()
            .filter(|r| r.timestamp >= since && r.is_security_event())
            .cloned()
            .collect();
        Ok(newest_first(events, |r: &LoginRecord| r.timestamp))
    }

    async fn count_failed_logins(
        &self,
        ip_address: Option<&str>,
        email: &str,
        since: DateTime<Utc>,
    ) -> Result<usize, NeosecError> {
        let login_records = self.login_records.read().await;
        Ok(login_records
            .iter()
            .filter(|r| !r.success && r.timestamp >= since)
            .filter(|r| match ip_address {
                Some(ip) => r.ip_address.as_deref() == Some(ip),
                None => r.email == email,
            })
            .count())
    }
}
