use crate::core::errors::NeosecError;
use crate::core::models::{
    audit::{GroupAudit, LoginRecord},
    firewall::FirewallRule,
    group::{Group, GroupChanges},
    invitation::Invitation,
    membership::Membership,
    profile::Profile,
    subscription::Subscription,
    user::User,
    vpn::{VpnConfig, VpnConfigUpdate},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Checks a merged record before storage commits it.
pub type Validator<T> = fn(&T) -> Result<(), NeosecError>;

/// Persistence seam. Methods that guard an invariant spanning several
/// records (`create_group`, `update_group`, `delete_group`,
/// `accept_invitation`, `update_vpn_config`, `activate_vpn_config`) must
/// apply all their checks and writes as one atomic step.
#[async_trait]
pub trait Storage: Send + Sync {
    // Users
    async fn insert_user(&self, user: User) -> Result<User, NeosecError>;
    async fn update_user(&self, user: User) -> Result<(), NeosecError>;
    async fn get_user(&self, user_id: &str) -> Result<Option<User>, NeosecError>;
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, NeosecError>;
    async fn count_users(&self) -> Result<usize, NeosecError>;

    // Subscriptions
    async fn save_subscription(&self, subscription: Subscription) -> Result<(), NeosecError>;
    async fn get_subscription(&self, user_id: &str) -> Result<Option<Subscription>, NeosecError>;

    // Groups
    /// Inserts `group` unless its leader already has `active_limit` active
    /// groups. `None` means unlimited.
    async fn create_group(&self, group: Group, active_limit: Option<usize>) -> Result<Group, NeosecError>;
    /// Applies `changes`. `max_members` may not drop below the current
    /// member count, and reactivating a group counts against `active_limit`.
    async fn update_group(
        &self,
        group_id: &str,
        changes: GroupChanges,
        active_limit: Option<usize>,
        now: DateTime<Utc>,
    ) -> Result<Group, NeosecError>;
    async fn get_group(&self, group_id: &str) -> Result<Option<Group>, NeosecError>;
    async fn get_groups_by_leader(&self, leader_id: &str) -> Result<Vec<Group>, NeosecError>;
    /// Removes the group along with its memberships, invitations and audits.
    async fn delete_group(&self, group_id: &str) -> Result<Option<Group>, NeosecError>;

    // Memberships
    async fn save_membership(&self, membership: Membership) -> Result<(), NeosecError>;
    async fn get_membership(&self, membership_id: &str) -> Result<Option<Membership>, NeosecError>;
    async fn get_membership_for(&self, group_id: &str, user_id: &str) -> Result<Option<Membership>, NeosecError>;
    async fn get_group_memberships(&self, group_id: &str) -> Result<Vec<Membership>, NeosecError>;
    async fn get_user_memberships(&self, user_id: &str) -> Result<Vec<Membership>, NeosecError>;
    async fn count_group_members(&self, group_id: &str) -> Result<usize, NeosecError>;
    async fn delete_membership(&self, membership_id: &str) -> Result<Option<Membership>, NeosecError>;
    /// Memberships of `member_id` in groups whose leader is `leader_id`.
    async fn get_memberships_led_by(&self, leader_id: &str, member_id: &str)
    -> Result<Vec<Membership>, NeosecError>;

    // Invitations
    async fn save_invitation(&self, invitation: Invitation) -> Result<(), NeosecError>;
    async fn get_invitation(&self, invitation_id: &str) -> Result<Option<Invitation>, NeosecError>;
    async fn get_group_invitations(&self, group_id: &str) -> Result<Vec<Invitation>, NeosecError>;
    /// Stored-pending invitations addressed to the given user id or email.
    async fn get_pending_invitations_for(&self, user_id: &str, email: &str)
    -> Result<Vec<Invitation>, NeosecError>;
    /// Flags the invitation accepted and inserts `membership`, provided the
    /// invitation is still pending, the group is active, the user is not yet
    /// a member and the group is below its current `max_members`.
    async fn accept_invitation(
        &self,
        invitation_id: &str,
        membership: Membership,
        now: DateTime<Utc>,
    ) -> Result<Membership, NeosecError>;

    // VPN configs
    async fn save_vpn_config(&self, config: VpnConfig) -> Result<(), NeosecError>;
    async fn get_vpn_config(&self, config_id: &str) -> Result<Option<VpnConfig>, NeosecError>;
    async fn get_vpn_configs(&self, user_id: &str) -> Result<Vec<VpnConfig>, NeosecError>;
    async fn delete_vpn_config(&self, config_id: &str) -> Result<Option<VpnConfig>, NeosecError>;
    /// Applies `update` to the stored config of `owner_id`. The merged record
    /// must pass `validate` and keep its name unique for the owner. Setting
    /// `is_active` to true deactivates every other config of the owner.
    async fn update_vpn_config(
        &self,
        owner_id: &str,
        config_id: &str,
        update: VpnConfigUpdate,
        validate: Validator<VpnConfig>,
        now: DateTime<Utc>,
    ) -> Result<VpnConfig, NeosecError>;
    /// Marks one config active and every other config of the same user
    /// inactive.
    async fn activate_vpn_config(
        &self,
        user_id: &str,
        config_id: &str,
        now: DateTime<Utc>,
    ) -> Result<VpnConfig, NeosecError>;

    // Security profiles
    async fn save_profile(&self, profile: Profile) -> Result<(), NeosecError>;
    async fn get_profile(&self, profile_id: &str) -> Result<Option<Profile>, NeosecError>;
    async fn get_profiles(&self, user_id: &str) -> Result<Vec<Profile>, NeosecError>;
    async fn delete_profile(&self, profile_id: &str) -> Result<Option<Profile>, NeosecError>;

    // Firewall rules
    async fn save_firewall_rule(&self, rule: FirewallRule) -> Result<(), NeosecError>;
    async fn get_firewall_rule(&self, rule_id: &str) -> Result<Option<FirewallRule>, NeosecError>;
    async fn get_firewall_rules(&self, user_id: &str) -> Result<Vec<FirewallRule>, NeosecError>;
    async fn delete_firewall_rule(&self, rule_id: &str) -> Result<Option<FirewallRule>, NeosecError>;

    // Group audits
    async fn save_group_audit(&self, audit: GroupAudit) -> Result<(), NeosecError>;
    async fn get_group_audits(&self, group_id: &str) -> Result<Vec<GroupAudit>, NeosecError>;

    // Login history
    async fn save_login_record(&self, record: LoginRecord) -> Result<(), NeosecError>;
    /// Records of one user, newest first.
    async fn get_login_records(&self, user_id: &str) -> Result<Vec<LoginRecord>, NeosecError>;
    /// Failed or suspicious records of every user since `since`, newest first.
    async fn get_security_events(&self, since: DateTime<Utc>) -> Result<Vec<LoginRecord>, NeosecError>;
    /// Failed attempts since `since` from `ip_address` when known, otherwise
    /// for `email`.
    async fn count_failed_logins(
        &self,
        ip_address: Option<&str>,
        email: &str,
        since: DateTime<Utc>,
    ) -> Result<usize, NeosecError>;
}

pub mod in_memory;
