use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

use crate::{
    api::models::{
        CreateGroupRequest, ErrorResponse, InviteMemberRequest, LoginRequest, LoginResponse, MemberPermissionsRequest,
        MessageResponse, RegisterRequest, UpdateGroupRequest, UpdateProfileRequest, UpgradeRequest, UpgradeResponse,
    },
    core::models::{
        audit::{AppLog, GroupAudit, LoginRecord},
        firewall::{FirewallRule, FirewallRuleUpdate, NewFirewallRule, RuleAction, RuleDirection},
        group::{Group, GroupDetails, MembershipDetails},
        invitation::{Invitation, InvitationDetails, InvitationStatus},
        membership::{GroupMemberView, Membership},
        profile::{DefaultFirewallAction, NewProfile, Profile, ProfileType, ProfileUpdate},
        subscription::{Subscription, SubscriptionStatus},
        user::{AccountType, SubscriptionTier, User, UserRole, UserSummary},
        vpn::{NewVpnConfig, VpnConfig, VpnConfigUpdate, VpnProtocol},
    },
};

use super::handlers::{auth, hierarchy, security, vpn};

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "Bearer",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).bearer_format("JWT").build()),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::register,
        auth::login,
        auth::me,
        auth::update_profile,
        auth::get_app_logs,
        auth::get_login_history,
        auth::get_security_events,
        hierarchy::get_subscription,
        hierarchy::upgrade_subscription,
        hierarchy::cancel_subscription,
        hierarchy::create_group,
        hierarchy::get_my_groups,
        hierarchy::get_group,
        hierarchy::update_group,
        hierarchy::delete_group,
        hierarchy::invite_member,
        hierarchy::get_group_members,
        hierarchy::remove_member,
        hierarchy::update_member_permissions,
        hierarchy::get_group_audits,
        hierarchy::get_my_invitations,
        hierarchy::accept_invitation,
        hierarchy::reject_invitation,
        hierarchy::get_my_memberships,
        hierarchy::leave_group,
        hierarchy::get_member_profiles,
        hierarchy::update_member_profile,
        hierarchy::get_member_firewall_rules,
        hierarchy::update_member_firewall_rule,
        hierarchy::get_member_vpn_configs,
        hierarchy::update_member_vpn_config,
        vpn::list_vpn_configs,
        vpn::create_vpn_config,
        vpn::get_vpn_config,
        vpn::update_vpn_config,
        vpn::delete_vpn_config,
        vpn::toggle_vpn_config,
        vpn::clone_vpn_config,
        vpn::download_vpn_config,
        security::list_profiles,
        security::create_profile,
        security::update_profile,
        security::delete_profile,
        security::list_firewall_rules,
        security::create_firewall_rule,
        security::update_firewall_rule,
        security::delete_firewall_rule
    ),
    components(schemas(
        RegisterRequest,
        LoginRequest,
        LoginResponse,
        UpdateProfileRequest,
        UpgradeRequest,
        UpgradeResponse,
        CreateGroupRequest,
        UpdateGroupRequest,
        InviteMemberRequest,
        MemberPermissionsRequest,
        MessageResponse,
        ErrorResponse,
        User,
        UserSummary,
        UserRole,
        AccountType,
        SubscriptionTier,
        Subscription,
        SubscriptionStatus,
        Group,
        GroupDetails,
        MembershipDetails,
        Membership,
        GroupMemberView,
        Invitation,
        InvitationDetails,
        InvitationStatus,
        VpnConfig,
        NewVpnConfig,
        VpnConfigUpdate,
        VpnProtocol,
        Profile,
        NewProfile,
        ProfileUpdate,
        ProfileType,
        DefaultFirewallAction,
        FirewallRule,
        NewFirewallRule,
        FirewallRuleUpdate,
        RuleAction,
        RuleDirection,
        AppLog,
        GroupAudit,
        LoginRecord
    )),
    modifiers(&BearerAuth),
    info(
        title = "NeoSec API",
        description = "Accounts, group hierarchy and security configuration for NeoSec clients",
        version = "0.1.0"
    )
)]
pub struct ApiDoc;
