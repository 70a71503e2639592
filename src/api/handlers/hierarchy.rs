//! Subscription, groups, invitations, memberships and leader delegation.

use super::SharedService;
use crate::{
    api::models::*,
    auth::session::Session,
    core::{
        errors::NeosecError,
        models::{
            audit::GroupAudit,
            firewall::{FirewallRule, FirewallRuleUpdate},
            group::{Group, GroupDetails, MembershipDetails},
            invitation::{Invitation, InvitationDetails},
            membership::{GroupMemberView, Membership},
            profile::{Profile, ProfileUpdate},
            subscription::Subscription,
            user::SubscriptionTier,
            vpn::{VpnConfig, VpnConfigUpdate},
        },
        services::{GroupChanges, NewGroup},
    },
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};

fn parse_paid_tier(tier: &str) -> Result<SubscriptionTier, NeosecError> {
    match tier.trim().to_ascii_lowercase().as_str() {
        "basic" => Ok(SubscriptionTier::Basic),
        "pro" => Ok(SubscriptionTier::Pro),
        "enterprise" => Ok(SubscriptionTier::Enterprise),
        _ => Err(NeosecError::invalid_input(
            "tier",
            "Invalid tier",
            "Invalid subscription tier. Must be: basic, pro, or enterprise",
        )),
    }
}

#[utoipa::path(
    get,
    path = "/api/hierarchy/subscription",
    responses(
        (status = 200, description = "Current subscription", body = Subscription),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn get_subscription(
    State(service): State<SharedService>,
    Extension(session): Extension<Session>,
) -> Result<Json<Subscription>, ApiError> {
    Ok(Json(service.get_my_subscription(&session).await?))
}

#[utoipa::path(
    post,
    path = "/api/hierarchy/subscription/upgrade",
    request_body = UpgradeRequest,
    responses(
        (status = 200, description = "Upgraded to leader", body = UpgradeResponse),
        (status = 400, description = "Invalid tier", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn upgrade_subscription(
    State(service): State<SharedService>,
    Extension(session): Extension<Session>,
    Json(req): Json<UpgradeRequest>,
) -> Result<Json<UpgradeResponse>, ApiError> {
    let tier = parse_paid_tier(&req.tier)?;
    let (subscription, user) = service.upgrade_to_leader(&session, tier).await?;
    Ok(Json(UpgradeResponse { subscription, user }))
}

#[utoipa::path(
    post,
    path = "/api/hierarchy/subscription/cancel",
    responses(
        (status = 200, description = "Subscription canceled", body = Subscription),
        (status = 400, description = "No active subscription", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn cancel_subscription(
    State(service): State<SharedService>,
    Extension(session): Extension<Session>,
) -> Result<Json<Subscription>, ApiError> {
    Ok(Json(service.cancel_subscription(&session).await?))
}

#[utoipa::path(
    post,
    path = "/api/hierarchy/groups",
    request_body = CreateGroupRequest,
    responses(
        (status = 201, description = "Group created", body = Group),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 403, description = "Not a leader or group limit reached", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn create_group(
    State(service): State<SharedService>,
    Extension(session): Extension<Session>,
    Json(req): Json<CreateGroupRequest>,
) -> Result<(StatusCode, Json<Group>), ApiError> {
    let group = service
        .create_group(
            &session,
            NewGroup {
                name: req.name,
                description: req.description,
                max_members: req.max_members,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(group)))
}

#[utoipa::path(
    get,
    path = "/api/hierarchy/groups/my-groups",
    responses(
        (status = 200, description = "Groups led by the caller", body = Vec<GroupDetails>)
    ),
    security(("Bearer" = []))
)]
pub async fn get_my_groups(
    State(service): State<SharedService>,
    Extension(session): Extension<Session>,
) -> Result<Json<Vec<GroupDetails>>, ApiError> {
    Ok(Json(service.get_my_groups(&session).await?))
}

#[utoipa::path(
    get,
    path = "/api/hierarchy/groups/{group_id}",
    params(("group_id" = String, Path, description = "Group ID")),
    responses(
        (status = 200, description = "Group with members", body = GroupDetails),
        (status = 403, description = "No access to this group", body = ErrorResponse),
        (status = 404, description = "Group not found", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn get_group(
    State(service): State<SharedService>,
    Extension(session): Extension<Session>,
    Path(group_id): Path<String>,
) -> Result<Json<GroupDetails>, ApiError> {
    Ok(Json(service.get_group_details(&session, &group_id).await?))
}

#[utoipa::path(
    put,
    path = "/api/hierarchy/groups/{group_id}",
    params(("group_id" = String, Path, description = "Group ID")),
    request_body = UpdateGroupRequest,
    responses(
        (status = 200, description = "Group updated", body = Group),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 403, description = "Not the group leader", body = ErrorResponse),
        (status = 404, description = "Group not found", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn update_group(
    State(service): State<SharedService>,
    Extension(session): Extension<Session>,
    Path(group_id): Path<String>,
    Json(req): Json<UpdateGroupRequest>,
) -> Result<Json<Group>, ApiError> {
    let group = service
        .update_group(
            &session,
            &group_id,
            GroupChanges {
                name: req.name,
                description: req.description,
                max_members: req.max_members,
                is_active: req.is_active,
            },
        )
        .await?;
    Ok(Json(group))
}

#[utoipa::path(
    delete,
    path = "/api/hierarchy/groups/{group_id}",
    params(("group_id" = String, Path, description = "Group ID")),
    responses(
        (status = 200, description = "Group deleted", body = MessageResponse),
        (status = 403, description = "Not the group leader", body = ErrorResponse),
        (status = 404, description = "Group not found", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn delete_group(
    State(service): State<SharedService>,
    Extension(session): Extension<Session>,
    Path(group_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    service.delete_group(&session, &group_id).await?;
    Ok(MessageResponse::ok("Group deleted"))
}

#[utoipa::path(
    post,
    path = "/api/hierarchy/groups/{group_id}/invite",
    params(("group_id" = String, Path, description = "Group ID")),
    request_body = InviteMemberRequest,
    responses(
        (status = 201, description = "Invitation created", body = Invitation),
        (status = 400, description = "Invalid email or inactive group", body = ErrorResponse),
        (status = 403, description = "Not the group leader", body = ErrorResponse),
        (status = 409, description = "Already a member, already invited or group full", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn invite_member(
    State(service): State<SharedService>,
    Extension(session): Extension<Session>,
    Path(group_id): Path<String>,
    Json(req): Json<InviteMemberRequest>,
) -> Result<(StatusCode, Json<Invitation>), ApiError> {
    let invitation = service.invite_member(&session, &group_id, &req.email).await?;
    Ok((StatusCode::CREATED, Json(invitation)))
}

#[utoipa::path(
    get,
    path = "/api/hierarchy/groups/{group_id}/members",
    params(("group_id" = String, Path, description = "Group ID")),
    responses(
        (status = 200, description = "Group members", body = Vec<GroupMemberView>),
        (status = 403, description = "Not the group leader", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn get_group_members(
    State(service): State<SharedService>,
    Extension(session): Extension<Session>,
    Path(group_id): Path<String>,
) -> Result<Json<Vec<GroupMemberView>>, ApiError> {
    Ok(Json(service.get_group_members(&session, &group_id).await?))
}

#[utoipa::path(
    delete,
    path = "/api/hierarchy/groups/{group_id}/members/{member_id}",
    params(
        ("group_id" = String, Path, description = "Group ID"),
        ("member_id" = String, Path, description = "User ID of the member")
    ),
    responses(
        (status = 200, description = "Member removed", body = MessageResponse),
        (status = 403, description = "Not the group leader", body = ErrorResponse),
        (status = 404, description = "Not a member of this group", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn remove_member(
    State(service): State<SharedService>,
    Extension(session): Extension<Session>,
    Path((group_id, member_id)): Path<(String, String)>,
) -> Result<Json<MessageResponse>, ApiError> {
    service.remove_member(&session, &group_id, &member_id).await?;
    Ok(MessageResponse::ok("Member removed"))
}

#[utoipa::path(
    put,
    path = "/api/hierarchy/groups/{group_id}/members/{member_id}/permissions",
    params(
        ("group_id" = String, Path, description = "Group ID"),
        ("member_id" = String, Path, description = "User ID of the member")
    ),
    request_body = MemberPermissionsRequest,
    responses(
        (status = 200, description = "Permissions updated", body = Membership),
        (status = 403, description = "Not the group leader", body = ErrorResponse),
        (status = 404, description = "Not a member of this group", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn update_member_permissions(
    State(service): State<SharedService>,
    Extension(session): Extension<Session>,
    Path((group_id, member_id)): Path<(String, String)>,
    Json(req): Json<MemberPermissionsRequest>,
) -> Result<Json<Membership>, ApiError> {
    let membership = service
        .update_member_permissions(&session, &group_id, &member_id, req.can_leader_manage_configs)
        .await?;
    Ok(Json(membership))
}

#[utoipa::path(
    get,
    path = "/api/hierarchy/groups/{group_id}/audits",
    params(("group_id" = String, Path, description = "Group ID")),
    responses(
        (status = 200, description = "Group audit trail", body = Vec<GroupAudit>),
        (status = 403, description = "Not the group leader", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn get_group_audits(
    State(service): State<SharedService>,
    Extension(session): Extension<Session>,
    Path(group_id): Path<String>,
) -> Result<Json<Vec<GroupAudit>>, ApiError> {
    Ok(Json(service.get_group_audits(&session, &group_id).await?))
}

#[utoipa::path(
    get,
    path = "/api/hierarchy/invitations",
    responses(
        (status = 200, description = "Invitations addressed to the caller", body = Vec<InvitationDetails>)
    ),
    security(("Bearer" = []))
)]
pub async fn get_my_invitations(
    State(service): State<SharedService>,
    Extension(session): Extension<Session>,
) -> Result<Json<Vec<InvitationDetails>>, ApiError> {
    Ok(Json(service.list_my_invitations(&session).await?))
}

#[utoipa::path(
    post,
    path = "/api/hierarchy/invitations/{invitation_id}/accept",
    params(("invitation_id" = String, Path, description = "Invitation ID")),
    responses(
        (status = 200, description = "Joined the group", body = Membership),
        (status = 400, description = "Invitation expired or group inactive", body = ErrorResponse),
        (status = 403, description = "Invitation addressed to someone else", body = ErrorResponse),
        (status = 404, description = "Invitation not found", body = ErrorResponse),
        (status = 409, description = "Already resolved, already a member or group full", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn accept_invitation(
    State(service): State<SharedService>,
    Extension(session): Extension<Session>,
    Path(invitation_id): Path<String>,
) -> Result<Json<Membership>, ApiError> {
    Ok(Json(service.accept_invitation(&session, &invitation_id).await?))
}

#[utoipa::path(
    post,
    path = "/api/hierarchy/invitations/{invitation_id}/reject",
    params(("invitation_id" = String, Path, description = "Invitation ID")),
    responses(
        (status = 200, description = "Invitation rejected", body = Invitation),
        (status = 400, description = "Invitation expired", body = ErrorResponse),
        (status = 403, description = "Invitation addressed to someone else", body = ErrorResponse),
        (status = 404, description = "Invitation not found", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn reject_invitation(
    State(service): State<SharedService>,
    Extension(session): Extension<Session>,
    Path(invitation_id): Path<String>,
) -> Result<Json<Invitation>, ApiError> {
    Ok(Json(service.reject_invitation(&session, &invitation_id).await?))
}

#[utoipa::path(
    get,
    path = "/api/hierarchy/memberships",
    responses(
        (status = 200, description = "Groups the caller belongs to", body = Vec<MembershipDetails>)
    ),
    security(("Bearer" = []))
)]
pub async fn get_my_memberships(
    State(service): State<SharedService>,
    Extension(session): Extension<Session>,
) -> Result<Json<Vec<MembershipDetails>>, ApiError> {
    Ok(Json(service.get_my_memberships(&session).await?))
}

#[utoipa::path(
    post,
    path = "/api/hierarchy/memberships/{membership_id}/leave",
    params(("membership_id" = String, Path, description = "Membership ID")),
    responses(
        (status = 200, description = "Left the group", body = MessageResponse),
        (status = 403, description = "Not your membership", body = ErrorResponse),
        (status = 404, description = "Membership not found", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn leave_group(
    State(service): State<SharedService>,
    Extension(session): Extension<Session>,
    Path(membership_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    service.leave_group(&session, &membership_id).await?;
    Ok(MessageResponse::ok("Left group"))
}

#[utoipa::path(
    get,
    path = "/api/hierarchy/members/{member_id}/profiles",
    params(("member_id" = String, Path, description = "User ID of the member")),
    responses(
        (status = 200, description = "Member's security profiles", body = Vec<Profile>),
        (status = 403, description = "Caller does not lead this member", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn get_member_profiles(
    State(service): State<SharedService>,
    Extension(session): Extension<Session>,
    Path(member_id): Path<String>,
) -> Result<Json<Vec<Profile>>, ApiError> {
    Ok(Json(service.get_member_profiles(&session, &member_id).await?))
}

#[utoipa::path(
    put,
    path = "/api/hierarchy/members/{member_id}/profiles/{profile_id}",
    params(
        ("member_id" = String, Path, description = "User ID of the member"),
        ("profile_id" = String, Path, description = "Profile ID")
    ),
    request_body = ProfileUpdate,
    responses(
        (status = 200, description = "Profile updated", body = Profile),
        (status = 403, description = "Caller may not manage this member", body = ErrorResponse),
        (status = 404, description = "Profile not found", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn update_member_profile(
    State(service): State<SharedService>,
    Extension(session): Extension<Session>,
    Path((member_id, profile_id)): Path<(String, String)>,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<Profile>, ApiError> {
    let profile = service
        .update_member_profile(&session, &member_id, &profile_id, update)
        .await?;
    Ok(Json(profile))
}

#[utoipa::path(
    get,
    path = "/api/hierarchy/members/{member_id}/firewall",
    params(("member_id" = String, Path, description = "User ID of the member")),
    responses(
        (status = 200, description = "Member's firewall rules", body = Vec<FirewallRule>),
        (status = 403, description = "Caller does not lead this member", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn get_member_firewall_rules(
    State(service): State<SharedService>,
    Extension(session): Extension<Session>,
    Path(member_id): Path<String>,
) -> Result<Json<Vec<FirewallRule>>, ApiError> {
    Ok(Json(service.get_member_firewall_rules(&session, &member_id).await?))
}

#[utoipa::path(
    put,
    path = "/api/hierarchy/members/{member_id}/firewall/{rule_id}",
    params(
        ("member_id" = String, Path, description = "User ID of the member"),
        ("rule_id" = String, Path, description = "Firewall rule ID")
    ),
    request_body = FirewallRuleUpdate,
    responses(
        (status = 200, description = "Rule updated", body = FirewallRule),
        (status = 403, description = "Caller may not manage this member", body = ErrorResponse),
        (status = 404, description = "Rule not found", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn update_member_firewall_rule(
    State(service): State<SharedService>,
    Extension(session): Extension<Session>,
    Path((member_id, rule_id)): Path<(String, String)>,
    Json(update): Json<FirewallRuleUpdate>,
) -> Result<Json<FirewallRule>, ApiError> {
    let rule = service
        .update_member_firewall_rule(&session, &member_id, &rule_id, update)
        .await?;
    Ok(Json(rule))
}

#[utoipa::path(
    get,
    path = "/api/hierarchy/members/{member_id}/vpn",
    params(("member_id" = String, Path, description = "User ID of the member")),
    responses(
        (status = 200, description = "Member's VPN configs", body = Vec<VpnConfig>),
        (status = 403, description = "Caller does not lead this member", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn get_member_vpn_configs(
    State(service): State<SharedService>,
    Extension(session): Extension<Session>,
    Path(member_id): Path<String>,
) -> Result<Json<Vec<VpnConfig>>, ApiError> {
    Ok(Json(service.get_member_vpn_configs(&session, &member_id).await?))
}

#[utoipa::path(
    put,
    path = "/api/hierarchy/members/{member_id}/vpn/{config_id}",
    params(
        ("member_id" = String, Path, description = "User ID of the member"),
        ("config_id" = String, Path, description = "VPN config ID")
    ),
    request_body = VpnConfigUpdate,
    responses(
        (status = 200, description = "Config updated", body = VpnConfig),
        (status = 403, description = "Caller may not manage this member", body = ErrorResponse),
        (status = 404, description = "Config not found", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn update_member_vpn_config(
    State(service): State<SharedService>,
    Extension(session): Extension<Session>,
    Path((member_id, config_id)): Path<(String, String)>,
    Json(update): Json<VpnConfigUpdate>,
) -> Result<Json<VpnConfig>, ApiError> {
    let config = service
        .update_member_vpn_config(&session, &member_id, &config_id, update)
        .await?;
    Ok(Json(config))
}
