use super::SharedService;
use crate::{
    api::models::*,
    auth::session::Session,
    core::models::{
        firewall::{FirewallRule, FirewallRuleUpdate, NewFirewallRule},
        profile::{NewProfile, Profile, ProfileUpdate},
    },
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};

#[utoipa::path(
    get,
    path = "/api/profiles",
    responses((status = 200, description = "Caller's security profiles", body = Vec<Profile>)),
    security(("Bearer" = []))
)]
pub async fn list_profiles(
    State(service): State<SharedService>,
    Extension(session): Extension<Session>,
) -> Result<Json<Vec<Profile>>, ApiError> {
    Ok(Json(service.list_profiles(&session).await?))
}

#[utoipa::path(
    post,
    path = "/api/profiles",
    request_body = NewProfile,
    responses(
        (status = 201, description = "Profile created", body = Profile),
        (status = 400, description = "Invalid input", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn create_profile(
    State(service): State<SharedService>,
    Extension(session): Extension<Session>,
    Json(req): Json<NewProfile>,
) -> Result<(StatusCode, Json<Profile>), ApiError> {
    let profile = service.create_profile(&session, req).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

#[utoipa::path(
    put,
    path = "/api/profiles/{profile_id}",
    params(("profile_id" = String, Path, description = "Profile ID")),
    request_body = ProfileUpdate,
    responses(
        (status = 200, description = "Profile updated", body = Profile),
        (status = 404, description = "Profile not found", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn update_profile(
    State(service): State<SharedService>,
    Extension(session): Extension<Session>,
    Path(profile_id): Path<String>,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<Profile>, ApiError> {
    Ok(Json(
        service.update_profile_settings(&session, &profile_id, update).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/profiles/{profile_id}",
    params(("profile_id" = String, Path, description = "Profile ID")),
    responses(
        (status = 200, description = "Profile deleted", body = MessageResponse),
        (status = 404, description = "Profile not found", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn delete_profile(
    State(service): State<SharedService>,
    Extension(session): Extension<Session>,
    Path(profile_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    service.delete_profile(&session, &profile_id).await?;
    Ok(MessageResponse::ok("Profile deleted"))
}

#[utoipa::path(
    get,
    path = "/api/firewall",
    responses((status = 200, description = "Caller's firewall rules", body = Vec<FirewallRule>)),
    security(("Bearer" = []))
)]
pub async fn list_firewall_rules(
    State(service): State<SharedService>,
    Extension(session): Extension<Session>,
) -> Result<Json<Vec<FirewallRule>>, ApiError> {
    Ok(Json(service.list_firewall_rules(&session).await?))
}

#[utoipa::path(
    post,
    path = "/api/firewall",
    request_body = NewFirewallRule,
    responses(
        (status = 201, description = "Rule created", body = FirewallRule),
        (status = 400, description = "Invalid address or port", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn create_firewall_rule(
    State(service): State<SharedService>,
    Extension(session): Extension<Session>,
    Json(req): Json<NewFirewallRule>,
) -> Result<(StatusCode, Json<FirewallRule>), ApiError> {
    let rule = service.create_firewall_rule(&session, req).await?;
    Ok((StatusCode::CREATED, Json(rule)))
}

#[utoipa::path(
    put,
    path = "/api/firewall/{rule_id}",
    params(("rule_id" = String, Path, description = "Firewall rule ID")),
    request_body = FirewallRuleUpdate,
    responses(
        (status = 200, description = "Rule updated", body = FirewallRule),
        (status = 404, description = "Rule not found", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn update_firewall_rule(
    State(service): State<SharedService>,
    Extension(session): Extension<Session>,
    Path(rule_id): Path<String>,
    Json(update): Json<FirewallRuleUpdate>,
) -> Result<Json<FirewallRule>, ApiError> {
    Ok(Json(service.update_firewall_rule(&session, &rule_id, update).await?))
}

#[utoipa::path(
    delete,
    path = "/api/firewall/{rule_id}",
    params(("rule_id" = String, Path, description = "Firewall rule ID")),
    responses(
        (status = 200, description = "Rule deleted", body = MessageResponse),
        (status = 404, description = "Rule not found", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn delete_firewall_rule(
    State(service): State<SharedService>,
    Extension(session): Extension<Session>,
    Path(rule_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    service.delete_firewall_rule(&session, &rule_id).await?;
    Ok(MessageResponse::ok("Firewall rule deleted"))
}
