pub mod auth;
pub mod hierarchy;
pub mod security;
pub mod vpn;

use crate::{
    api::models::ApiError,
    core::{errors::NeosecError, services::NeosecService},
    infrastructure::{
        cache::in_memory::InMemoryCache, logging::in_memory::InMemoryLogging, storage::in_memory::InMemoryStorage,
    },
};
use axum::{
    Router,
    extract::{Request, State},
    middleware::{self, Next},
    response::IntoResponse,
    routing::{delete, get, patch, post, put},
};
use http::header;
use std::sync::Arc;

pub type AppService = NeosecService<InMemoryLogging, InMemoryStorage, InMemoryCache>;
pub type SharedService = Arc<AppService>;

// Middleware to resolve the bearer token into a Session
async fn auth_middleware(
    State(service): State<SharedService>,
    mut req: Request,
    next: Next,
) -> Result<impl IntoResponse, ApiError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| NeosecError::Unauthorized("Missing Authorization header".to_string()))?
        .strip_prefix("Bearer ")
        .map(str::to_owned)
        .ok_or_else(|| NeosecError::Unauthorized("Invalid Authorization header".to_string()))?;

    let claims = service.validate_token(&token)?;
    let session = service.resolve_session(&claims).await?;
    req.extensions_mut().insert(session);
    Ok(next.run(req).await)
}

// Define API routes, mounted under /api
pub fn api_routes(service: SharedService) -> Router {
    let protected_routes = Router::new()
        .route("/auth/me", get(auth::me))
        .route("/auth/profile", put(auth::update_profile))
        .route("/logs", get(auth::get_app_logs))
        .route("/login-history", get(auth::get_login_history))
        .route("/login-history/security-events", get(auth::get_security_events))
        .route(
            "/hierarchy/subscription",
            get(hierarchy::get_subscription).post(hierarchy::upgrade_subscription),
        )
        .route("/hierarchy/subscription/upgrade", post(hierarchy::upgrade_subscription))
        .route("/hierarchy/subscription/cancel", post(hierarchy::cancel_subscription))
        .route("/hierarchy/groups", post(hierarchy::create_group))
        .route("/hierarchy/groups/my-groups", get(hierarchy::get_my_groups))
        .route(
            "/hierarchy/groups/{group_id}",
            get(hierarchy::get_group)
                .put(hierarchy::update_group)
                .delete(hierarchy::delete_group),
        )
        .route("/hierarchy/groups/{group_id}/invite", post(hierarchy::invite_member))
        .route("/hierarchy/groups/{group_id}/members", get(hierarchy::get_group_members))
        .route(
            "/hierarchy/groups/{group_id}/members/{member_id}",
            delete(hierarchy::remove_member),
        )
        .route(
            "/hierarchy/groups/{group_id}/members/{member_id}/permissions",
            put(hierarchy::update_member_permissions),
        )
        .route("/hierarchy/groups/{group_id}/audits", get(hierarchy::get_group_audits))
        .route("/hierarchy/invitations", get(hierarchy::get_my_invitations))
        .route(
            "/hierarchy/invitations/{invitation_id}/accept",
            post(hierarchy::accept_invitation),
        )
        .route(
            "/hierarchy/invitations/{invitation_id}/reject",
            post(hierarchy::reject_invitation),
        )
        .route("/hierarchy/memberships", get(hierarchy::get_my_memberships))
        .route(
            "/hierarchy/memberships/{membership_id}/leave",
            post(hierarchy::leave_group),
        )
        .route("/hierarchy/members/{member_id}/profiles", get(hierarchy::get_member_profiles))
        .route(
            "/hierarchy/members/{member_id}/profiles/{profile_id}",
            put(hierarchy::update_member_profile),
        )
        .route("/hierarchy/members/{member_id}/firewall", get(hierarchy::get_member_firewall_rules))
        .route(
            "/hierarchy/members/{member_id}/firewall/{rule_id}",
            put(hierarchy::update_member_firewall_rule),
        )
        .route("/hierarchy/members/{member_id}/vpn", get(hierarchy::get_member_vpn_configs))
        .route(
            "/hierarchy/members/{member_id}/vpn/{config_id}",
            put(hierarchy::update_member_vpn_config),
        )
        .route("/vpn", get(vpn::list_vpn_configs).post(vpn::create_vpn_config))
        .route(
            "/vpn/{config_id}",
            get(vpn::get_vpn_config)
                .put(vpn::update_vpn_config)
                .delete(vpn::delete_vpn_config),
        )
        .route("/vpn/{config_id}/toggle", patch(vpn::toggle_vpn_config))
        .route("/vpn/{config_id}/clone", post(vpn::clone_vpn_config))
        .route("/vpn/{config_id}/download", get(vpn::download_vpn_config))
        .route("/profiles", get(security::list_profiles).post(security::create_profile))
        .route(
            "/profiles/{profile_id}",
            put(security::update_profile).delete(security::delete_profile),
        )
        .route(
            "/firewall",
            get(security::list_firewall_rules).post(security::create_firewall_rule),
        )
        .route(
            "/firewall/{rule_id}",
            put(security::update_firewall_rule).delete(security::delete_firewall_rule),
        )
        .route_layer(middleware::from_fn_with_state(service.clone(), auth_middleware));

    Router::new()
        .route("/auth/register", post(auth::register)) // Unprotected
        .route("/auth/login", post(auth::login)) // Unprotected
        .merge(protected_routes)
        .with_state(service)
}
