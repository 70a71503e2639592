use super::SharedService;
use crate::{
    api::models::*,
    auth::session::Session,
    core::{
        models::{
            audit::{AppLog, LoginRecord},
            user::User,
        },
        services::{LoginContext, ProfileChanges, Registration},
    },
};
use axum::{
    Extension, Json,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
};
use http::header;

/// Client address and agent as reported by the proxy headers.
fn login_context(headers: &HeaderMap) -> LoginContext {
    let header_str = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());
    let ip_address = header_str("x-forwarded-for")
        .and_then(|v| v.split(',').next())
        .or_else(|| header_str("x-real-ip"))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from);
    LoginContext {
        ip_address,
        user_agent: headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(String::from),
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = User),
        (status = 400, description = "Invalid email or password", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn register(
    State(service): State<SharedService>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let user = service
        .register(Registration {
            email: req.email,
            password: req.password,
            name: req.name,
            phone: req.phone,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn login(
    State(service): State<SharedService>,
    headers: HeaderMap,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let result = service
        .login_with_context(&req.email, &req.password, login_context(&headers))
        .await?;
    Ok(Json(LoginResponse {
        token: result.token,
        user: result.user,
    }))
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user", body = User),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn me(
    State(service): State<SharedService>,
    Extension(session): Extension<Session>,
) -> Result<Json<User>, ApiError> {
    Ok(Json(service.me(&session).await?))
}

#[utoipa::path(
    put,
    path = "/api/auth/profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = User),
        (status = 400, description = "Invalid input or wrong current password", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn update_profile(
    State(service): State<SharedService>,
    Extension(session): Extension<Session>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<User>, ApiError> {
    let user = service
        .update_profile(
            &session,
            ProfileChanges {
                name: req.name,
                phone: req.phone,
                current_password: req.current_password,
                new_password: req.new_password,
            },
        )
        .await?;
    Ok(Json(user))
}

#[utoipa::path(
    get,
    path = "/api/logs",
    responses(
        (status = 200, description = "Activity log", body = Vec<AppLog>),
        (status = 403, description = "Admin only", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn get_app_logs(
    State(service): State<SharedService>,
    Extension(session): Extension<Session>,
) -> Result<Json<Vec<AppLog>>, ApiError> {
    let logs = service.get_app_logs(&session).await?;
    Ok(Json(logs))
}

#[utoipa::path(
    get,
    path = "/api/login-history",
    params(LoginHistoryQuery),
    responses(
        (status = 200, description = "Sign-in attempts, newest first", body = Vec<LoginRecord>),
        (status = 403, description = "Another user's history requires admin", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn get_login_history(
    State(service): State<SharedService>,
    Extension(session): Extension<Session>,
    Query(query): Query<LoginHistoryQuery>,
) -> Result<Json<Vec<LoginRecord>>, ApiError> {
    let history = service
        .get_login_history(&session, query.user_id.as_deref(), query.suspicious.unwrap_or(false))
        .await?;
    Ok(Json(history))
}

#[utoipa::path(
    get,
    path = "/api/login-history/security-events",
    params(SecurityEventsQuery),
    responses(
        (status = 200, description = "Failed and suspicious sign-ins", body = Vec<LoginRecord>),
        (status = 403, description = "Admin only", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn get_security_events(
    State(service): State<SharedService>,
    Extension(session): Extension<Session>,
    Query(query): Query<SecurityEventsQuery>,
) -> Result<Json<Vec<LoginRecord>>, ApiError> {
    Ok(Json(service.get_security_events(&session, query.days).await?))
}
