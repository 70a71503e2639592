use super::SharedService;
use crate::{
    api::models::*,
    auth::session::Session,
    core::models::vpn::{NewVpnConfig, VpnConfig, VpnConfigUpdate},
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use http::header;

#[utoipa::path(
    get,
    path = "/api/vpn",
    responses((status = 200, description = "Caller's VPN configs, newest first", body = Vec<VpnConfig>)),
    security(("Bearer" = []))
)]
pub async fn list_vpn_configs(
    State(service): State<SharedService>,
    Extension(session): Extension<Session>,
) -> Result<Json<Vec<VpnConfig>>, ApiError> {
    Ok(Json(service.list_vpn_configs(&session).await?))
}

#[utoipa::path(
    post,
    path = "/api/vpn",
    request_body = NewVpnConfig,
    responses(
        (status = 201, description = "Config created", body = VpnConfig),
        (status = 400, description = "Invalid config", body = ErrorResponse),
        (status = 409, description = "Name already used", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn create_vpn_config(
    State(service): State<SharedService>,
    Extension(session): Extension<Session>,
    Json(req): Json<NewVpnConfig>,
) -> Result<(StatusCode, Json<VpnConfig>), ApiError> {
    let config = service.create_vpn_config(&session, req).await?;
    Ok((StatusCode::CREATED, Json(config)))
}

#[utoipa::path(
    get,
    path = "/api/vpn/{config_id}",
    params(("config_id" = String, Path, description = "VPN config ID")),
    responses(
        (status = 200, description = "Config", body = VpnConfig),
        (status = 404, description = "Config not found", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn get_vpn_config(
    State(service): State<SharedService>,
    Extension(session): Extension<Session>,
    Path(config_id): Path<String>,
) -> Result<Json<VpnConfig>, ApiError> {
    Ok(Json(service.get_vpn_config(&session, &config_id).await?))
}

#[utoipa::path(
    put,
    path = "/api/vpn/{config_id}",
    params(("config_id" = String, Path, description = "VPN config ID")),
    request_body = VpnConfigUpdate,
    responses(
        (status = 200, description = "Config updated", body = VpnConfig),
        (status = 400, description = "Invalid config", body = ErrorResponse),
        (status = 404, description = "Config not found", body = ErrorResponse),
        (status = 409, description = "Name already used", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn update_vpn_config(
    State(service): State<SharedService>,
    Extension(session): Extension<Session>,
    Path(config_id): Path<String>,
    Json(update): Json<VpnConfigUpdate>,
) -> Result<Json<VpnConfig>, ApiError> {
    Ok(Json(service.update_vpn_config(&session, &config_id, update).await?))
}

#[utoipa::path(
    delete,
    path = "/api/vpn/{config_id}",
    params(("config_id" = String, Path, description = "VPN config ID")),
    responses(
        (status = 200, description = "Config deleted", body = MessageResponse),
        (status = 404, description = "Config not found", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn delete_vpn_config(
    State(service): State<SharedService>,
    Extension(session): Extension<Session>,
    Path(config_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    service.delete_vpn_config(&session, &config_id).await?;
    Ok(MessageResponse::ok("VPN configuration deleted"))
}

#[utoipa::path(
    patch,
    path = "/api/vpn/{config_id}/toggle",
    params(("config_id" = String, Path, description = "VPN config ID")),
    responses(
        (status = 200, description = "Config toggled", body = VpnConfig),
        (status = 404, description = "Config not found", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn toggle_vpn_config(
    State(service): State<SharedService>,
    Extension(session): Extension<Session>,
    Path(config_id): Path<String>,
) -> Result<Json<VpnConfig>, ApiError> {
    Ok(Json(service.toggle_vpn_config(&session, &config_id).await?))
}

#[utoipa::path(
    post,
    path = "/api/vpn/{config_id}/clone",
    params(("config_id" = String, Path, description = "VPN config ID")),
    responses(
        (status = 201, description = "Config cloned", body = VpnConfig),
        (status = 404, description = "Config not found", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn clone_vpn_config(
    State(service): State<SharedService>,
    Extension(session): Extension<Session>,
    Path(config_id): Path<String>,
) -> Result<(StatusCode, Json<VpnConfig>), ApiError> {
    let copy = service.clone_vpn_config(&session, &config_id).await?;
    Ok((StatusCode::CREATED, Json(copy)))
}

#[utoipa::path(
    get,
    path = "/api/vpn/{config_id}/download",
    params(("config_id" = String, Path, description = "VPN config ID")),
    responses(
        (status = 200, description = "Config file as attachment", body = String),
        (status = 404, description = "Config not found", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn download_vpn_config(
    State(service): State<SharedService>,
    Extension(session): Extension<Session>,
    Path(config_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let download = service.download_vpn_config(&session, &config_id).await?;
    let file_name: String = download
        .file_name
        .chars()
        .filter(|c| (c.is_ascii_graphic() || *c == ' ') && !matches!(c, '"' | '\\'))
        .collect();
    let disposition = format!("attachment; filename=\"{}\"", file_name);
    Ok((
        [
            (header::CONTENT_TYPE, download.content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        download.content,
    ))
}
