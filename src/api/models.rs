use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::{IntoParams, ToSchema};

use crate::core::{
    errors::NeosecError,
    models::{subscription::Subscription, user::User},
};

// Request structs for JSON payloads
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
    pub phone: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, IntoParams, Default)]
#[serde(rename_all = "camelCase")]
pub struct LoginHistoryQuery {
    /// Another user's id; admins only.
    pub user_id: Option<String>,
    /// Only attempts flagged as suspicious.
    pub suspicious: Option<bool>,
}

#[derive(Deserialize, IntoParams, Default)]
pub struct SecurityEventsQuery {
    /// Look-back window in days (default 7, at most 90).
    pub days: Option<i64>,
}

#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

#[derive(Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpgradeRequest {
    /// One of `basic`, `pro` or `enterprise`.
    pub tier: String,
}

#[derive(Serialize, ToSchema)]
pub struct UpgradeResponse {
    pub subscription: Subscription,
    pub user: User,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateGroupRequest {
    pub name: String,
    pub description: Option<String>,
    pub max_members: Option<usize>,
}

#[derive(Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGroupRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub max_members: Option<usize>,
    pub is_active: Option<bool>,
}

#[derive(Deserialize, ToSchema)]
pub struct InviteMemberRequest {
    pub email: String,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemberPermissionsRequest {
    pub can_leader_manage_configs: bool,
}

#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Json<Self> {
        Json(MessageResponse {
            success: true,
            message: message.into(),
        })
    }
}

// Error response struct
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}

// Newtype wrapper for NeosecError to implement IntoResponse
pub struct ApiError(pub NeosecError);

impl From<NeosecError> for ApiError {
    fn from(err: NeosecError) -> Self {
        ApiError(err)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            NeosecError::MissingEmail
            | NeosecError::InvalidEmail(_)
            | NeosecError::InvalidInput(..)
            | NeosecError::CannotInviteSelf
            | NeosecError::GroupInactive(_)
            | NeosecError::InvitationExpired(_) => StatusCode::BAD_REQUEST,
            NeosecError::InvalidCredentials | NeosecError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            NeosecError::Forbidden(_) | NeosecError::GroupLimitReached(_) => StatusCode::FORBIDDEN,
            NeosecError::UserNotFound(_)
            | NeosecError::GroupNotFound(_)
            | NeosecError::NotGroupMember(_)
            | NeosecError::MembershipNotFound(_)
            | NeosecError::InvitationNotFound(_)
            | NeosecError::VpnConfigNotFound(_)
            | NeosecError::ProfileNotFound(_)
            | NeosecError::FirewallRuleNotFound(_) => StatusCode::NOT_FOUND,
            NeosecError::EmailAlreadyRegistered(_)
            | NeosecError::GroupFull(_)
            | NeosecError::AlreadyGroupMember(_)
            | NeosecError::InvitationAlreadyResolved(_)
            | NeosecError::InvitationAlreadyPending(_)
            | NeosecError::VpnConfigNameTaken(_) => StatusCode::CONFLICT,
            NeosecError::InternalServerError(_)
            | NeosecError::StorageError(_)
            | NeosecError::LoggingError(_)
            | NeosecError::CacheError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = %self.0, "request failed");
            "Internal server error".to_string()
        } else {
            self.0.to_string()
        };
        (
            status,
            Json(ErrorResponse {
                success: false,
                message,
            }),
        )
            .into_response()
    }
}
