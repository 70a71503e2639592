use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub title: String,
    pub description: String,
}

impl FieldError {
    pub fn new(field: &str, title: impl Into<String>, description: impl Into<String>) -> Self {
        FieldError {
            field: field.to_string(),
            title: title.into(),
            description: description.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.title, self.description)
    }
}

#[derive(Error, Debug, Serialize)]
pub enum NeosecError {
    /// Email field is empty
    #[error("Email is required")]
    MissingEmail,

    /// Email does not look like an address
    #[error("Invalid email format: {0}")]
    InvalidEmail(String),

    /// Email is already registered
    #[error("User already exists with email {0}")]
    EmailAlreadyRegistered(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Missing, malformed or expired bearer token
    #[error("Not authorized: {0}")]
    Unauthorized(String),

    /// Authenticated, but the action is not allowed for this user
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("User {0} not found")]
    UserNotFound(String),

    #[error("Group {0} not found")]
    GroupNotFound(String),

    #[error("Group {0} is not active")]
    GroupInactive(String),

    /// Membership count already reached `maxMembers`
    #[error("Group {0} is full")]
    GroupFull(String),

    /// Leader already owns as many active groups as the tier allows
    #[error("You have reached the maximum number of groups ({0}) for your subscription tier")]
    GroupLimitReached(usize),

    #[error("User {0} is already a group member")]
    AlreadyGroupMember(String),

    #[error("User {0} is not a group member")]
    NotGroupMember(String),

    #[error("Membership {0} not found")]
    MembershipNotFound(String),

    #[error("Invitation {0} not found")]
    InvitationNotFound(String),

    #[error("Invitation {0} has expired")]
    InvitationExpired(String),

    /// Invitation was already accepted or rejected
    #[error("Invitation {0} is no longer pending")]
    InvitationAlreadyResolved(String),

    #[error("Invitation already sent to {0}")]
    InvitationAlreadyPending(String),

    #[error("You cannot invite yourself to the group")]
    CannotInviteSelf,

    #[error("VPN configuration {0} not found")]
    VpnConfigNotFound(String),

    #[error("VPN configuration named {0} already exists")]
    VpnConfigNameTaken(String),

    #[error("Profile {0} not found")]
    ProfileNotFound(String),

    #[error("Firewall rule {0} not found")]
    FirewallRuleNotFound(String),

    /// Generic input validation error with detailed field information
    #[error("Invalid input for field `{0}`: {1}")]
    InvalidInput(String, FieldError),

    #[error("Internal server error: {0}")]
    InternalServerError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Logging error: {0}")]
    LoggingError(String),

    #[error("Cache error: {0}")]
    CacheError(String),
}

impl NeosecError {
    pub fn invalid_input(field: &str, title: impl Into<String>, description: impl Into<String>) -> Self {
        NeosecError::InvalidInput(field.to_string(), FieldError::new(field, title, description))
    }

    pub fn forbidden(reason: impl Into<String>) -> Self {
        NeosecError::Forbidden(reason.into())
    }
}
