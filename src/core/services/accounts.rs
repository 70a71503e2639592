use super::NeosecService;
use crate::auth::password::{hash_password, verify_password};
use crate::auth::session::Session;
use crate::constants::{
    DEFAULT_SECURITY_EVENT_DAYS, MAX_NAME_LENGTH, MAX_SECURITY_EVENT_DAYS, PROFILE_UPDATED, SUSPICIOUS_LOGIN_FAILURES,
    SUSPICIOUS_LOGIN_WINDOW_MINUTES, USER_LOGGED_IN, USER_REGISTERED,
};
use crate::core::errors::NeosecError;
use crate::core::models::{
    audit::{AppLog, LoginRecord},
    user::{AccountType, SubscriptionTier, User, UserRole},
};
use crate::core::validation::{normalize_email, validate_password, validate_string_input};
use crate::infrastructure::cache::Cache;
use crate::infrastructure::logging::LoggingService;
use crate::infrastructure::storage::Storage;
use chrono::{Duration, Utc};
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

/// Where a sign-in attempt came from, as far as the transport can tell.
#[derive(Debug, Clone, Default)]
pub struct LoginContext {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LoginResult {
    pub token: String,
    pub user: User,
}

impl<L: LoggingService, S: Storage, C: Cache> NeosecService<L, S, C> {
    /// Creates a member account. The very first account becomes the admin.
    pub async fn register(&self, registration: Registration) -> Result<User, NeosecError> {
        let email = normalize_email(&registration.email)?;
        validate_password("password", &registration.password)?;
        if let Some(name) = &registration.name {
            validate_string_input("name", name, MAX_NAME_LENGTH)?;
        }

        if self.storage.get_user_by_email(&email).await?.is_some() {
            return Err(NeosecError::EmailAlreadyRegistered(email));
        }

        let is_first_user = self.storage.count_users().await? == 0;
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4().to_string(),
            email,
            name: registration.name.map(|n| n.trim().to_string()),
            phone: registration.phone,
            password_hash: hash_password(&registration.password, self.password_cost)?,
            role: if is_first_user { UserRole::Admin } else { UserRole::User },
            account_type: AccountType::Member,
            subscription_tier: SubscriptionTier::Free,
            is_paid: false,
            created_at: now,
            updated_at: now,
        };
        let user = self.storage.insert_user(user).await?;

        self.log_and_audit(
            None,
            USER_REGISTERED,
            json!({ "user_id": user.id, "email": user.email, "admin": is_first_user }),
            Some(user.id.as_str()),
        )
        .await?;
        info!(user_id = %user.id, admin = is_first_user, "user registered");
        Ok(user)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResult, NeosecError> {
        self.login_with_context(email, password, LoginContext::default()).await
    }

    /// Signs in and records the attempt in the login history. A failed
    /// password is flagged suspicious once the same source already failed
    /// three times within fifteen minutes.
    pub async fn login_with_context(
        &self,
        email: &str,
        password: &str,
        context: LoginContext,
    ) -> Result<LoginResult, NeosecError> {
        let normalized = normalize_email(email);
        let email_key = normalized
            .as_ref()
            .cloned()
            .unwrap_or_else(|_| email.trim().to_lowercase());
        let user = match &normalized {
            Ok(email) => self.storage.get_user_by_email(email).await?,
            Err(_) => None,
        };

        let Some(user) = user else {
            warn!(email = %email_key, "login for unknown account");
            self.record_login(None, &email_key, &context, Some("User not found"), true)
                .await?;
            return Err(NeosecError::InvalidCredentials);
        };

        if !verify_password(password, &user.password_hash)? {
            let since = Utc::now() - Duration::minutes(SUSPICIOUS_LOGIN_WINDOW_MINUTES);
            let recent_failures = self
                .storage
                .count_failed_logins(context.ip_address.as_deref(), &email_key, since)
                .await?;
            let suspicious = recent_failures >= SUSPICIOUS_LOGIN_FAILURES;
            if suspicious {
                warn!(user_id = %user.id, recent_failures, "repeated failed logins");
            }
            self.record_login(Some(&user.id), &email_key, &context, Some("Invalid password"), suspicious)
                .await?;
            return Err(NeosecError::InvalidCredentials);
        }

        let token = self.jwt_service.generate_token(&user.id, user.role)?;
        self.record_login(Some(&user.id), &user.email, &context, None, false)
            .await?;
        self.log_and_audit(None, USER_LOGGED_IN, json!({ "user_id": user.id }), Some(user.id.as_str()))
            .await?;
        Ok(LoginResult { token, user })
    }

    async fn record_login(
        &self,
        user_id: Option<&str>,
        email: &str,
        context: &LoginContext,
        failure_reason: Option<&str>,
        suspicious_activity: bool,
    ) -> Result<(), NeosecError> {
        self.storage
            .save_login_record(LoginRecord {
                id: Uuid::new_v4().to_string(),
                user_id: user_id.map(String::from),
                email: email.to_string(),
                ip_address: context.ip_address.clone(),
                user_agent: context.user_agent.clone(),
                success: failure_reason.is_none(),
                failure_reason: failure_reason.map(String::from),
                suspicious_activity,
                timestamp: Utc::now(),
            })
            .await
    }

    /// The caller's sign-in attempts, newest first. Admins may ask for any
    /// user's history.
    pub async fn get_login_history(
        &self,
        session: &Session,
        user_id: Option<&str>,
        suspicious_only: bool,
    ) -> Result<Vec<LoginRecord>, NeosecError> {
        let target = user_id.unwrap_or(session.user_id());
        if target != session.user_id() && !session.user.is_admin() {
            return Err(NeosecError::forbidden("Admin privileges required"));
        }
        let mut records = self.storage.get_login_records(target).await?;
        if suspicious_only {
            records.retain(|r| r.suspicious_activity);
        }
        Ok(records)
    }

    /// Failed and suspicious sign-ins of every account over the last `days`.
    pub async fn get_security_events(
        &self,
        session: &Session,
        days: Option<i64>,
    ) -> Result<Vec<LoginRecord>, NeosecError> {
        if !session.user.is_admin() {
            return Err(NeosecError::forbidden("Admin privileges required"));
        }
        let days = days
            .unwrap_or(DEFAULT_SECURITY_EVENT_DAYS)
            .clamp(1, MAX_SECURITY_EVENT_DAYS);
        self.storage
            .get_security_events(Utc::now() - Duration::days(days))
            .await
    }

    pub async fn get_user(&self, user_id: &str) -> Result<Option<User>, NeosecError> {
        self.storage.get_user(user_id).await
    }

    /// Fresh copy of the caller's account.
    pub async fn me(&self, session: &Session) -> Result<User, NeosecError> {
        self.storage
            .get_user(session.user_id())
            .await?
            .ok_or_else(|| NeosecError::UserNotFound(session.user_id().to_string()))
    }

    pub async fn update_profile(&self, session: &Session, changes: ProfileChanges) -> Result<User, NeosecError> {
        let mut user = self.me(session).await?;

        if let Some(new_password) = &changes.new_password {
            let current = changes.current_password.as_deref().ok_or_else(|| {
                NeosecError::invalid_input(
                    "currentPassword",
                    "Missing current password",
                    "Current password is required to change password",
                )
            })?;
            if !verify_password(current, &user.password_hash)? {
                return Err(NeosecError::invalid_input(
                    "currentPassword",
                    "Wrong password",
                    "Current password is incorrect",
                ));
            }
            validate_password("newPassword", new_password)?;
            user.password_hash = hash_password(new_password, self.password_cost)?;
        }

        if let Some(name) = &changes.name {
            validate_string_input("name", name, MAX_NAME_LENGTH)?;
            user.name = Some(name.trim().to_string());
        }
        if let Some(phone) = changes.phone {
            user.phone = Some(phone);
        }
        user.updated_at = Utc::now();
        self.storage.update_user(user.clone()).await?;

        self.log_and_audit(
            None,
            PROFILE_UPDATED,
            json!({ "user_id": user.id, "password_changed": changes.new_password.is_some() }),
            Some(user.id.as_str()),
        )
        .await?;
        Ok(user)
    }

    pub async fn get_app_logs(&self, session: &Session) -> Result<Vec<AppLog>, NeosecError> {
        if !session.user.is_admin() {
            return Err(NeosecError::forbidden("Admin privileges required"));
        }
        self.logging.get_logs().await
    }
}
