use super::NeosecService;
use crate::auth::session::Session;
use crate::constants::{SUBSCRIPTION_CANCELED, SUBSCRIPTION_PERIOD_DAYS, SUBSCRIPTION_UPGRADED};
use crate::core::errors::NeosecError;
use crate::core::models::{
    subscription::{Subscription, SubscriptionStatus},
    user::{AccountType, SubscriptionTier, User},
};
use crate::infrastructure::cache::Cache;
use crate::infrastructure::logging::LoggingService;
use crate::infrastructure::storage::Storage;
use chrono::{Duration, Utc};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

impl<L: LoggingService, S: Storage, C: Cache> NeosecService<L, S, C> {
    pub async fn get_my_subscription(&self, session: &Session) -> Result<Subscription, NeosecError> {
        Ok(self
            .storage
            .get_subscription(session.user_id())
            .await?
            .unwrap_or_else(|| Subscription::free(session.user_id())))
    }

    /// Billing is mocked: the upgrade is granted immediately and the caller
    /// becomes a paid leader on `tier`.
    pub async fn upgrade_to_leader(
        &self,
        session: &Session,
        tier: SubscriptionTier,
    ) -> Result<(Subscription, User), NeosecError> {
        if !tier.is_paid() {
            return Err(NeosecError::invalid_input(
                "tier",
                "Invalid tier",
                "Invalid subscription tier. Must be: basic, pro, or enterprise",
            ));
        }

        let now = Utc::now();
        let mut user = self.me(session).await?;
        user.account_type = AccountType::Leader;
        user.subscription_tier = tier;
        user.is_paid = true;
        user.updated_at = now;
        self.storage.update_user(user.clone()).await?;

        let subscription = match self.storage.get_subscription(&user.id).await? {
            Some(mut existing) => {
                existing.tier = tier;
                existing.status = SubscriptionStatus::Active;
                existing.start_date = Some(now);
                existing.end_date = Some(now + Duration::days(SUBSCRIPTION_PERIOD_DAYS));
                existing.auto_renew = true;
                existing
            }
            None => Subscription {
                id: Uuid::new_v4().to_string(),
                user_id: user.id.clone(),
                tier,
                status: SubscriptionStatus::Active,
                start_date: Some(now),
                end_date: Some(now + Duration::days(SUBSCRIPTION_PERIOD_DAYS)),
                auto_renew: true,
                payment_method: Some("manual".to_string()),
                transaction_id: Some(format!("manual_{}", Uuid::new_v4().simple())),
            },
        };
        self.storage.save_subscription(subscription.clone()).await?;

        self.log_and_audit(
            None,
            SUBSCRIPTION_UPGRADED,
            json!({ "user_id": user.id, "tier": tier.to_string() }),
            Some(user.id.as_str()),
        )
        .await?;
        info!(user_id = %user.id, %tier, "user upgraded to leader");
        Ok((subscription, user))
    }

    /// Reverts the caller to a free member. Groups they lead are kept but
    /// stay read-only for them until they upgrade again.
    pub async fn cancel_subscription(&self, session: &Session) -> Result<Subscription, NeosecError> {
        let now = Utc::now();
        let mut subscription = self
            .storage
            .get_subscription(session.user_id())
            .await?
            .filter(|s| s.status == SubscriptionStatus::Active)
            .ok_or_else(|| NeosecError::invalid_input("subscription", "No subscription", "No active subscription to cancel"))?;
        subscription.status = SubscriptionStatus::Canceled;
        subscription.auto_renew = false;
        subscription.end_date = Some(now);
        self.storage.save_subscription(subscription.clone()).await?;

        let mut user = self.me(session).await?;
        user.account_type = AccountType::Member;
        user.subscription_tier = SubscriptionTier::Free;
        user.is_paid = false;
        user.updated_at = now;
        self.storage.update_user(user.clone()).await?;

        self.log_and_audit(
            None,
            SUBSCRIPTION_CANCELED,
            json!({ "user_id": user.id, "tier": subscription.tier.to_string() }),
            Some(user.id.as_str()),
        )
        .await?;
        Ok(subscription)
    }
}
