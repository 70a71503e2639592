use super::user::SubscriptionTier;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Pending,
    Active,
    Canceled,
    Expired,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: String,
    pub user_id: String,
    pub tier: SubscriptionTier,
    pub status: SubscriptionStatus,
    #[schema(value_type = Option<String>, example = "2024-06-01T12:34:56Z")]
    pub start_date: Option<DateTime<Utc>>,
    #[schema(value_type = Option<String>, example = "2024-07-01T12:34:56Z")]
    pub end_date: Option<DateTime<Utc>>,
    pub auto_renew: bool,
    pub payment_method: Option<String>,
    pub transaction_id: Option<String>,
}

impl Subscription {
    /// What users without a stored subscription are shown.
    pub fn free(user_id: &str) -> Self {
        Subscription {
            id: String::new(),
            user_id: user_id.to_string(),
            tier: SubscriptionTier::Free,
            status: SubscriptionStatus::Active,
            start_date: None,
            end_date: None,
            auto_renew: false,
            payment_method: None,
            transaction_id: None,
        }
    }
}
