use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RuleAction {
    Allow,
    Deny,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RuleDirection {
    Inbound,
    Outbound,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FirewallRule {
    pub id: String,
    pub user_id: String,
    pub action: RuleAction,
    pub direction: RuleDirection,
    pub ip_address: Option<String>,
    pub port: Option<u32>,
    pub description: Option<String>,
    #[schema(value_type = String, example = "2024-06-01T12:34:56Z")]
    pub created_at: DateTime<Utc>,
    #[schema(value_type = String, example = "2024-06-01T12:34:56Z")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewFirewallRule {
    pub action: RuleAction,
    pub direction: RuleDirection,
    pub ip_address: Option<String>,
    pub port: Option<u32>,
    pub description: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FirewallRuleUpdate {
    pub action: Option<RuleAction>,
    pub direction: Option<RuleDirection>,
    pub ip_address: Option<String>,
    pub port: Option<u32>,
    pub description: Option<String>,
}

impl FirewallRule {
    pub fn apply(&mut self, update: &FirewallRuleUpdate, now: DateTime<Utc>) {
        if let Some(action) = update.action {
            self.action = action;
        }
        if let Some(direction) = update.direction {
            self.direction = direction;
        }
        if let Some(ip) = &update.ip_address {
            self.ip_address = Some(ip.trim().to_string());
        }
        if let Some(port) = update.port {
            self.port = Some(port);
        }
        if let Some(description) = &update.description {
            self.description = Some(description.clone());
        }
        self.updated_at = now;
    }
}
