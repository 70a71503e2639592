use super::vpn::VpnProtocol;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq, Default)]
pub enum ProfileType {
    #[serde(rename = "Work Mode")]
    WorkMode,
    #[serde(rename = "Public WiFi Mode")]
    PublicWifiMode,
    #[serde(rename = "Home Mode")]
    HomeMode,
    #[default]
    Custom,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum DefaultFirewallAction {
    Allow,
    #[default]
    Deny,
}

/// A named bundle of VPN and firewall settings a user switches between.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,
    pub profile_type: ProfileType,
    pub vpn_enabled: bool,
    pub vpn_protocol: Option<VpnProtocol>,
    pub firewall_enabled: bool,
    pub default_firewall_action: DefaultFirewallAction,
    pub is_active: bool,
    #[schema(value_type = String, example = "2024-06-01T12:34:56Z")]
    pub created_at: DateTime<Utc>,
    #[schema(value_type = String, example = "2024-06-01T12:34:56Z")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewProfile {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub profile_type: ProfileType,
    #[serde(default)]
    pub vpn_enabled: bool,
    pub vpn_protocol: Option<VpnProtocol>,
    #[serde(default = "default_true")]
    pub firewall_enabled: bool,
    #[serde(default)]
    pub default_firewall_action: DefaultFirewallAction,
}

fn default_true() -> bool {
    true
}

#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub profile_type: Option<ProfileType>,
    pub vpn_enabled: Option<bool>,
    pub vpn_protocol: Option<VpnProtocol>,
    pub firewall_enabled: Option<bool>,
    pub default_firewall_action: Option<DefaultFirewallAction>,
    pub is_active: Option<bool>,
}

impl Profile {
    pub fn apply(&mut self, update: &ProfileUpdate, now: DateTime<Utc>) {
        if let Some(name) = &update.name {
            self.name = name.trim().to_string();
        }
        if let Some(description) = &update.description {
            self.description = Some(description.clone());
        }
        if let Some(profile_type) = update.profile_type {
            self.profile_type = profile_type;
        }
        if let Some(vpn_enabled) = update.vpn_enabled {
            self.vpn_enabled = vpn_enabled;
        }
        if let Some(protocol) = update.vpn_protocol {
            self.vpn_protocol = Some(protocol);
        }
        if let Some(firewall_enabled) = update.firewall_enabled {
            self.firewall_enabled = firewall_enabled;
        }
        if let Some(action) = update.default_firewall_action {
            self.default_firewall_action = action;
        }
        if let Some(is_active) = update.is_active {
            self.is_active = is_active;
        }
        self.updated_at = now;
    }
}
