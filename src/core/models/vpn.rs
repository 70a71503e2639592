use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq, Default)]
pub enum VpnProtocol {
    #[default]
    OpenVPN,
    WireGuard,
}

impl VpnProtocol {
    /// File extension a config for this protocol is expected to carry.
    pub fn file_extension(&self) -> &'static str {
        match self {
            VpnProtocol::OpenVPN => ".ovpn",
            VpnProtocol::WireGuard => ".conf",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            VpnProtocol::OpenVPN => "application/x-openvpn-profile",
            VpnProtocol::WireGuard => "text/plain; charset=utf-8",
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VpnConfig {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub protocol: VpnProtocol,
    pub description: Option<String>,
    pub config_file_name: String,
    pub config_file_content: String,
    pub is_active: bool,
    #[schema(value_type = String, example = "2024-06-01T12:34:56Z")]
    pub created_at: DateTime<Utc>,
    #[schema(value_type = String, example = "2024-06-01T12:34:56Z")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewVpnConfig {
    pub name: String,
    #[serde(default)]
    pub protocol: VpnProtocol,
    pub description: Option<String>,
    pub config_file_name: String,
    pub config_file_content: String,
}

/// Partial update; absent fields keep their current value.
#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VpnConfigUpdate {
    pub name: Option<String>,
    pub protocol: Option<VpnProtocol>,
    pub description: Option<String>,
    pub config_file_name: Option<String>,
    pub config_file_content: Option<String>,
    pub is_active: Option<bool>,
}

impl VpnConfig {
    /// Applies everything except `is_active`, which goes through the
    /// exclusive activation path.
    pub fn apply(&mut self, update: &VpnConfigUpdate, now: DateTime<Utc>) {
        if let Some(name) = &update.name {
            self.name = name.trim().to_string();
        }
        if let Some(protocol) = update.protocol {
            self.protocol = protocol;
        }
        if let Some(description) = &update.description {
            self.description = Some(description.clone());
        }
        if let Some(file_name) = &update.config_file_name {
            self.config_file_name = file_name.trim().to_string();
        }
        if let Some(content) = &update.config_file_content {
            self.config_file_content = content.clone();
        }
        self.updated_at = now;
    }
}
