use super::NeosecService;
use crate::auth::session::Session;
use crate::constants::{
    MAX_DESCRIPTION_LENGTH, MAX_NAME_LENGTH, MAX_VPN_CONFIG_BYTES, VPN_CONFIG_CLONED, VPN_CONFIG_CREATED,
    VPN_CONFIG_DELETED, VPN_CONFIG_TOGGLED, VPN_CONFIG_UPDATED,
};
use crate::core::errors::NeosecError;
use crate::core::models::vpn::{NewVpnConfig, VpnConfig, VpnConfigUpdate};
use crate::core::validation::{validate_optional_text, validate_string_input};
use crate::infrastructure::cache::Cache;
use crate::infrastructure::logging::LoggingService;
use crate::infrastructure::storage::Storage;
use chrono::Utc;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

/// A config file ready to be served as an attachment.
#[derive(Debug, Clone)]
pub struct VpnDownload {
    pub file_name: String,
    pub content_type: &'static str,
    pub content: String,
}

fn validate_vpn_config(config: &VpnConfig) -> Result<(), NeosecError> {
    validate_string_input("name", &config.name, MAX_NAME_LENGTH)?;
    validate_optional_text("description", config.description.as_deref(), MAX_DESCRIPTION_LENGTH)?;

    if config.config_file_name.trim().is_empty() {
        return Err(NeosecError::invalid_input(
            "configFileName",
            "Missing file name",
            "Config file name is required",
        ));
    }
    if config.config_file_name.chars().any(|c| c.is_control()) {
        return Err(NeosecError::invalid_input(
            "configFileName",
            "Invalid file name",
            "Config file name cannot contain control characters",
        ));
    }
    let extension = config.protocol.file_extension();
    if !config.config_file_name.to_ascii_lowercase().ends_with(extension) {
        return Err(NeosecError::invalid_input(
            "configFileName",
            "Wrong file type",
            format!("{:?} config files must end with {}", config.protocol, extension),
        ));
    }

    if config.config_file_content.trim().is_empty() {
        return Err(NeosecError::invalid_input(
            "configFileContent",
            "Missing content",
            "Config file content is required",
        ));
    }
    if config.config_file_content.len() > MAX_VPN_CONFIG_BYTES {
        return Err(NeosecError::invalid_input(
            "configFileContent",
            "File too large",
            format!("Config file must be at most {} bytes", MAX_VPN_CONFIG_BYTES),
        ));
    }
    Ok(())
}

/// First free name of the form `"<name> (Copy)"`, `"<name> (Copy 2)"`, ...
fn clone_name(name: &str, taken: &[String]) -> String {
    let mut candidate = format!("{} (Copy)", name);
    let mut n = 2;
    while taken.iter().any(|t| t == &candidate) {
        candidate = format!("{} (Copy {})", name, n);
        n += 1;
    }
    candidate
}

impl<L: LoggingService, S: Storage, C: Cache> NeosecService<L, S, C> {
    pub async fn list_vpn_configs(&self, session: &Session) -> Result<Vec<VpnConfig>, NeosecError> {
        self.storage.get_vpn_configs(session.user_id()).await
    }

    pub async fn get_vpn_config(&self, session: &Session, config_id: &str) -> Result<VpnConfig, NeosecError> {
        self.owned_vpn_config(session.user_id(), config_id).await
    }

    pub async fn create_vpn_config(&self, session: &Session, new_config: NewVpnConfig) -> Result<VpnConfig, NeosecError> {
        let now = Utc::now();
        let config = VpnConfig {
            id: Uuid::new_v4().to_string(),
            user_id: session.user_id().to_string(),
            name: new_config.name.trim().to_string(),
            protocol: new_config.protocol,
            description: new_config.description,
            config_file_name: new_config.config_file_name.trim().to_string(),
            config_file_content: new_config.config_file_content,
            is_active: false,
            created_at: now,
            updated_at: now,
        };
        validate_vpn_config(&config)?;
        self.ensure_vpn_name_free(&config.user_id, &config.name).await?;
        self.storage.save_vpn_config(config.clone()).await?;

        self.log_and_audit(
            None,
            VPN_CONFIG_CREATED,
            json!({ "config_id": config.id, "name": config.name }),
            Some(session.user_id()),
        )
        .await?;
        Ok(config)
    }

    pub async fn update_vpn_config(
        &self,
        session: &Session,
        config_id: &str,
        update: VpnConfigUpdate,
    ) -> Result<VpnConfig, NeosecError> {
        let config = self.apply_vpn_update(session.user_id(), config_id, &update).await?;
        self.log_and_audit(
            None,
            VPN_CONFIG_UPDATED,
            json!({ "config_id": config.id, "is_active": config.is_active }),
            Some(session.user_id()),
        )
        .await?;
        Ok(config)
    }

    pub async fn delete_vpn_config(&self, session: &Session, config_id: &str) -> Result<(), NeosecError> {
        self.owned_vpn_config(session.user_id(), config_id).await?;
        self.storage
            .delete_vpn_config(config_id)
            .await?
            .ok_or_else(|| NeosecError::VpnConfigNotFound(config_id.to_string()))?;

        self.log_and_audit(None, VPN_CONFIG_DELETED, json!({ "config_id": config_id }), Some(session.user_id()))
            .await?;
        Ok(())
    }

    /// Flips `is_active`. Turning a config on turns every other config of
    /// the caller off.
    pub async fn toggle_vpn_config(&self, session: &Session, config_id: &str) -> Result<VpnConfig, NeosecError> {
        let current = self.owned_vpn_config(session.user_id(), config_id).await?;
        let now = Utc::now();
        let config = if current.is_active {
            let off = VpnConfigUpdate {
                is_active: Some(false),
                ..Default::default()
            };
            self.storage
                .update_vpn_config(session.user_id(), config_id, off, validate_vpn_config, now)
                .await?
        } else {
            self.storage.activate_vpn_config(session.user_id(), config_id, now).await?
        };

        self.log_and_audit(
            None,
            VPN_CONFIG_TOGGLED,
            json!({ "config_id": config_id, "is_active": config.is_active }),
            Some(session.user_id()),
        )
        .await?;
        info!(config_id, active = config.is_active, "vpn config toggled");
        Ok(config)
    }

    /// Copies a config under the first free `"<name> (Copy N)"` name. The
    /// copy starts inactive.
    pub async fn clone_vpn_config(&self, session: &Session, config_id: &str) -> Result<VpnConfig, NeosecError> {
        let source = self.owned_vpn_config(session.user_id(), config_id).await?;
        let taken: Vec<String> = self
            .storage
            .get_vpn_configs(session.user_id())
            .await?
            .into_iter()
            .map(|c| c.name)
            .collect();

        let now = Utc::now();
        let copy = VpnConfig {
            id: Uuid::new_v4().to_string(),
            name: clone_name(&source.name, &taken),
            is_active: false,
            created_at: now,
            updated_at: now,
            ..source
        };
        self.storage.save_vpn_config(copy.clone()).await?;

        self.log_and_audit(
            None,
            VPN_CONFIG_CLONED,
            json!({ "config_id": config_id, "clone_id": copy.id, "name": copy.name }),
            Some(session.user_id()),
        )
        .await?;
        Ok(copy)
    }

    pub async fn download_vpn_config(&self, session: &Session, config_id: &str) -> Result<VpnDownload, NeosecError> {
        let config = self.owned_vpn_config(session.user_id(), config_id).await?;
        Ok(VpnDownload {
            content_type: config.protocol.content_type(),
            file_name: config.config_file_name,
            content: config.config_file_content,
        })
    }

    /// Config `config_id` if it belongs to `owner_id`; anything else reads
    /// as not found.
    pub(super) async fn owned_vpn_config(&self, owner_id: &str, config_id: &str) -> Result<VpnConfig, NeosecError> {
        self.storage
            .get_vpn_config(config_id)
            .await?
            .filter(|c| c.user_id == owner_id)
            .ok_or_else(|| NeosecError::VpnConfigNotFound(config_id.to_string()))
    }

    /// Validates and stores a partial update of `owner_id`'s config in one
    /// storage step, so `is_active` is never written back from a stale read.
    pub(super) async fn apply_vpn_update(
        &self,
        owner_id: &str,
        config_id: &str,
        update: &VpnConfigUpdate,
    ) -> Result<VpnConfig, NeosecError> {
        self.storage
            .update_vpn_config(owner_id, config_id, update.clone(), validate_vpn_config, Utc::now())
            .await
    }

    async fn ensure_vpn_name_free(&self, owner_id: &str, name: &str) -> Result<(), NeosecError> {
        let taken = self
            .storage
            .get_vpn_configs(owner_id)
            .await?
            .iter()
            .any(|c| c.name == name);
        if taken {
            return Err(NeosecError::VpnConfigNameTaken(name.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clone_name_skips_taken_copies() {
        let taken = vec!["Office".to_string()];
        assert_eq!(clone_name("Office", &taken), "Office (Copy)");

        let taken = vec![
            "Office".to_string(),
            "Office (Copy)".to_string(),
            "Office (Copy 2)".to_string(),
        ];
        assert_eq!(clone_name("Office", &taken), "Office (Copy 3)");
    }
}
