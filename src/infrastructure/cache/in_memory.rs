use crate::core::errors::NeosecError;
use crate::core::models::membership::GroupMemberView;
use crate::infrastructure::cache::{Cache, cache_keys::group_members_key};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

type Entry = (Vec<GroupMemberView>, DateTime<Utc>);

#[derive(Clone, Default)]
pub struct InMemoryCache {
    cache: Arc<RwLock<HashMap<String, Entry>>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Cache for InMemoryCache {
    async fn get_group_members(&self, group_id: &str) -> Result<Option<Vec<GroupMemberView>>, NeosecError> {
        let cache = self.cache.read().await;
        let now = Utc::now();
        Ok(cache
            .get(&group_members_key(group_id))
            .filter(|(_, expiry)| *expiry > now)
            .map(|(members, _)| members.clone()))
    }

    async fn save_group_members(
        &self,
        group_id: &str,
        members: &[GroupMemberView],
        ttl: std::time::Duration,
    ) -> Result<(), NeosecError> {
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| NeosecError::CacheError(format!("Failed to convert TTL: {}", e)))?;
        let mut cache = self.cache.write().await;
        let now = Utc::now();
        cache.retain(|_, (_, expiry)| *expiry > now);
        cache.insert(group_members_key(group_id), (members.to_vec(), now + ttl));
        Ok(())
    }

    async fn invalidate_group_members(&self, group_id: &str) -> Result<(), NeosecError> {
        let mut cache = self.cache.write().await;
        cache.remove(&group_members_key(group_id));
        Ok(())
    }
}
