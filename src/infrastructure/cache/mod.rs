pub mod cache_keys;
pub mod in_memory;

use crate::core::errors::NeosecError;
use crate::core::models::membership::GroupMemberView;
use async_trait::async_trait;

#[async_trait]
pub trait Cache: Send + Sync {
    async fn get_group_members(&self, group_id: &str) -> Result<Option<Vec<GroupMemberView>>, NeosecError>;
    async fn save_group_members(
        &self,
        group_id: &str,
        members: &[GroupMemberView],
        ttl: std::time::Duration,
    ) -> Result<(), NeosecError>;
    async fn invalidate_group_members(&self, group_id: &str) -> Result<(), NeosecError>;
}
