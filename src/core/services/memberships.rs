use super::NeosecService;
use crate::auth::session::Session;
use crate::constants::MEMBER_LEFT;
use crate::core::errors::NeosecError;
use crate::core::models::group::MembershipDetails;
use crate::infrastructure::cache::Cache;
use crate::infrastructure::logging::LoggingService;
use crate::infrastructure::storage::Storage;
use futures::future::try_join_all;
use serde_json::json;
use tracing::info;

impl<L: LoggingService, S: Storage, C: Cache> NeosecService<L, S, C> {
    /// Groups the caller belongs to, most recently joined first.
    pub async fn get_my_memberships(&self, session: &Session) -> Result<Vec<MembershipDetails>, NeosecError> {
        let memberships = self.storage.get_user_memberships(session.user_id()).await?;
        let details = memberships.into_iter().map(|membership| async move {
            let group = self.load_group(&membership.group_id).await?;
            let member_count = self.storage.count_group_members(&group.id).await?;
            Ok::<_, NeosecError>(MembershipDetails {
                membership,
                group,
                member_count,
            })
        });
        try_join_all(details).await
    }

    pub async fn leave_group(&self, session: &Session, membership_id: &str) -> Result<(), NeosecError> {
        let membership = self
            .storage
            .get_membership(membership_id)
            .await?
            .ok_or_else(|| NeosecError::MembershipNotFound(membership_id.to_string()))?;
        if membership.user_id != session.user_id() {
            return Err(NeosecError::forbidden("You can only leave your own memberships"));
        }

        // A concurrent leave may have won the race.
        self.storage
            .delete_membership(membership_id)
            .await?
            .ok_or_else(|| NeosecError::MembershipNotFound(membership_id.to_string()))?;
        self.cache.invalidate_group_members(&membership.group_id).await?;

        self.log_and_audit(
            Some(&membership.group_id),
            MEMBER_LEFT,
            json!({ "group_id": membership.group_id, "membership_id": membership_id }),
            Some(session.user_id()),
        )
        .await?;
        info!(membership_id, group_id = %membership.group_id, "member left group");
        Ok(())
    }
}
