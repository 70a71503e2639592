use super::NeosecService;
use crate::auth::session::Session;
use crate::constants::{INVITATION_ACCEPTED, INVITATION_REJECTED, INVITATION_TTL_DAYS, MEMBER_INVITED};
use crate::core::errors::NeosecError;
use crate::core::models::{
    invitation::{Invitation, InvitationDetails, InvitationStatus},
    membership::{MEMBER_ROLE_LABEL, Membership},
};
use crate::core::validation::normalize_email;
use crate::infrastructure::cache::Cache;
use crate::infrastructure::logging::LoggingService;
use crate::infrastructure::storage::Storage;
use chrono::{Duration, Utc};
use futures::future::try_join_all;
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

impl<L: LoggingService, S: Storage, C: Cache> NeosecService<L, S, C> {
    /// Invites `email` into a group the caller leads. Emails without an
    /// account yet get an external invite that shows up once they register.
    pub async fn invite_member(&self, session: &Session, group_id: &str, email: &str) -> Result<Invitation, NeosecError> {
        let email = normalize_email(email)?;
        let group = self.validate_group_and_leader(group_id, &session.user).await?;

        if email == session.user.email {
            return Err(NeosecError::CannotInviteSelf);
        }
        if !group.is_active {
            return Err(NeosecError::GroupInactive(group_id.to_string()));
        }

        let invitee = self.storage.get_user_by_email(&email).await?;
        if let Some(invitee) = &invitee {
            if self.storage.get_membership_for(group_id, &invitee.id).await?.is_some() {
                return Err(NeosecError::AlreadyGroupMember(invitee.id.clone()));
            }
        }

        let now = Utc::now();
        let already_pending = self
            .storage
            .get_group_invitations(group_id)
            .await?
            .iter()
            .any(|i| i.invitee_email == email && i.is_live_at(now));
        if already_pending {
            return Err(NeosecError::InvitationAlreadyPending(email));
        }

        let member_count = self.storage.count_group_members(group_id).await?;
        if !group.has_capacity(member_count) {
            warn!(group_id, member_count, "invite refused, group is full");
            return Err(NeosecError::GroupFull(group_id.to_string()));
        }

        let invitation = Invitation::new(
            Uuid::new_v4().to_string(),
            group_id,
            session.user_id(),
            &email,
            invitee.map(|u| u.id),
            now,
            Duration::days(INVITATION_TTL_DAYS),
        );
        self.storage.save_invitation(invitation.clone()).await?;

        self.log_and_audit(
            Some(group_id),
            MEMBER_INVITED,
            json!({
                "group_id": group_id,
                "invitation_id": invitation.id,
                "invitee_email": email,
                "external": invitation.invitee_id.is_none(),
            }),
            Some(session.user_id()),
        )
        .await?;
        info!(group_id, invitation_id = %invitation.id, "member invited");
        Ok(invitation)
    }

    /// Pending invitations addressed to the caller, newest first, with the
    /// status they have right now.
    pub async fn list_my_invitations(&self, session: &Session) -> Result<Vec<InvitationDetails>, NeosecError> {
        let now = Utc::now();
        let invitations = self
            .storage
            .get_pending_invitations_for(session.user_id(), &session.user.email)
            .await?;

        let details = invitations.into_iter().map(|invitation| async move {
            let group_name = self
                .storage
                .get_group(&invitation.group_id)
                .await?
                .map(|g| g.name)
                .unwrap_or_default();
            let inviter_email = self.storage.get_user(&invitation.inviter_id).await?.map(|u| u.email);
            Ok::<_, NeosecError>(InvitationDetails {
                status: invitation.status_at(now),
                group_name,
                inviter_email,
                invitation,
            })
        });
        try_join_all(details).await
    }

    pub async fn accept_invitation(&self, session: &Session, invitation_id: &str) -> Result<Membership, NeosecError> {
        let invitation = self.invitation_for_caller(session, invitation_id).await?;
        let now = Utc::now();

        if invitation.is_expired_at(now) {
            warn!(invitation_id, "accept refused, invitation expired");
            return Err(NeosecError::InvitationExpired(invitation_id.to_string()));
        }
        if invitation.status != InvitationStatus::Pending {
            return Err(NeosecError::InvitationAlreadyResolved(invitation_id.to_string()));
        }

        let group = self.load_group(&invitation.group_id).await?;
        if !group.is_active {
            return Err(NeosecError::GroupInactive(group.id));
        }

        let membership = Membership {
            id: Uuid::new_v4().to_string(),
            group_id: group.id.clone(),
            user_id: session.user_id().to_string(),
            role: MEMBER_ROLE_LABEL.to_string(),
            invited_by: invitation.inviter_id.clone(),
            joined_at: now,
            can_leader_manage_configs: true,
        };
        let membership = self
            .storage
            .accept_invitation(invitation_id, membership, now)
            .await
            .inspect_err(|e| {
                if matches!(e, NeosecError::GroupFull(_)) {
                    warn!(invitation_id, group_id = %group.id, "accept refused, group is full");
                }
            })?;
        self.cache.invalidate_group_members(&group.id).await?;

        self.log_and_audit(
            Some(&group.id),
            INVITATION_ACCEPTED,
            json!({ "group_id": group.id, "invitation_id": invitation_id, "membership_id": membership.id }),
            Some(session.user_id()),
        )
        .await?;
        info!(invitation_id, group_id = %group.id, user_id = %session.user_id(), "invitation accepted");
        Ok(membership)
    }

    /// Declines an invitation. Declining one that is already resolved is a
    /// no-op.
    pub async fn reject_invitation(&self, session: &Session, invitation_id: &str) -> Result<Invitation, NeosecError> {
        let mut invitation = self.invitation_for_caller(session, invitation_id).await?;
        let now = Utc::now();

        if invitation.status.is_terminal() {
            return Ok(invitation);
        }
        if invitation.is_expired_at(now) {
            return Err(NeosecError::InvitationExpired(invitation_id.to_string()));
        }

        invitation.status = InvitationStatus::Rejected;
        invitation.invitee_id = Some(session.user_id().to_string());
        invitation.responded_at = Some(now);
        self.storage.save_invitation(invitation.clone()).await?;

        self.log_and_audit(
            Some(&invitation.group_id),
            INVITATION_REJECTED,
            json!({ "group_id": invitation.group_id, "invitation_id": invitation_id }),
            Some(session.user_id()),
        )
        .await?;
        Ok(invitation)
    }

    async fn invitation_for_caller(&self, session: &Session, invitation_id: &str) -> Result<Invitation, NeosecError> {
        let invitation = self
            .storage
            .get_invitation(invitation_id)
            .await?
            .ok_or_else(|| NeosecError::InvitationNotFound(invitation_id.to_string()))?;
        if !invitation.is_addressed_to(session.user_id(), &session.user.email) {
            return Err(NeosecError::forbidden("This invitation is not for you"));
        }
        Ok(invitation)
    }
}
