use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Stored invitation state. `Expired` is never persisted; it is derived from
/// `expires_at` by [`Invitation::status_at`].
#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Rejected,
    Expired,
}

impl InvitationStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, InvitationStatus::Pending)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Invitation {
    pub id: String,
    pub group_id: String,
    pub inviter_id: String,
    pub invitee_email: String,
    pub invitee_id: Option<String>,
    pub status: InvitationStatus,
    #[schema(value_type = String, example = "2024-06-01T12:34:56Z")]
    pub created_at: DateTime<Utc>,
    #[schema(value_type = String, example = "2024-06-08T12:34:56Z")]
    pub expires_at: DateTime<Utc>,
    #[schema(value_type = Option<String>, example = "2024-06-02T12:34:56Z")]
    pub responded_at: Option<DateTime<Utc>>,
}

impl Invitation {
    pub fn new(
        id: String,
        group_id: &str,
        inviter_id: &str,
        invitee_email: &str,
        invitee_id: Option<String>,
        created_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        Invitation {
            id,
            group_id: group_id.to_string(),
            inviter_id: inviter_id.to_string(),
            invitee_email: invitee_email.to_string(),
            invitee_id,
            status: InvitationStatus::Pending,
            created_at,
            expires_at: created_at + ttl,
            responded_at: None,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Effective status at `now`: a stored pending invitation past its expiry
    /// reads as expired.
    pub fn status_at(&self, now: DateTime<Utc>) -> InvitationStatus {
        match self.status {
            InvitationStatus::Pending if self.is_expired_at(now) => InvitationStatus::Expired,
            status => status,
        }
    }

    /// Pending and not yet expired.
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        self.status_at(now) == InvitationStatus::Pending
    }

    pub fn is_addressed_to(&self, user_id: &str, email: &str) -> bool {
        self.invitee_id.as_deref() == Some(user_id) || self.invitee_email.eq_ignore_ascii_case(email)
    }
}

/// Invitation as listed to its invitee.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvitationDetails {
    pub invitation: Invitation,
    pub group_name: String,
    pub inviter_email: Option<String>,
    pub status: InvitationStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(now: DateTime<Utc>) -> Invitation {
        Invitation::new(
            "inv".to_string(),
            "group",
            "leader",
            "a@x.com",
            None,
            now,
            Duration::days(7),
        )
    }

    #[test]
    fn pending_reads_as_expired_after_ttl() {
        let now = Utc::now();
        let invitation = sample(now);
        assert_eq!(invitation.status_at(now), InvitationStatus::Pending);
        assert_eq!(invitation.status_at(now + Duration::days(7)), InvitationStatus::Pending);
        assert_eq!(
            invitation.status_at(now + Duration::days(7) + Duration::seconds(1)),
            InvitationStatus::Expired
        );
    }

    #[test]
    fn resolved_status_is_not_rewritten_by_expiry() {
        let now = Utc::now();
        let mut invitation = sample(now);
        invitation.status = InvitationStatus::Rejected;
        assert_eq!(invitation.status_at(now + Duration::days(30)), InvitationStatus::Rejected);
        assert!(invitation.status.is_terminal());
    }

    #[test]
    fn addressed_by_email_ignores_case() {
        let invitation = sample(Utc::now());
        assert!(invitation.is_addressed_to("someone", "A@X.com"));
        assert!(!invitation.is_addressed_to("someone", "b@x.com"));
    }
}
