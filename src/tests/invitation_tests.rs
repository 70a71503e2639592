use super::{
    TestService, create_group, create_test_service, create_test_service_with_storage, make_leader, register,
    with_admin,
};
use crate::auth::session::Session;
use crate::core::errors::NeosecError;
use crate::core::models::invitation::InvitationStatus;
use crate::core::models::user::SubscriptionTier;
use crate::core::services::GroupChanges;
use crate::infrastructure::storage::Storage;
use chrono::{Duration, Utc};
use std::sync::Arc;

async fn leader_with_group(service: &TestService, max_members: usize) -> (Session, String) {
    with_admin(service).await;
    let leader = register(service, "lead@neosec.io").await;
    let leader = make_leader(service, &leader, SubscriptionTier::Pro).await;
    let group_id = create_group(service, &leader, "Blue Team", max_members).await;
    (leader, group_id)
}

#[tokio::test]
async fn invitation_expires_after_seven_days() {
    let service = create_test_service();
    let (leader, group_id) = leader_with_group(&service, 5).await;
    let member = register(&service, "member@neosec.io").await;

    let invitation = service
        .invite_member(&leader, &group_id, "member@neosec.io")
        .await
        .unwrap();
    assert_eq!(invitation.status, InvitationStatus::Pending);
    assert_eq!(invitation.invitee_id.as_deref(), Some(member.user_id()));
    assert_eq!(invitation.expires_at - invitation.created_at, Duration::days(7));
}

#[tokio::test]
async fn invite_checks_run_in_order() {
    let service = create_test_service();
    let (leader, group_id) = leader_with_group(&service, 5).await;
    let member = register(&service, "member@neosec.io").await;

    assert!(matches!(
        service.invite_member(&leader, &group_id, "").await,
        Err(NeosecError::MissingEmail)
    ));
    assert!(matches!(
        service.invite_member(&leader, &group_id, "not-an-email").await,
        Err(NeosecError::InvalidEmail(_))
    ));
    assert!(matches!(
        service.invite_member(&leader, "missing-group", "member@neosec.io").await,
        Err(NeosecError::GroupNotFound(_))
    ));
    assert!(matches!(
        service.invite_member(&leader, &group_id, "LEAD@neosec.io").await,
        Err(NeosecError::CannotInviteSelf)
    ));

    service
        .invite_member(&leader, &group_id, &member.user.email)
        .await
        .unwrap();
    assert!(matches!(
        service.invite_member(&leader, &group_id, "Member@neosec.io").await,
        Err(NeosecError::InvitationAlreadyPending(_))
    ));

    let invitations = service.list_my_invitations(&member).await.unwrap();
    service
        .accept_invitation(&member, &invitations[0].invitation.id)
        .await
        .unwrap();
    assert!(matches!(
        service.invite_member(&leader, &group_id, &member.user.email).await,
        Err(NeosecError::AlreadyGroupMember(_))
    ));

    service
        .update_group(
            &leader,
            &group_id,
            GroupChanges {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(matches!(
        service.invite_member(&leader, &group_id, "late@neosec.io").await,
        Err(NeosecError::GroupInactive(_))
    ));
}

#[tokio::test]
async fn accept_creates_exactly_one_membership() {
    let service = create_test_service();
    let (leader, group_id) = leader_with_group(&service, 5).await;
    let member = register(&service, "member@neosec.io").await;
    let invitation = service
        .invite_member(&leader, &group_id, &member.user.email)
        .await
        .unwrap();

    let membership = service.accept_invitation(&member, &invitation.id).await.unwrap();
    assert_eq!(membership.group_id, group_id);
    assert_eq!(membership.invited_by, leader.user.id);
    assert!(membership.can_leader_manage_configs);

    assert!(matches!(
        service.accept_invitation(&member, &invitation.id).await,
        Err(NeosecError::InvitationAlreadyResolved(_))
    ));
    assert_eq!(service.get_my_memberships(&member).await.unwrap().len(), 1);
    assert!(service.list_my_invitations(&member).await.unwrap().is_empty());
}

#[tokio::test]
async fn only_the_invitee_may_respond() {
    let service = create_test_service();
    let (leader, group_id) = leader_with_group(&service, 5).await;
    register(&service, "member@neosec.io").await;
    let stranger = register(&service, "stranger@neosec.io").await;
    let invitation = service
        .invite_member(&leader, &group_id, "member@neosec.io")
        .await
        .unwrap();

    assert!(matches!(
        service.accept_invitation(&stranger, &invitation.id).await,
        Err(NeosecError::Forbidden(_))
    ));
    assert!(matches!(
        service.reject_invitation(&stranger, &invitation.id).await,
        Err(NeosecError::Forbidden(_))
    ));
    assert!(matches!(
        service.accept_invitation(&stranger, "no-such-invitation").await,
        Err(NeosecError::InvitationNotFound(_))
    ));
}

#[tokio::test]
async fn expired_invitation_cannot_be_accepted() {
    let (service, storage) = create_test_service_with_storage();
    let (leader, group_id) = leader_with_group(&service, 5).await;
    let member = register(&service, "member@neosec.io").await;
    let invitation = service
        .invite_member(&leader, &group_id, &member.user.email)
        .await
        .unwrap();

    let mut aged = storage.get_invitation(&invitation.id).await.unwrap().unwrap();
    aged.created_at = Utc::now() - Duration::days(8);
    aged.expires_at = Utc::now() - Duration::seconds(1);
    storage.save_invitation(aged).await.unwrap();

    let listed = service.list_my_invitations(&member).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].status, InvitationStatus::Expired);
    assert_eq!(listed[0].group_name, "Blue Team");
    assert_eq!(listed[0].inviter_email.as_deref(), Some("lead@neosec.io"));

    assert!(matches!(
        service.accept_invitation(&member, &invitation.id).await,
        Err(NeosecError::InvitationExpired(_))
    ));
    assert!(matches!(
        service.reject_invitation(&member, &invitation.id).await,
        Err(NeosecError::InvitationExpired(_))
    ));
    assert!(service.get_my_memberships(&member).await.unwrap().is_empty());

    // An expired invite no longer blocks a fresh one.
    let fresh = service
        .invite_member(&leader, &group_id, &member.user.email)
        .await
        .unwrap();
    assert!(service.accept_invitation(&member, &fresh.id).await.is_ok());
}

#[tokio::test]
async fn reject_is_idempotent() {
    let service = create_test_service();
    let (leader, group_id) = leader_with_group(&service, 5).await;
    let member = register(&service, "member@neosec.io").await;
    let invitation = service
        .invite_member(&leader, &group_id, &member.user.email)
        .await
        .unwrap();

    let rejected = service.reject_invitation(&member, &invitation.id).await.unwrap();
    assert_eq!(rejected.status, InvitationStatus::Rejected);
    assert!(rejected.responded_at.is_some());

    let again = service.reject_invitation(&member, &invitation.id).await.unwrap();
    assert_eq!(again.status, InvitationStatus::Rejected);
    assert_eq!(again.responded_at, rejected.responded_at);

    assert!(matches!(
        service.accept_invitation(&member, &invitation.id).await,
        Err(NeosecError::InvitationAlreadyResolved(_))
    ));
    assert!(service.get_my_memberships(&member).await.unwrap().is_empty());
}

#[tokio::test]
async fn external_invite_is_claimed_after_registration() {
    let service = create_test_service();
    let (leader, group_id) = leader_with_group(&service, 5).await;

    let invitation = service
        .invite_member(&leader, &group_id, "newcomer@neosec.io")
        .await
        .unwrap();
    assert!(invitation.invitee_id.is_none());

    let newcomer = register(&service, "Newcomer@neosec.io").await;
    let listed = service.list_my_invitations(&newcomer).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].status, InvitationStatus::Pending);

    let membership = service.accept_invitation(&newcomer, &invitation.id).await.unwrap();
    assert_eq!(membership.user_id, newcomer.user.id);
}

#[tokio::test]
async fn accept_rechecks_capacity() {
    let service = create_test_service();
    let (leader, group_id) = leader_with_group(&service, 1).await;
    let a = register(&service, "a@x.com").await;
    let b = register(&service, "b@x.com").await;

    // Pending invites do not reserve seats.
    let invite_a = service.invite_member(&leader, &group_id, &a.user.email).await.unwrap();
    let invite_b = service.invite_member(&leader, &group_id, &b.user.email).await.unwrap();

    service.accept_invitation(&a, &invite_a.id).await.unwrap();
    assert!(matches!(
        service.accept_invitation(&b, &invite_b.id).await,
        Err(NeosecError::GroupFull(_))
    ));

    // Still pending, so it can succeed once a seat frees up.
    service.remove_member(&leader, &group_id, a.user_id()).await.unwrap();
    assert!(service.accept_invitation(&b, &invite_b.id).await.is_ok());
}

#[tokio::test]
async fn accept_uses_the_current_member_limit() {
    let service = create_test_service();
    let (leader, group_id) = leader_with_group(&service, 2).await;
    let a = register(&service, "a@x.com").await;
    let b = register(&service, "b@x.com").await;
    let invite_a = service.invite_member(&leader, &group_id, &a.user.email).await.unwrap();
    let invite_b = service.invite_member(&leader, &group_id, &b.user.email).await.unwrap();
    service.accept_invitation(&a, &invite_a.id).await.unwrap();

    service
        .update_group(
            &leader,
            &group_id,
            GroupChanges {
                max_members: Some(1),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(matches!(
        service.accept_invitation(&b, &invite_b.id).await,
        Err(NeosecError::GroupFull(_))
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn shrinking_the_limit_races_accepts_safely() {
    let service = Arc::new(create_test_service());
    let (leader, group_id) = leader_with_group(&service, 4).await;

    let mut invited = Vec::new();
    for i in 0..4 {
        let member = register(&service, &format!("member{}@neosec.io", i)).await;
        let invitation = service
            .invite_member(&leader, &group_id, &member.user.email)
            .await
            .unwrap();
        invited.push((member, invitation.id));
    }

    let mut handles: Vec<_> = invited
        .into_iter()
        .map(|(member, invitation_id)| {
            let service = Arc::clone(&service);
            tokio::spawn(async move { service.accept_invitation(&member, &invitation_id).await.map(|_| ()) })
        })
        .collect();
    for max_members in [3, 2, 1] {
        let service = Arc::clone(&service);
        let leader = leader.clone();
        let group_id = group_id.clone();
        handles.push(tokio::spawn(async move {
            let changes = GroupChanges {
                max_members: Some(max_members),
                ..Default::default()
            };
            service.update_group(&leader, &group_id, changes).await.map(|_| ())
        }));
    }
    for handle in handles {
        match handle.await.unwrap() {
            Ok(()) | Err(NeosecError::GroupFull(_)) | Err(NeosecError::InvalidInput(_, _)) => {}
            Err(e) => panic!("unexpected error: {}", e),
        }
    }

    let details = service.get_group_details(&leader, &group_id).await.unwrap();
    assert!(details.member_count <= details.group.max_members);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_accepts_never_exceed_capacity() {
    let service = Arc::new(create_test_service());
    let (leader, group_id) = leader_with_group(&service, 2).await;

    let mut invited = Vec::new();
    for i in 0..5 {
        let member = register(&service, &format!("member{}@neosec.io", i)).await;
        let invitation = service
            .invite_member(&leader, &group_id, &member.user.email)
            .await
            .unwrap();
        invited.push((member, invitation.id));
    }

    let handles: Vec<_> = invited
        .into_iter()
        .map(|(member, invitation_id)| {
            let service = Arc::clone(&service);
            tokio::spawn(async move { service.accept_invitation(&member, &invitation_id).await })
        })
        .collect();

    let mut accepted = 0;
    let mut full = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => accepted += 1,
            Err(NeosecError::GroupFull(_)) => full += 1,
            Err(e) => panic!("unexpected error: {}", e),
        }
    }
    assert_eq!(accepted, 2);
    assert_eq!(full, 3);

    let details = service.get_group_details(&leader, &group_id).await.unwrap();
    assert_eq!(details.member_count, 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_accepts_of_one_invitation_succeed_once() {
    let service = Arc::new(create_test_service());
    let (leader, group_id) = leader_with_group(&service, 5).await;
    let member = register(&service, "member@neosec.io").await;
    let invitation = service
        .invite_member(&leader, &group_id, &member.user.email)
        .await
        .unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let service = Arc::clone(&service);
            let member = member.clone();
            let invitation_id = invitation.id.clone();
            tokio::spawn(async move { service.accept_invitation(&member, &invitation_id).await })
        })
        .collect();

    let mut accepted = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => accepted += 1,
            Err(NeosecError::InvitationAlreadyResolved(_)) => {}
            Err(e) => panic!("unexpected error: {}", e),
        }
    }
    assert_eq!(accepted, 1);
    assert_eq!(service.get_my_memberships(&member).await.unwrap().len(), 1);
}
