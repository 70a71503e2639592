use super::{TEST_PASSWORD, create_test_service, make_leader, register, with_admin};
use crate::core::errors::NeosecError;
use crate::core::models::subscription::SubscriptionStatus;
use crate::core::models::user::{AccountType, SubscriptionTier, UserRole};
use crate::core::services::{LoginContext, ProfileChanges, Registration};

#[tokio::test]
async fn first_registered_user_becomes_admin() {
    let service = create_test_service();
    let first = register(&service, "first@neosec.io").await;
    let second = register(&service, "second@neosec.io").await;

    assert_eq!(first.user.role, UserRole::Admin);
    assert_eq!(second.user.role, UserRole::User);
    assert_eq!(second.user.account_type, AccountType::Member);
    assert_eq!(second.user.subscription_tier, SubscriptionTier::Free);
    assert!(!second.user.is_paid);
}

#[tokio::test]
async fn register_normalizes_email_and_rejects_duplicates() {
    let service = create_test_service();
    let session = register(&service, "  Alice@Example.COM ").await;
    assert_eq!(session.user.email, "alice@example.com");

    let result = service
        .register(Registration {
            email: "ALICE@example.com".to_string(),
            password: TEST_PASSWORD.to_string(),
            name: None,
            phone: None,
        })
        .await;
    assert!(matches!(result, Err(NeosecError::EmailAlreadyRegistered(_))));
}

#[tokio::test]
async fn register_validates_input() {
    let service = create_test_service();
    let short_password = service
        .register(Registration {
            email: "bob@neosec.io".to_string(),
            password: "12345".to_string(),
            name: None,
            phone: None,
        })
        .await;
    assert!(matches!(short_password, Err(NeosecError::InvalidInput(field, _)) if field == "password"));

    let bad_email = service
        .register(Registration {
            email: "bob@neosec".to_string(),
            password: TEST_PASSWORD.to_string(),
            name: None,
            phone: None,
        })
        .await;
    assert!(matches!(bad_email, Err(NeosecError::InvalidEmail(_))));
}

#[tokio::test]
async fn login_issues_token_for_valid_credentials() {
    let service = create_test_service();
    let session = register(&service, "carol@neosec.io").await;

    let result = service.login("Carol@neosec.io", TEST_PASSWORD).await.unwrap();
    assert_eq!(result.user.id, session.user.id);

    let claims = service.validate_token(&result.token).unwrap();
    assert_eq!(claims.sub, session.user.id);
    let resolved = service.resolve_session(&claims).await.unwrap();
    assert_eq!(resolved.user_id(), session.user_id());

    assert!(matches!(
        service.login("carol@neosec.io", "wrong-password").await,
        Err(NeosecError::InvalidCredentials)
    ));
    assert!(matches!(
        service.login("nobody@neosec.io", TEST_PASSWORD).await,
        Err(NeosecError::InvalidCredentials)
    ));
}

#[tokio::test]
async fn password_change_requires_current_password() {
    let service = create_test_service();
    let session = register(&service, "dave@neosec.io").await;

    let wrong = service
        .update_profile(
            &session,
            ProfileChanges {
                current_password: Some("not-it".to_string()),
                new_password: Some("brand-new-pass".to_string()),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(wrong, Err(NeosecError::InvalidInput(field, _)) if field == "currentPassword"));

    let updated = service
        .update_profile(
            &session,
            ProfileChanges {
                name: Some("David".to_string()),
                current_password: Some(TEST_PASSWORD.to_string()),
                new_password: Some("brand-new-pass".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name.as_deref(), Some("David"));

    assert!(service.login("dave@neosec.io", "brand-new-pass").await.is_ok());
    assert!(service.login("dave@neosec.io", TEST_PASSWORD).await.is_err());
}

#[tokio::test]
async fn upgrade_and_cancel_switch_account_type() {
    let service = create_test_service();
    with_admin(&service).await;
    let session = register(&service, "erin@neosec.io").await;

    let free = service.get_my_subscription(&session).await.unwrap();
    assert_eq!(free.tier, SubscriptionTier::Free);

    let leader = make_leader(&service, &session, SubscriptionTier::Pro).await;
    assert!(leader.user.is_leader());
    let subscription = service.get_my_subscription(&leader).await.unwrap();
    assert_eq!(subscription.tier, SubscriptionTier::Pro);
    assert_eq!(subscription.status, SubscriptionStatus::Active);
    assert!(subscription.end_date > subscription.start_date);

    let canceled = service.cancel_subscription(&leader).await.unwrap();
    assert_eq!(canceled.status, SubscriptionStatus::Canceled);
    assert!(!canceled.auto_renew);

    let user = service.me(&leader).await.unwrap();
    assert_eq!(user.account_type, AccountType::Member);
    assert_eq!(user.subscription_tier, SubscriptionTier::Free);
    assert!(!user.is_leader());

    assert!(matches!(
        service.cancel_subscription(&leader).await,
        Err(NeosecError::InvalidInput(..))
    ));
}

#[tokio::test]
async fn upgrade_to_free_tier_is_rejected() {
    let service = create_test_service();
    let session = register(&service, "frank@neosec.io").await;
    assert!(matches!(
        service.upgrade_to_leader(&session, SubscriptionTier::Free).await,
        Err(NeosecError::InvalidInput(..))
    ));
}

#[tokio::test]
async fn activity_log_is_admin_only() {
    let service = create_test_service();
    let admin = with_admin(&service).await;
    let user = register(&service, "gina@neosec.io").await;

    let logs = service.get_app_logs(&admin).await.unwrap();
    assert_eq!(logs.iter().filter(|l| l.action == crate::constants::USER_REGISTERED).count(), 2);

    assert!(matches!(service.get_app_logs(&user).await, Err(NeosecError::Forbidden(_))));
}

fn from_ip(ip: &str) -> LoginContext {
    LoginContext {
        ip_address: Some(ip.to_string()),
        user_agent: Some("neosec-tests".to_string()),
    }
}

#[tokio::test]
async fn repeated_failures_from_one_address_become_suspicious() {
    let service = create_test_service();
    with_admin(&service).await;
    let user = register(&service, "user@neosec.io").await;

    for _ in 0..4 {
        let result = service
            .login_with_context("user@neosec.io", "wrong-password", from_ip("203.0.113.7"))
            .await;
        assert!(matches!(result, Err(NeosecError::InvalidCredentials)));
    }
    // A different address starts its own count.
    let _ = service
        .login_with_context("user@neosec.io", "wrong-password", from_ip("198.51.100.1"))
        .await;

    let history = service.get_login_history(&user, None, false).await.unwrap();
    assert_eq!(history.len(), 5);
    assert!(history.iter().all(|r| !r.success));
    assert!(history.iter().all(|r| r.failure_reason.as_deref() == Some("Invalid password")));

    let suspicious = service.get_login_history(&user, None, true).await.unwrap();
    assert_eq!(suspicious.len(), 1);
    assert_eq!(suspicious[0].ip_address.as_deref(), Some("203.0.113.7"));
    assert_eq!(suspicious[0].user_agent.as_deref(), Some("neosec-tests"));
}

#[tokio::test]
async fn successful_login_is_recorded() {
    let service = create_test_service();
    let user = register(&service, "user@neosec.io").await;

    service
        .login_with_context("user@neosec.io", TEST_PASSWORD, from_ip("203.0.113.7"))
        .await
        .unwrap();

    let history = service.get_login_history(&user, None, false).await.unwrap();
    assert_eq!(history.len(), 1);
    assert!(history[0].success);
    assert!(!history[0].suspicious_activity);
    assert_eq!(history[0].user_id.as_deref(), Some(user.user.id.as_str()));
}

#[tokio::test]
async fn unknown_account_shows_up_in_security_events() {
    let service = create_test_service();
    let admin = with_admin(&service).await;
    let user = register(&service, "user@neosec.io").await;

    let result = service
        .login_with_context("ghost@neosec.io", TEST_PASSWORD, from_ip("203.0.113.9"))
        .await;
    assert!(matches!(result, Err(NeosecError::InvalidCredentials)));
    service.login("user@neosec.io", TEST_PASSWORD).await.unwrap();

    let events = service.get_security_events(&admin, None).await.unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].email, "ghost@neosec.io");
    assert!(events[0].user_id.is_none());
    assert!(events[0].suspicious_activity);
    assert_eq!(events[0].failure_reason.as_deref(), Some("User not found"));

    assert!(matches!(
        service.get_security_events(&user, Some(1)).await,
        Err(NeosecError::Forbidden(_))
    ));
}

#[tokio::test]
async fn login_history_of_others_is_admin_only() {
    let service = create_test_service();
    let admin = with_admin(&service).await;
    let user = register(&service, "user@neosec.io").await;
    let other = register(&service, "other@neosec.io").await;
    service.login("user@neosec.io", TEST_PASSWORD).await.unwrap();

    assert!(matches!(
        service.get_login_history(&other, Some(&user.user.id), false).await,
        Err(NeosecError::Forbidden(_))
    ));
    let seen_by_admin = service
        .get_login_history(&admin, Some(&user.user.id), false)
        .await
        .unwrap();
    assert_eq!(seen_by_admin.len(), 1);
    assert!(service.get_login_history(&other, None, false).await.unwrap().is_empty());
}
