mod account_tests;
mod api_tests;
mod invitation_tests;
mod vpn_tests;

use crate::auth::jwt::JwtService;
use crate::auth::session::Session;
use crate::core::models::user::SubscriptionTier;
use crate::core::services::{NeosecService, NewGroup, Registration};
use crate::infrastructure::cache::in_memory::InMemoryCache;
use crate::infrastructure::logging::in_memory::InMemoryLogging;
use crate::infrastructure::storage::in_memory::InMemoryStorage;

pub type TestService = NeosecService<InMemoryLogging, InMemoryStorage, InMemoryCache>;

pub const TEST_PASSWORD: &str = "secret123";

pub fn create_test_service() -> TestService {
    create_test_service_with_storage().0
}

/// Also hands back a handle on the shared storage so tests can age records.
pub fn create_test_service_with_storage() -> (TestService, InMemoryStorage) {
    let _ = env_logger::try_init();
    let storage = InMemoryStorage::new();
    let logging = InMemoryLogging::new();
    let cache = InMemoryCache::new();
    let jwt_service = JwtService::new("test-secret".to_string(), 3600);
    let service = NeosecService::new(storage.clone(), logging, cache, jwt_service).with_password_cost(4);
    (service, storage)
}

pub async fn register(service: &TestService, email: &str) -> Session {
    let user = service
        .register(Registration {
            email: email.to_string(),
            password: TEST_PASSWORD.to_string(),
            name: Some(email.split('@').next().unwrap_or(email).to_string()),
            phone: None,
        })
        .await
        .unwrap();
    Session::new(user)
}

/// Upgrades the account and returns a session reflecting the new tier.
pub async fn make_leader(service: &TestService, session: &Session, tier: SubscriptionTier) -> Session {
    let (_, user) = service.upgrade_to_leader(session, tier).await.unwrap();
    Session::new(user)
}

pub async fn refreshed(service: &TestService, session: &Session) -> Session {
    Session::new(service.me(session).await.unwrap())
}

/// Registers a throwaway admin first so that later accounts are plain users.
pub async fn with_admin(service: &TestService) -> Session {
    register(service, "admin@neosec.io").await
}

pub async fn create_group(service: &TestService, leader: &Session, name: &str, max_members: usize) -> String {
    service
        .create_group(
            leader,
            NewGroup {
                name: name.to_string(),
                description: None,
                max_members: Some(max_members),
            },
        )
        .await
        .unwrap()
        .id
}

/// Invites `member` into `group_id` and accepts on their behalf.
pub async fn join(service: &TestService, leader: &Session, member: &Session, group_id: &str) -> String {
    let invitation = service
        .invite_member(leader, group_id, &member.user.email)
        .await
        .unwrap();
    service.accept_invitation(member, &invitation.id).await.unwrap().id
}
