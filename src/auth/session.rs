use crate::core::models::user::User;

/// The authenticated caller, resolved once per request by the auth
/// middleware and handed explicitly to every service call.
#[derive(Clone, Debug)]
pub struct Session {
    pub user: User,
}

impl Session {
    pub fn new(user: User) -> Self {
        Session { user }
    }

    pub fn user_id(&self) -> &str {
        &self.user.id
    }
}
