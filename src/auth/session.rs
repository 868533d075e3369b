use async_trait::async_trait;
use std::sync::Arc;

use super::{AuthError, SessionKeys};
use crate::database::models::User;
use crate::database::UserStore;

/// Identity attached to an authenticated request, always freshly loaded
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl std::ops::Deref for CurrentUser {
    type Target = User;

    fn deref(&self) -> &User {
        &self.0
    }
}

/// Turns a raw session token into the current user
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn resolve(&self, token: &str) -> Result<CurrentUser, AuthError>;
}

/// Verifies the token, then reloads the user by id so role or password-flag
/// changes made after the token was issued apply immediately
pub struct SessionResolver<S: ?Sized> {
    keys: SessionKeys,
    users: Arc<S>,
}

impl<S: UserStore + ?Sized> SessionResolver<S> {
    pub fn new(keys: SessionKeys, users: Arc<S>) -> Self {
        Self { keys, users }
    }
}

#[async_trait]
impl<S: UserStore + ?Sized> IdentityResolver for SessionResolver<S> {
    async fn resolve(&self, token: &str) -> Result<CurrentUser, AuthError> {
        let claims = self.keys.verify(token)?;
        self.users
            .find_user(claims.sub)
            .await?
            .map(CurrentUser)
            .ok_or(AuthError::Unauthenticated)
    }
}
