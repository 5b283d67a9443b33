use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{NewUserAccount, Role, UserAccount},
    traits::{UserApiError, UserManagement},
};

/// `UserApi` handles registration and the account checks made at login.
///
/// Passwords never reach this API. Callers hash the password before registering, and supply a verification closure
/// when logging in, so the engine has no opinion on the hashing scheme.
pub struct UserApi<B> {
    db: B,
}

impl<B> Debug for UserApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "UserApi")
    }
}

impl<B> UserApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> UserApi<B>
where B: UserManagement
{
    /// Registers a new, active account. Accounts cannot register themselves as administrators.
    pub async fn register(&self, user: NewUserAccount) -> Result<UserAccount, UserApiError> {
        if user.role == Role::Admin {
            return Err(UserApiError::RoleNotAllowed("Administrator accounts cannot be self-registered".into()));
        }
        if user.username.trim().is_empty() {
            return Err(UserApiError::InvalidInput("A username is required".into()));
        }
        if user.username.chars().any(char::is_whitespace) {
            return Err(UserApiError::InvalidInput("Usernames cannot contain spaces".into()));
        }
        let user = self.db.create_user(user).await?;
        info!("🔄️👤️ New {} account registered: {}", user.role, user.username);
        Ok(user)
    }

    /// Looks up `username` and checks its password hash with `verify`.
    ///
    /// An unknown user and a wrong password give the same error. A disabled account is only reported once the password
    /// has been verified.
    pub async fn authenticate<F>(&self, username: &str, verify: F) -> Result<UserAccount, UserApiError>
    where F: FnOnce(&str) -> bool {
        let user = self.db.fetch_user(username).await?.ok_or(UserApiError::InvalidCredentials)?;
        if !verify(&user.password_hash) {
            debug!("🔄️👤️ Failed login attempt for {username}");
            return Err(UserApiError::InvalidCredentials);
        }
        if !user.is_active {
            return Err(UserApiError::AccountDisabled(username.to_string()));
        }
        trace!("🔄️👤️ {username} authenticated");
        Ok(user)
    }

    pub async fn profile(&self, username: &str) -> Result<UserAccount, UserApiError> {
        self.db.fetch_user(username).await?.ok_or_else(|| UserApiError::UserNotFound(username.to_string()))
    }
}
