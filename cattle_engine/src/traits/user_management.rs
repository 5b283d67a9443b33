use thiserror::Error;

use crate::db_types::{NewUserAccount, UserAccount};

#[derive(Debug, Clone, Error)]
pub enum UserApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("The username {0} is already taken")]
    UsernameTaken(String),
    #[error("User {0} does not exist")]
    UserNotFound(String),
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Account {0} is disabled")]
    AccountDisabled(String),
    #[error("Role not allowed. {0}")]
    RoleNotAllowed(String),
    #[error("Invalid input. {0}")]
    InvalidInput(String),
}

impl From<sqlx::Error> for UserApiError {
    fn from(e: sqlx::Error) -> Self {
        UserApiError::DatabaseError(e.to_string())
    }
}

/// Storage for marketplace user accounts. Password hashing happens before data reaches this trait; the backend only
/// ever sees the hash.
#[allow(async_fn_in_trait)]
pub trait UserManagement {
    /// Creates a new, active user account.
    ///
    /// Returns `UsernameTaken` if the username is already registered.
    async fn create_user(&self, user: NewUserAccount) -> Result<UserAccount, UserApiError>;

    async fn fetch_user(&self, username: &str) -> Result<Option<UserAccount>, UserApiError>;

    async fn fetch_all_users(&self) -> Result<Vec<UserAccount>, UserApiError>;

    /// Flips the `is_active` flag on the account and returns the new value.
    async fn toggle_user_active(&self, username: &str) -> Result<bool, UserApiError>;

    async fn delete_user(&self, username: &str) -> Result<bool, UserApiError>;
}
