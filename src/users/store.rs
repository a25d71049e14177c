//! Backend trait for user storage.

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during user store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Username is already taken
    #[error("Username already exists: {0}")]
    DuplicateUsername(String),

    /// PostgreSQL operation failed
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sqlx::Error),
}

/// A persisted user.
#[derive(Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub username: String,
    /// Salted one-way digest of the password, never the plaintext
    pub password_digest: String,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password_digest", &"<redacted>")
            .finish()
    }
}

/// A validated user waiting to be inserted.
#[derive(Clone)]
pub struct NewUser {
    pub username: String,
    pub password_digest: String,
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("username", &self.username)
            .field("password_digest", &"<redacted>")
            .finish()
    }
}

/// Storage for user records.
///
/// Implementations must enforce username uniqueness atomically: when two
/// creates race on the same username exactly one of them succeeds and the
/// other returns [`StoreError::DuplicateUsername`].
#[async_trait]
pub trait UsersStore: Send + Sync {
    /// Backend identifier for logs and health output
    fn backend(&self) -> &'static str;

    /// Insert a user and return the stored record.
    async fn create(&self, user: NewUser) -> Result<User, StoreError>;

    /// Return the user with the lowest id, if any.
    async fn find_first(&self) -> Result<Option<User>, StoreError>;

    /// Number of stored users
    async fn count(&self) -> Result<u64, StoreError>;
}
