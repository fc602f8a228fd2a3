//! Account and session persistence
//!
//! Handlers and the session core talk to storage through the two traits
//! here, so tests can swap the PostgreSQL and Redis backends for
//! in-memory doubles.

pub mod session;
pub mod user;

#[cfg(test)]
pub mod memory;

use async_trait::async_trait;
use common::error::ServiceResult;

use crate::models::{NewUser, User, UserChanges};
use crate::password;

// Re-export for convenience
pub use session::SessionRepository;
pub use user::UserRepository;

/// Store of account records keyed by id and by unique username
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new account. Fails with `Taken` when the username is
    /// already owned, even under concurrent creation.
    async fn create(&self, new_user: &NewUser) -> ServiceResult<User>;

    /// Apply a partial update to an existing account. Fails with `Taken`
    /// when the new username belongs to a different account, and with
    /// `NotExists` when `id` is unknown.
    async fn save(&self, id: i64, changes: &UserChanges) -> ServiceResult<()>;

    /// Fetch an account by id, `NotExists` when absent
    async fn get_by_id(&self, id: i64) -> ServiceResult<User>;

    /// Fetch an account by username, `NotExists` when absent
    async fn get_by_username(&self, username: &str) -> ServiceResult<User>;

    /// Fetch the accounts for the given ids. Unknown ids are omitted,
    /// never an error.
    async fn get_by_ids(&self, ids: &[i64]) -> ServiceResult<Vec<User>>;

    /// Check a plaintext password against the stored credentials
    fn check_password(&self, user: &User, plaintext: &str) -> bool {
        password::verify(&user.password_hash, plaintext)
    }
}

/// Store of opaque session tokens and the payload behind each
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Store `payload` under a freshly generated token and return the
    /// token. Entries expire on their own after the configured TTL.
    async fn set(&self, payload: &str) -> ServiceResult<String>;

    /// Load the payload behind `token`; expired and unknown tokens are
    /// both `NotExists`.
    async fn get(&self, token: &str) -> ServiceResult<String>;

    /// Drop a session. Deleting an unknown token is not an error.
    async fn delete(&self, token: &str) -> ServiceResult<()>;
}
