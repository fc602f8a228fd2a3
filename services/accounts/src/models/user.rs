//! User model and related functionality

use common::models::UserProfile;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// User entity
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub photo_uuid: Option<Uuid>,
    pub active: bool,
}

impl User {
    /// Public view of this account
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            username: self.username.clone(),
            photo_uuid: self.photo_uuid,
            active: self.active,
        }
    }
}

/// New user creation payload. The password is plaintext; the store
/// hashes it before anything is written.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password: String,
}

/// Partial update applied by the store. `None` fields keep their
/// current value; `password` is plaintext and hashed on write.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub username: Option<String>,
    pub password: Option<String>,
    pub photo_uuid: Option<Uuid>,
    pub active: Option<bool>,
}

impl UserChanges {
    /// True when no field would change
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.password.is_none()
            && self.photo_uuid.is_none()
            && self.active.is_none()
    }
}
