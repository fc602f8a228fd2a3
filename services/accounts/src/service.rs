//! Account and session core flows
//!
//! Everything here is transport-independent: the HTTP handlers and the
//! internal RPC surface both call into [`AuthService`]. Stores are
//! injected behind traits so tests run against in-memory doubles.

use std::sync::Arc;

use common::error::{FieldReason, ServiceError, ServiceResult, ValidationError};
use common::models::{SessionPayload, UserProfile};
use tracing::info;

use crate::models::{CredentialsForm, NewUser, Session, UpdateForm, UserChanges};
use crate::repositories::{SessionStore, UserStore};

/// Core account and session operations
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    sessions: Arc<dyn SessionStore>,
}

impl AuthService {
    /// Create a service over the given stores
    pub fn new(users: Arc<dyn UserStore>, sessions: Arc<dyn SessionStore>) -> Self {
        Self { users, sessions }
    }

    /// Log an account in and mint a session for it.
    ///
    /// An unknown username is reported as a validation failure on the
    /// username field and a wrong password as one on the password field,
    /// so the caller can render both the same way. Storage trouble stays
    /// internal and is never turned into a field failure.
    pub async fn create_session(&self, form: &CredentialsForm) -> ServiceResult<Session> {
        form.validate()?;

        let user = match self.users.get_by_username(&form.username).await {
            Ok(user) => user,
            Err(ServiceError::NotExists) => {
                return Err(ValidationError::of("username", FieldReason::NotExists).into());
            }
            Err(err) => return Err(err),
        };

        if !self.users.check_password(&user, &form.password) {
            return Err(ValidationError::of("password", FieldReason::Invalid).into());
        }

        let payload = SessionPayload { id: user.id };
        let serialized = serde_json::to_string(&payload)
            .map_err(|e| ServiceError::internal("serialize session payload", e))?;
        let token = self.sessions.set(&serialized).await?;

        info!("Created session for user {}", user.id);
        Ok(Session { token, payload })
    }

    /// Resolve a session token to the payload stored behind it
    pub async fn get_session_info(&self, token: &str) -> ServiceResult<SessionPayload> {
        let raw = self.sessions.get(token).await?;
        let payload = serde_json::from_str(&raw)
            .map_err(|e| ServiceError::internal("decode session payload", e))?;

        Ok(payload)
    }

    /// Drop a session. Unknown tokens are dropped silently.
    pub async fn delete_session(&self, token: &str) -> ServiceResult<()> {
        self.sessions.delete(token).await
    }

    /// Register a new account.
    ///
    /// A username that is already owned is reported as a validation
    /// failure on the username field.
    pub async fn create_user(&self, form: &CredentialsForm) -> ServiceResult<UserProfile> {
        form.validate()?;

        let new_user = NewUser {
            username: form.username.clone(),
            password: form.password.clone(),
        };

        let user = match self.users.create(&new_user).await {
            Ok(user) => user,
            Err(ServiceError::Taken) => {
                return Err(ValidationError::of("username", FieldReason::Taken).into());
            }
            Err(err) => return Err(err),
        };

        info!("Created user {}", user.id);
        Ok(user.profile())
    }

    /// Apply a profile update.
    ///
    /// The steps run in a fixed order: structural validation of the whole
    /// form, an early return when nothing would change, then the
    /// old-password proof, and only then the write. A request that fails
    /// validation therefore never reads or writes the store.
    pub async fn update_user(&self, id: i64, form: &UpdateForm) -> ServiceResult<()> {
        form.validate()?;

        if form.is_noop() {
            return Ok(());
        }

        let user = self.users.get_by_id(id).await?;

        let mut changes = UserChanges {
            username: form.username.value().cloned(),
            photo_uuid: form.parsed_photo()?,
            ..Default::default()
        };

        if let Some(new_password) = form.new_password.value() {
            let Some(old_password) = form.old_password.value() else {
                return Err(ValidationError::of("oldPassword", FieldReason::Required).into());
            };
            if !self.users.check_password(&user, old_password) {
                return Err(ValidationError::of("oldPassword", FieldReason::Invalid).into());
            }
            changes.password = Some(new_password.clone());
        }

        match self.users.save(id, &changes).await {
            Ok(()) => {
                info!("Updated user {}", id);
                Ok(())
            }
            Err(ServiceError::Taken) => {
                Err(ValidationError::of("username", FieldReason::Taken).into())
            }
            Err(err) => Err(err),
        }
    }

    /// Whether a username is already registered.
    ///
    /// No validation on purpose: any value nobody owns, including the
    /// empty string, is simply free.
    pub async fn is_username_used(&self, username: &str) -> ServiceResult<bool> {
        match self.users.get_by_username(username).await {
            Ok(_) => Ok(true),
            Err(ServiceError::NotExists) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Public profile of the account with the given id
    pub async fn get_user_by_id(&self, id: i64) -> ServiceResult<UserProfile> {
        Ok(self.users.get_by_id(id).await?.profile())
    }

    /// Public profile of the account with the given username
    pub async fn get_user_by_username(&self, username: &str) -> ServiceResult<UserProfile> {
        Ok(self.users.get_by_username(username).await?.profile())
    }

    /// Public profiles for the given ids; unknown ids are omitted
    pub async fn get_users_by_ids(&self, ids: &[i64]) -> ServiceResult<Vec<UserProfile>> {
        let users = self.users.get_by_ids(ids).await?;
        Ok(users.into_iter().map(|u| u.profile()).collect())
    }
}
