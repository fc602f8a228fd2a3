//! In-memory store doubles for tests
//!
//! Same contracts as the PostgreSQL and Redis repositories, including
//! real password hashing, plus one-shot failure injection for exercising
//! storage error paths.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::error::{ServiceError, ServiceResult};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::models::{NewUser, User, UserChanges};
use crate::password;
use crate::repositories::{SessionStore, UserStore};

fn take_failure(flag: &mut bool) -> ServiceResult<()> {
    if std::mem::take(flag) {
        return Err(ServiceError::Internal(anyhow::anyhow!(
            "injected store failure"
        )));
    }
    Ok(())
}

/// In-memory user store
#[derive(Clone, Default)]
pub struct MemoryUserStore {
    state: Arc<Mutex<UserState>>,
}

#[derive(Default)]
struct UserState {
    users: HashMap<i64, User>,
    next_id: i64,
    fail_next: bool,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next store call fail with an internal error
    pub async fn fail_next(&self) {
        self.state.lock().await.fail_next = true;
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, new_user: &NewUser) -> ServiceResult<User> {
        let mut state = self.state.lock().await;
        take_failure(&mut state.fail_next)?;

        let duplicate = state
            .users
            .values()
            .any(|u| u.username == new_user.username);
        if duplicate {
            return Err(ServiceError::Taken);
        }

        state.next_id += 1;
        let user = User {
            id: state.next_id,
            username: new_user.username.clone(),
            password_hash: password::hash(&new_user.password)?,
            photo_uuid: None,
            active: true,
        };
        state.users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn save(&self, id: i64, changes: &UserChanges) -> ServiceResult<()> {
        let mut state = self.state.lock().await;
        take_failure(&mut state.fail_next)?;

        if let Some(username) = &changes.username {
            let owned_by_other = state
                .users
                .values()
                .any(|u| u.username == *username && u.id != id);
            if owned_by_other {
                return Err(ServiceError::Taken);
            }
        }

        let Some(user) = state.users.get_mut(&id) else {
            return Err(ServiceError::NotExists);
        };

        if let Some(username) = &changes.username {
            user.username = username.clone();
        }
        if let Some(plaintext) = &changes.password {
            user.password_hash = password::hash(plaintext)?;
        }
        if let Some(photo) = changes.photo_uuid {
            user.photo_uuid = Some(photo);
        }
        if let Some(active) = changes.active {
            user.active = active;
        }

        Ok(())
    }

    async fn get_by_id(&self, id: i64) -> ServiceResult<User> {
        let mut state = self.state.lock().await;
        take_failure(&mut state.fail_next)?;

        state
            .users
            .get(&id)
            .cloned()
            .ok_or(ServiceError::NotExists)
    }

    async fn get_by_username(&self, username: &str) -> ServiceResult<User> {
        let mut state = self.state.lock().await;
        take_failure(&mut state.fail_next)?;

        state
            .users
            .values()
            .find(|u| u.username == username)
            .cloned()
            .ok_or(ServiceError::NotExists)
    }

    async fn get_by_ids(&self, ids: &[i64]) -> ServiceResult<Vec<User>> {
        let mut state = self.state.lock().await;
        take_failure(&mut state.fail_next)?;

        Ok(ids
            .iter()
            .filter_map(|id| state.users.get(id).cloned())
            .collect())
    }
}

/// In-memory session store
#[derive(Clone, Default)]
pub struct MemorySessionStore {
    state: Arc<Mutex<SessionState>>,
}

#[derive(Default)]
struct SessionState {
    sessions: HashMap<String, String>,
    fail_next: bool,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next store call fail with an internal error
    pub async fn fail_next(&self) {
        self.state.lock().await.fail_next = true;
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn set(&self, payload: &str) -> ServiceResult<String> {
        let mut state = self.state.lock().await;
        take_failure(&mut state.fail_next)?;

        let token = Uuid::new_v4().to_string();
        state.sessions.insert(token.clone(), payload.to_string());

        Ok(token)
    }

    async fn get(&self, token: &str) -> ServiceResult<String> {
        let mut state = self.state.lock().await;
        take_failure(&mut state.fail_next)?;

        state
            .sessions
            .get(token)
            .cloned()
            .ok_or(ServiceError::NotExists)
    }

    async fn delete(&self, token: &str) -> ServiceResult<()> {
        let mut state = self.state.lock().await;
        take_failure(&mut state.fail_next)?;

        state.sessions.remove(token);
        Ok(())
    }
}
