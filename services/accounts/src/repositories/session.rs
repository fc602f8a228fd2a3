//! Session repository backed by Redis

use async_trait::async_trait;
use common::cache::RedisPool;
use common::error::{ServiceError, ServiceResult};
use tracing::info;
use uuid::Uuid;

use crate::repositories::SessionStore;

/// Key prefix separating session entries from other cache keys
const KEY_PREFIX: &str = "session:";

/// Session repository. Tokens are opaque UUIDs; expiry is delegated to
/// Redis TTLs, so an expired session simply stops existing.
#[derive(Clone)]
pub struct SessionRepository {
    pool: RedisPool,
    ttl_seconds: u64,
}

impl SessionRepository {
    /// Create a new session repository storing entries for `ttl_seconds`
    pub fn new(pool: RedisPool, ttl_seconds: u64) -> Self {
        Self { pool, ttl_seconds }
    }

    fn key(token: &str) -> String {
        format!("{}{}", KEY_PREFIX, token)
    }
}

#[async_trait]
impl SessionStore for SessionRepository {
    async fn set(&self, payload: &str) -> ServiceResult<String> {
        let token = Uuid::new_v4().to_string();

        self.pool
            .set_with_ttl(&Self::key(&token), payload, self.ttl_seconds)
            .await
            .map_err(|e| ServiceError::internal("store session", e))?;

        info!("Stored session expiring in {}s", self.ttl_seconds);
        Ok(token)
    }

    async fn get(&self, token: &str) -> ServiceResult<String> {
        let value = self
            .pool
            .get(&Self::key(token))
            .await
            .map_err(|e| ServiceError::internal("load session", e))?;

        value.ok_or(ServiceError::NotExists)
    }

    async fn delete(&self, token: &str) -> ServiceResult<()> {
        self.pool
            .delete(&Self::key(token))
            .await
            .map_err(|e| ServiceError::internal("delete session", e))?;

        Ok(())
    }
}
