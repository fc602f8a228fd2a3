//! User repository for database operations

use async_trait::async_trait;
use common::error::{ServiceError, ServiceResult};
use sqlx::{PgPool, Row};
use tracing::info;

use crate::models::{NewUser, User, UserChanges};
use crate::password;
use crate::repositories::UserStore;

/// PostgreSQL error code for unique constraint violations
const UNIQUE_VIOLATION: &str = "23505";

/// User repository
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Map a write error, turning a unique violation on the username into
/// `Taken`. The in-transaction ownership checks catch duplicates first;
/// the constraint closes the window between check and write.
fn classify_write(err: sqlx::Error) -> ServiceError {
    let unique_violation = err
        .as_database_error()
        .and_then(|db| db.code())
        .is_some_and(|code| code == UNIQUE_VIOLATION);

    if unique_violation {
        ServiceError::Taken
    } else {
        ServiceError::internal("user write failed", err)
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn create(&self, new_user: &NewUser) -> ServiceResult<User> {
        info!("Creating user: {}", new_user.username);

        let password_hash = password::hash(&new_user.password)?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| ServiceError::internal("begin create transaction", e))?;

        let owner = sqlx::query(r#"SELECT id FROM users WHERE username = $1"#)
            .bind(&new_user.username)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| ServiceError::internal("check username ownership", e))?;

        if owner.is_some() {
            return Err(ServiceError::Taken);
        }

        let row = sqlx::query(
            r#"
            INSERT INTO users (username, password_hash)
            VALUES ($1, $2)
            RETURNING id, username, password_hash, photo_uuid, active
            "#,
        )
        .bind(&new_user.username)
        .bind(&password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(classify_write)?;

        tx.commit()
            .await
            .map_err(|e| ServiceError::internal("commit create transaction", e))?;

        let user = User {
            id: row.get("id"),
            username: row.get("username"),
            password_hash: row.get("password_hash"),
            photo_uuid: row.get("photo_uuid"),
            active: row.get("active"),
        };

        Ok(user)
    }

    async fn save(&self, id: i64, changes: &UserChanges) -> ServiceResult<()> {
        info!("Saving user: {}", id);

        let password_hash = match &changes.password {
            Some(plaintext) => Some(password::hash(plaintext)?),
            None => None,
        };

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| ServiceError::internal("begin save transaction", e))?;

        if let Some(username) = &changes.username {
            let owner = sqlx::query(r#"SELECT id FROM users WHERE username = $1 AND id <> $2"#)
                .bind(username)
                .bind(id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| ServiceError::internal("check username ownership", e))?;

            if owner.is_some() {
                return Err(ServiceError::Taken);
            }
        }

        let result = sqlx::query(
            r#"
            UPDATE users
            SET username = COALESCE($2, username),
                password_hash = COALESCE($3, password_hash),
                photo_uuid = COALESCE($4, photo_uuid),
                active = COALESCE($5, active)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&changes.username)
        .bind(&password_hash)
        .bind(changes.photo_uuid)
        .bind(changes.active)
        .execute(&mut *tx)
        .await
        .map_err(classify_write)?;

        if result.rows_affected() == 0 {
            return Err(ServiceError::NotExists);
        }

        tx.commit()
            .await
            .map_err(|e| ServiceError::internal("commit save transaction", e))?;

        Ok(())
    }

    async fn get_by_id(&self, id: i64) -> ServiceResult<User> {
        let row = sqlx::query(
            r#"
            SELECT id, username, password_hash, photo_uuid, active
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ServiceError::internal("fetch user by id", e))?;

        match row {
            Some(row) => Ok(User {
                id: row.get("id"),
                username: row.get("username"),
                password_hash: row.get("password_hash"),
                photo_uuid: row.get("photo_uuid"),
                active: row.get("active"),
            }),
            None => Err(ServiceError::NotExists),
        }
    }

    async fn get_by_username(&self, username: &str) -> ServiceResult<User> {
        let row = sqlx::query(
            r#"
            SELECT id, username, password_hash, photo_uuid, active
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ServiceError::internal("fetch user by username", e))?;

        match row {
            Some(row) => Ok(User {
                id: row.get("id"),
                username: row.get("username"),
                password_hash: row.get("password_hash"),
                photo_uuid: row.get("photo_uuid"),
                active: row.get("active"),
            }),
            None => Err(ServiceError::NotExists),
        }
    }

    async fn get_by_ids(&self, ids: &[i64]) -> ServiceResult<Vec<User>> {
        let rows = sqlx::query(
            r#"
            SELECT id, username, password_hash, photo_uuid, active
            FROM users
            WHERE id = ANY($1)
            ORDER BY id
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ServiceError::internal("fetch users by ids", e))?;

        let users = rows
            .into_iter()
            .map(|row| User {
                id: row.get("id"),
                username: row.get("username"),
                password_hash: row.get("password_hash"),
                photo_uuid: row.get("photo_uuid"),
                active: row.get("active"),
            })
            .collect();

        Ok(users)
    }
}
