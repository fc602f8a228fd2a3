//! Error taxonomy shared across services
//!
//! This module defines the closed set of error kinds raised by the stores
//! and the session core, plus the infrastructure error type used by the
//! database module. Callers match on the kind, never on message strings.

use std::collections::BTreeMap;

use redis::RedisError;
use serde::{Deserialize, Serialize};
use sqlx::Error as SqlxError;
use thiserror::Error;

/// Reason code attached to a single invalid field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldReason {
    /// The field is mandatory but was not supplied
    Required,
    /// The field was supplied but its value is unusable
    Invalid,
    /// The value is already owned by another record
    Taken,
    /// The referenced record does not exist
    NotExists,
}

/// Field-keyed validation failure.
///
/// Serializes to a flat JSON object mapping field names to reason codes,
/// e.g. `{"username":"taken"}`.
#[derive(Error, Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[error("validation failed: {fields:?}")]
pub struct ValidationError {
    #[serde(flatten)]
    fields: BTreeMap<String, FieldReason>,
}

impl ValidationError {
    /// Create an empty validation error to be filled field by field
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a validation error for a single field
    pub fn of(field: impl Into<String>, reason: FieldReason) -> Self {
        let mut err = Self::new();
        err.add(field, reason);
        err
    }

    /// Record a failure for `field`
    pub fn add(&mut self, field: impl Into<String>, reason: FieldReason) {
        self.fields.insert(field.into(), reason);
    }

    /// Absorb all failures from `other`
    pub fn merge(&mut self, other: ValidationError) {
        self.fields.extend(other.fields);
    }

    /// True when no field failed
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Reason recorded for `field`, if any
    pub fn get(&self, field: &str) -> Option<FieldReason> {
        self.fields.get(field).copied()
    }
}

/// Closed error kinds surfaced by the stores and the session core.
///
/// Storage failures are wrapped with context and carried in `Internal`;
/// their detail is logged, never shown to callers.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// The requested record does not exist (or the session expired)
    #[error("record does not exist")]
    NotExists,

    /// A unique field is already owned by another record
    #[error("value already taken")]
    Taken,

    /// One or more request fields failed validation
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Storage or transport failure; detail not trusted to callers
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ServiceError {
    /// Wrap a lower-level error as `Internal` with context
    pub fn internal(context: &'static str, err: impl Into<anyhow::Error>) -> Self {
        ServiceError::Internal(err.into().context(context))
    }

    /// True for the `NotExists` kind
    pub fn is_not_exists(&self) -> bool {
        matches!(self, ServiceError::NotExists)
    }
}

/// Type alias for Result with ServiceError
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Custom error type for database infrastructure operations
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error occurred during database connection
    #[error("Database connection error: {0}")]
    Connection(#[source] SqlxError),

    /// Error occurred during database query execution
    #[error("Database query error: {0}")]
    Query(#[source] SqlxError),

    /// Error occurred during database migration
    #[error("Database migration error: {0}")]
    Migration(String),

    /// Configuration error
    #[error("Database configuration error: {0}")]
    Configuration(String),
}

/// Type alias for Result with DatabaseError
pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// Custom error type for cache infrastructure operations
#[derive(Error, Debug)]
pub enum CacheError {
    /// Error establishing a connection to Redis
    #[error("Cache connection error: {0}")]
    Connection(#[source] RedisError),

    /// Error running a Redis command
    #[error("Cache command error: {0}")]
    Command(#[source] RedisError),
}

/// Type alias for Result with CacheError
pub type CacheResult<T> = Result<T, CacheError>;
