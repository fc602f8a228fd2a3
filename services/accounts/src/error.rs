//! Custom error types for the accounts service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::error::{ServiceError, ValidationError};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Custom error type for the accounts service HTTP surface
#[derive(Error, Debug)]
pub enum ApiError {
    /// Unauthorized access
    #[error("Unauthorized")]
    Unauthorized,

    /// Requested resource does not exist
    #[error("Not found")]
    NotFound,

    /// Too many requests from one client
    #[error("Too many requests")]
    TooManyRequests,

    /// One or more request fields failed validation
    #[error("Validation failed")]
    Validation(#[from] ValidationError),

    /// Internal server error
    #[error("Internal server error")]
    InternalServerError,
}

impl ApiError {
    /// Map a core error for an endpoint that authenticates the caller:
    /// a record that does not exist means the caller is not logged in.
    pub fn auth(operation: &'static str, err: ServiceError) -> Self {
        match err {
            ServiceError::NotExists => ApiError::Unauthorized,
            other => ApiError::unexpected(operation, other),
        }
    }

    /// Map a core error for a plain lookup: a record that does not exist
    /// is simply not found.
    pub fn lookup(operation: &'static str, err: ServiceError) -> Self {
        match err {
            ServiceError::NotExists => ApiError::NotFound,
            other => ApiError::unexpected(operation, other),
        }
    }

    /// Map the remaining error kinds. Validation failures pass through
    /// to the client; everything else is logged and hidden behind a 500.
    pub fn unexpected(operation: &'static str, err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(fields) => ApiError::Validation(fields),
            ServiceError::Internal(err) => {
                error!("Failed to {}: {:#}", operation, err);
                ApiError::InternalServerError
            }
            other => {
                error!("Failed to {}: {}", operation, other);
                ApiError::InternalServerError
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Validation failures answer with the field map itself
            ApiError::Validation(fields) => {
                return (StatusCode::BAD_REQUEST, Json(fields)).into_response();
            }
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized"),
            ApiError::NotFound => (StatusCode::NOT_FOUND, "Not found"),
            ApiError::TooManyRequests => (StatusCode::TOO_MANY_REQUESTS, "Too many requests"),
            ApiError::InternalServerError => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Type alias for handler results
pub type ApiResult<T> = Result<T, ApiError>;
