//! Accounts service routes
//!
//! The public surface lives under `/v1`: session endpoints for login,
//! whoami and logout, and user endpoints for registration, profile
//! updates, public lookup and username availability. Sessions ride in an
//! HttpOnly cookie.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::{
    Json, Router,
    extract::{ConnectInfo, Path, State},
    http::{HeaderValue, Method, StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};
use axum_extra::extract::{CookieJar, cookie::Cookie};
use common::models::UserProfile;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::AppState;
use crate::error::{ApiError, ApiResult};
use crate::middleware::{Identity, SESSION_COOKIE};
use crate::models::{CredentialsForm, UpdateForm, UsernameForm};

/// Create the router for the accounts service
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route(
            "/v1/sessions",
            post(create_session)
                .get(get_session)
                .delete(delete_session),
        )
        .route("/v1/users", post(create_user).put(update_user))
        .route("/v1/users/:user_id", get(get_user))
        .route("/v1/users/used", post(check_username))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::new())
        .with_state(state)
}

/// Build the CORS layer allowing the configured web origin to send
/// credentialed requests
pub fn cors_layer(allowed_origin: &str) -> Result<CorsLayer> {
    let origin: HeaderValue = allowed_origin
        .parse()
        .with_context(|| format!("invalid CORS origin: {}", allowed_origin))?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true))
}

/// Session cookie carrying `token`, scoped to the whole site
fn session_cookie(token: &str) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token.to_string()))
        .path("/")
        .http_only(true)
        .build()
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "accounts"
    }))
}

/// Log in. A successful login answers 200 with an empty body and the
/// session token in a cookie.
pub async fn create_session(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(form): Json<CredentialsForm>,
) -> ApiResult<impl IntoResponse> {
    info!("Login attempt for user: {}", form.username);

    let session = state
        .service
        .create_session(&form)
        .await
        .map_err(|e| ApiError::unexpected("create session", e))?;

    Ok((jar.add(session_cookie(&session.token)), StatusCode::OK))
}

/// Profile of the logged-in account
pub async fn get_session(
    State(state): State<AppState>,
    identity: Identity,
) -> ApiResult<Json<UserProfile>> {
    let profile = state
        .auth_client
        .get_user_by_id(identity.0.id)
        .await
        .map_err(|e| ApiError::auth("resolve session owner", e))?;

    Ok(Json(profile))
}

/// Log the current session out and expire its cookie
pub async fn delete_session(
    State(state): State<AppState>,
    _identity: Identity,
    jar: CookieJar,
) -> ApiResult<impl IntoResponse> {
    let Some(cookie) = jar.get(SESSION_COOKIE) else {
        return Err(ApiError::Unauthorized);
    };
    let token = cookie.value().to_string();

    state
        .service
        .delete_session(&token)
        .await
        .map_err(|e| ApiError::unexpected("delete session", e))?;

    let removal = Cookie::build((SESSION_COOKIE, "")).path("/").build();
    Ok((jar.remove(removal), StatusCode::OK))
}

/// Register a new account. The fresh account is logged in right away,
/// so the response carries a session cookie just like a login.
pub async fn create_user(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(form): Json<CredentialsForm>,
) -> ApiResult<impl IntoResponse> {
    info!("Registering user: {}", form.username);

    state
        .service
        .create_user(&form)
        .await
        .map_err(|e| ApiError::unexpected("create user", e))?;

    let session = state
        .service
        .create_session(&form)
        .await
        .map_err(|e| ApiError::unexpected("log in after registration", e))?;

    Ok((jar.add(session_cookie(&session.token)), StatusCode::OK))
}

/// Update the logged-in account
pub async fn update_user(
    State(state): State<AppState>,
    identity: Identity,
    Json(form): Json<UpdateForm>,
) -> ApiResult<impl IntoResponse> {
    state
        .service
        .update_user(identity.0.id, &form)
        .await
        .map_err(|e| ApiError::unexpected("update user", e))?;

    Ok(StatusCode::OK)
}

/// Public profile lookup by account id
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<UserProfile>> {
    // An id that does not even parse is an account that cannot exist
    let id: i64 = user_id.parse().map_err(|_| ApiError::NotFound)?;

    let profile = state
        .auth_client
        .get_user_by_id(id)
        .await
        .map_err(|e| ApiError::lookup("fetch user by id", e))?;

    Ok(Json(profile))
}

/// Username availability, rate limited per client address
pub async fn check_username(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(form): Json<UsernameForm>,
) -> ApiResult<Json<serde_json::Value>> {
    if !state.rate_limiter.is_allowed(&addr.ip().to_string()).await {
        return Err(ApiError::TooManyRequests);
    }

    let used = state
        .service
        .is_username_used(&form.username)
        .await
        .map_err(|e| ApiError::unexpected("check username", e))?;

    Ok(Json(serde_json::json!({ "used": used })))
}
