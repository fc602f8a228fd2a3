//! Internal RPC surface
//!
//! Other services resolve sessions and look up accounts by POSTing JSON
//! to `/rpc/<method>` on a separate listener, decoupled from the public
//! API. This service's own handlers skip the wire and use
//! [`LocalAuthClient`] instead; both paths run the same core code.

use async_trait::async_trait;
use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use common::client::{
    AuthClient, SessionInfoRequest, UserByIdRequest, UserByUsernameRequest, UsersByIdsRequest,
    UsersByIdsResponse,
};
use common::error::ServiceResult;
use common::models::{SessionPayload, UserProfile};

use crate::error::{ApiError, ApiResult};
use crate::service::AuthService;

/// In-process implementation of the account lookup interface
#[derive(Clone)]
pub struct LocalAuthClient {
    service: AuthService,
}

impl LocalAuthClient {
    /// Create a client calling straight into the given service
    pub fn new(service: AuthService) -> Self {
        Self { service }
    }
}

#[async_trait]
impl AuthClient for LocalAuthClient {
    async fn get_user_by_id(&self, id: i64) -> ServiceResult<UserProfile> {
        self.service.get_user_by_id(id).await
    }

    async fn get_user_by_username(&self, username: &str) -> ServiceResult<UserProfile> {
        self.service.get_user_by_username(username).await
    }

    async fn get_users_by_ids(&self, ids: &[i64]) -> ServiceResult<Vec<UserProfile>> {
        self.service.get_users_by_ids(ids).await
    }

    async fn get_session_info(&self, token: &str) -> ServiceResult<SessionPayload> {
        self.service.get_session_info(token).await
    }
}

/// Create the router for the internal RPC listener
pub fn create_rpc_router(service: AuthService) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/rpc/get_user_by_id", post(get_user_by_id))
        .route("/rpc/get_user_by_username", post(get_user_by_username))
        .route("/rpc/get_users_by_ids", post(get_users_by_ids))
        .route("/rpc/get_session_info", post(get_session_info))
        .with_state(service)
}

/// Health check endpoint
async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "accounts-rpc"
    }))
}

async fn get_user_by_id(
    State(service): State<AuthService>,
    Json(request): Json<UserByIdRequest>,
) -> ApiResult<Json<UserProfile>> {
    let profile = service
        .get_user_by_id(request.id)
        .await
        .map_err(|e| ApiError::lookup("fetch user by id", e))?;

    Ok(Json(profile))
}

async fn get_user_by_username(
    State(service): State<AuthService>,
    Json(request): Json<UserByUsernameRequest>,
) -> ApiResult<Json<UserProfile>> {
    let profile = service
        .get_user_by_username(&request.username)
        .await
        .map_err(|e| ApiError::lookup("fetch user by username", e))?;

    Ok(Json(profile))
}

async fn get_users_by_ids(
    State(service): State<AuthService>,
    Json(request): Json<UsersByIdsRequest>,
) -> ApiResult<Json<UsersByIdsResponse>> {
    let users = service
        .get_users_by_ids(&request.ids)
        .await
        .map_err(|e| ApiError::lookup("fetch users by ids", e))?;

    Ok(Json(UsersByIdsResponse { users }))
}

async fn get_session_info(
    State(service): State<AuthService>,
    Json(request): Json<SessionInfoRequest>,
) -> ApiResult<Json<SessionPayload>> {
    let payload = service
        .get_session_info(&request.token)
        .await
        .map_err(|e| ApiError::lookup("resolve session", e))?;

    Ok(Json(payload))
}
