//! Internal account lookup client
//!
//! Other services resolve sessions and fetch account profiles through the
//! [`AuthClient`] trait. The accounts service provides an in-process
//! implementation for its own handlers; everything else talks to the
//! accounts service over its internal RPC listener via [`RemoteAuthClient`].

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{ServiceError, ServiceResult, ValidationError};
use crate::models::{SessionPayload, UserProfile};

/// Account and session lookups exposed to other services
#[async_trait]
pub trait AuthClient: Send + Sync {
    /// Fetch the profile of the account with the given id
    async fn get_user_by_id(&self, id: i64) -> ServiceResult<UserProfile>;

    /// Fetch the profile of the account with the given username
    async fn get_user_by_username(&self, username: &str) -> ServiceResult<UserProfile>;

    /// Fetch the profiles for the given ids; unknown ids are omitted
    async fn get_users_by_ids(&self, ids: &[i64]) -> ServiceResult<Vec<UserProfile>>;

    /// Resolve a session token to the payload stored against it
    async fn get_session_info(&self, token: &str) -> ServiceResult<SessionPayload>;
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserByIdRequest {
    pub id: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserByUsernameRequest {
    pub username: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UsersByIdsRequest {
    pub ids: Vec<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UsersByIdsResponse {
    pub users: Vec<UserProfile>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionInfoRequest {
    pub token: String,
}

/// Client for the accounts service internal RPC listener
#[derive(Debug, Clone)]
pub struct RemoteAuthClient {
    base_url: String,
    http: reqwest::Client,
}

impl RemoteAuthClient {
    /// Create a client for the RPC listener at `base_url`,
    /// e.g. "http://accounts:8081"
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            http: reqwest::Client::new(),
        }
    }

    async fn call<Req, Resp>(&self, method: &str, request: &Req) -> ServiceResult<Resp>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned,
    {
        let url = format!("{}/rpc/{}", self.base_url, method);
        let response = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| ServiceError::internal("rpc request failed", e))?;

        match response.status() {
            reqwest::StatusCode::OK => {
                let body = response
                    .json::<Resp>()
                    .await
                    .map_err(|e| ServiceError::internal("rpc response decode failed", e))?;
                Ok(body)
            }
            reqwest::StatusCode::NOT_FOUND => Err(ServiceError::NotExists),
            reqwest::StatusCode::BAD_REQUEST => {
                let fields = response
                    .json::<ValidationError>()
                    .await
                    .map_err(|e| ServiceError::internal("rpc error decode failed", e))?;
                Err(ServiceError::Validation(fields))
            }
            status => Err(ServiceError::Internal(anyhow::anyhow!(
                "rpc {} returned {}",
                method,
                status
            ))),
        }
    }
}

#[async_trait]
impl AuthClient for RemoteAuthClient {
    async fn get_user_by_id(&self, id: i64) -> ServiceResult<UserProfile> {
        self.call("get_user_by_id", &UserByIdRequest { id }).await
    }

    async fn get_user_by_username(&self, username: &str) -> ServiceResult<UserProfile> {
        self.call(
            "get_user_by_username",
            &UserByUsernameRequest {
                username: username.to_string(),
            },
        )
        .await
    }

    async fn get_users_by_ids(&self, ids: &[i64]) -> ServiceResult<Vec<UserProfile>> {
        let response: UsersByIdsResponse = self
            .call("get_users_by_ids", &UsersByIdsRequest { ids: ids.to_vec() })
            .await?;
        Ok(response.users)
    }

    async fn get_session_info(&self, token: &str) -> ServiceResult<SessionPayload> {
        self.call(
            "get_session_info",
            &SessionInfoRequest {
                token: token.to_string(),
            },
        )
        .await
    }
}
