//! Request authentication
//!
//! Handlers that need a logged-in caller take an [`Identity`] argument.
//! Extraction reads the session cookie and resolves it through the
//! account lookup client: missing cookie and dead session both answer
//! 401, lookup trouble answers 500.

use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::CookieJar;
use common::error::ServiceError;
use common::models::SessionPayload;
use tracing::error;

use crate::AppState;
use crate::error::ApiError;

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "JSESSIONID";

/// The session payload of the authenticated caller
#[derive(Debug, Clone, Copy)]
pub struct Identity(pub SessionPayload);

#[axum::async_trait]
impl FromRequestParts<AppState> for Identity {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let Some(cookie) = jar.get(SESSION_COOKIE) else {
            return Err(ApiError::Unauthorized);
        };

        let payload = state
            .auth_client
            .get_session_info(cookie.value())
            .await
            .map_err(|err| match err {
                ServiceError::Internal(err) => {
                    error!("Failed to resolve session: {:#}", err);
                    ApiError::InternalServerError
                }
                _ => ApiError::Unauthorized,
            })?;

        Ok(Identity(payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::http::{Request, header};

    use crate::models::CredentialsForm;
    use crate::rate_limiter::{RateLimiter, RateLimiterConfig};
    use crate::repositories::memory::{MemorySessionStore, MemoryUserStore};
    use crate::rpc::LocalAuthClient;
    use crate::service::AuthService;

    fn state() -> AppState {
        let service = AuthService::new(
            Arc::new(MemoryUserStore::new()),
            Arc::new(MemorySessionStore::new()),
        );
        AppState {
            service: service.clone(),
            auth_client: Arc::new(LocalAuthClient::new(service)),
            rate_limiter: RateLimiter::new(RateLimiterConfig::default()),
        }
    }

    async fn extract(state: &AppState, request: Request<()>) -> Result<Identity, ApiError> {
        let (mut parts, _) = request.into_parts();
        Identity::from_request_parts(&mut parts, state).await
    }

    #[tokio::test]
    async fn missing_cookie_is_unauthorized() {
        let state = state();
        let request = Request::builder().body(()).unwrap();

        let err = extract(&state, request).await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized));
    }

    #[tokio::test]
    async fn stale_token_is_unauthorized() {
        let state = state();
        let request = Request::builder()
            .header(header::COOKIE, format!("{}=stale-token", SESSION_COOKIE))
            .body(())
            .unwrap();

        let err = extract(&state, request).await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized));
    }

    #[tokio::test]
    async fn live_token_resolves_to_the_owner() {
        let state = state();
        let form = CredentialsForm {
            username: "kappa".to_string(),
            password: "pass".to_string(),
        };
        let profile = state.service.create_user(&form).await.unwrap();
        let session = state.service.create_session(&form).await.unwrap();

        let request = Request::builder()
            .header(
                header::COOKIE,
                format!("{}={}", SESSION_COOKIE, session.token),
            )
            .body(())
            .unwrap();

        let identity = extract(&state, request).await.unwrap();
        assert_eq!(identity.0.id, profile.id);
    }
}
