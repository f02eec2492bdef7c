//! Authentication service and refresh transport
//!
//! [`AuthService`] drives login/logout through the request pipeline.
//! [`RefreshEndpoint`] is the coordinator's network call and deliberately
//! bypasses the pipeline: a refresh that is itself rejected must surface as
//! a refresh failure, never re-enter the coordinator.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Method;
use serde_json::json;
use tracing::{info, warn};

use regdesk_common::auth::{
    LoginCredentials, RefreshError, RefreshTransport, Session, SessionStore, TokenGrant,
    UserProfile,
};

use super::client::ApiClient;
use super::errors::{status_error, ApiError};
use super::routes;
use crate::http::HttpClient;

/// Login, logout, and session inspection.
#[derive(Debug, Clone)]
pub struct AuthService {
    api: Arc<ApiClient>,
    store: Arc<SessionStore>,
}

impl AuthService {
    /// Create the service over the shared pipeline and store.
    #[must_use]
    pub fn new(api: Arc<ApiClient>, store: Arc<SessionStore>) -> Self {
        Self { api, store }
    }

    /// Log in with email and password.
    ///
    /// A 200 response without a usable access token is an authentication
    /// failure, not a session. On success the full grant (token, optional
    /// refresh token, optional user profile) is persisted as one session.
    ///
    /// # Errors
    /// Returns [`ApiError::Auth`] for rejected credentials or an unusable
    /// grant, and the transport/storage errors of the underlying layers.
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<Session, ApiError> {
        let grant: TokenGrant = self.api.post(routes::auth::LOGIN, credentials).await?;

        let session = grant.into_session(None).ok_or_else(|| {
            ApiError::Auth("login response did not include an access token".to_string())
        })?;

        self.store.set(session.clone()).await?;

        info!("login succeeded");
        Ok(session)
    }

    /// Log out.
    ///
    /// The local session is cleared whatever the network outcome; a failed
    /// logout call leaves the caller signed out locally and the error is
    /// returned for reporting.
    ///
    /// # Errors
    /// Returns the network or HTTP error of the logout call after the local
    /// session has been cleared.
    pub async fn logout(&self) -> Result<(), ApiError> {
        let outcome = self.api.execute(Method::POST, routes::auth::LOGOUT, None).await;

        self.store.clear().await?;
        info!("local session cleared");

        match outcome {
            Ok(response) if response.status().is_success() => Ok(()),
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                warn!(%status, "logout call rejected");
                Err(status_error(status, routes::auth::LOGOUT, body))
            }
            Err(err) => {
                warn!(error = %err, "logout call failed");
                Err(err)
            }
        }
    }

    /// Whether a session is currently held.
    pub async fn is_logged_in(&self) -> bool {
        self.store.is_logged_in().await
    }

    /// Current session snapshot, if signed in.
    pub async fn session(&self) -> Option<Session> {
        self.store.get().await
    }

    /// Profile of the signed-in user, if known.
    pub async fn current_user(&self) -> Option<UserProfile> {
        self.store.user().await
    }
}

/// The refresh network call used by the coordinator.
///
/// Posts the stored refresh token to the refresh route over the bare
/// transport (no bearer header, no pipeline).
#[derive(Debug, Clone)]
pub struct RefreshEndpoint {
    http: HttpClient,
    refresh_url: String,
}

impl RefreshEndpoint {
    /// Create the endpoint for the given base URL.
    #[must_use]
    pub fn new(http: HttpClient, base_url: &str) -> Self {
        Self { http, refresh_url: format!("{base_url}{}", routes::auth::REFRESH) }
    }
}

#[async_trait]
impl RefreshTransport for RefreshEndpoint {
    async fn refresh(&self, refresh_token: &str) -> Result<TokenGrant, RefreshError> {
        let request = self
            .http
            .request(Method::POST, &self.refresh_url)
            .header(CONTENT_TYPE, "application/json")
            .json(&json!({ "refreshToken": refresh_token }));

        let response = self
            .http
            .send(request)
            .await
            .map_err(|err| RefreshError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = if body.is_empty() {
                format!("status {status}")
            } else {
                format!("status {status}: {body}")
            };
            return Err(RefreshError::Rejected(detail));
        }

        response
            .json::<TokenGrant>()
            .await
            .map_err(|err| RefreshError::Rejected(format!("unreadable refresh response: {err}")))
    }
}
