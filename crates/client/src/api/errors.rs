//! API error taxonomy and response classification
//!
//! Classification is pure: it looks only at a status code, so the refresh
//! trigger can be unit-tested without a network. Every failure a caller can
//! see is one of the [`ApiError`] variants; the pipeline never swallows an
//! error silently.

use reqwest::StatusCode;
use thiserror::Error;

use regdesk_common::auth::RefreshError;

use crate::http::HttpError;

/// Classification of a transport outcome that produced a status code.
///
/// Only [`ResponseClass::AuthorizationFailure`] participates in the refresh
/// flow; everything else passes through the pipeline untouched. Outcomes
/// with no response at all surface as [`HttpError`] before classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseClass {
    /// 2xx.
    Success,
    /// The presented credential was rejected (HTTP 401).
    AuthorizationFailure,
    /// Any other 4xx; not retried.
    ClientError,
    /// 5xx; not retried by this subsystem.
    ServerError,
}

/// Classify a status code for the request pipeline.
#[must_use]
pub fn classify_status(status: StatusCode) -> ResponseClass {
    if status.is_success() {
        ResponseClass::Success
    } else if status == StatusCode::UNAUTHORIZED {
        ResponseClass::AuthorizationFailure
    } else if status.is_server_error() {
        ResponseClass::ServerError
    } else {
        ResponseClass::ClientError
    }
}

/// API operation errors.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The credential was rejected and could not be recovered.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The session could not be refreshed; the session has ended.
    #[error("session refresh failed: {0}")]
    Refresh(#[from] RefreshError),

    /// Too many requests (429).
    #[error("rate limit exceeded: {0}")]
    RateLimit(String),

    /// The server failed (5xx).
    #[error("server error: {0}")]
    Server(String),

    /// The request was invalid (other 4xx) or the response unusable.
    #[error("client error: {0}")]
    Client(String),

    /// No response was received.
    #[error("network error: {0}")]
    Network(String),

    /// The request did not complete in time.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// The client was misconfigured.
    #[error("configuration error: {0}")]
    Config(String),

    /// The local session record could not be read or written.
    #[error("session storage failed: {0}")]
    Storage(String),
}

impl From<regdesk_common::auth::StoreError> for ApiError {
    fn from(err: regdesk_common::auth::StoreError) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<HttpError> for ApiError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::Timeout(msg) => Self::Timeout(msg),
            HttpError::Build(msg) => Self::Config(msg),
            HttpError::Connect(msg) | HttpError::Request(msg) => Self::Network(msg),
        }
    }
}

/// Map a non-success status to the error returned to the caller.
#[must_use]
pub fn status_error(status: StatusCode, url: &str, body: String) -> ApiError {
    let message = if body.is_empty() {
        format!("{url} returned status {status}")
    } else {
        format!("{url} returned status {status}: {body}")
    };

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        ApiError::Auth(message)
    } else if status == StatusCode::TOO_MANY_REQUESTS {
        ApiError::RateLimit(message)
    } else if status.is_server_error() {
        ApiError::Server(message)
    } else {
        ApiError::Client(message)
    }
}
