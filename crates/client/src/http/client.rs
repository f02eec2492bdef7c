//! Thin HTTP transport over reqwest
//!
//! The transport performs one call per request: there is no retry or
//! backoff at this layer. Recovery from expired credentials is the request
//! pipeline's job, and anything else propagates to the caller unchanged.

use std::time::Duration;

use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response};
use thiserror::Error;
use tracing::debug;

/// Error type for transport-level failures (no response received).
#[derive(Debug, Error)]
pub enum HttpError {
    /// The underlying client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Build(String),

    /// The request did not complete within the configured timeout.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// A connection could not be established.
    #[error("connection failed: {0}")]
    Connect(String),

    /// Any other transport failure.
    #[error("request failed: {0}")]
    Request(String),
}

impl From<reqwest::Error> for HttpError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_connect() {
            Self::Connect(err.to_string())
        } else {
            Self::Request(err.to_string())
        }
    }
}

/// HTTP client with builder-configured timeout and headers.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: ReqwestClient,
}

impl HttpClient {
    /// Start building a new HTTP client.
    #[must_use]
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Convenience constructor with default configuration.
    ///
    /// # Errors
    /// Returns an error if the underlying client cannot be constructed.
    pub fn new() -> Result<Self, HttpError> {
        Self::builder().build()
    }

    /// Create a request builder using the underlying reqwest client.
    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    /// Execute the request exactly once.
    ///
    /// Any response, whatever its status, is returned as `Ok`; `Err` means
    /// no response was received at all.
    ///
    /// # Errors
    /// Returns [`HttpError`] when the request could not be sent or timed
    /// out.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response, HttpError> {
        let request = builder.build().map_err(HttpError::from)?;

        let method = request.method().clone();
        let url = request.url().clone();
        debug!(%method, %url, "sending HTTP request");

        let response = self.client.execute(request).await?;
        debug!(%method, %url, status = %response.status(), "received HTTP response");

        Ok(response)
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    user_agent: Option<String>,
    default_headers: Option<reqwest::header::HeaderMap>,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self { timeout: Duration::from_secs(30), user_agent: None, default_headers: None }
    }
}

impl HttpClientBuilder {
    /// Set the per-request timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent header.
    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Set headers attached to every request.
    #[must_use]
    pub fn default_headers(mut self, headers: reqwest::header::HeaderMap) -> Self {
        self.default_headers = Some(headers);
        self
    }

    /// Build the configured client.
    ///
    /// # Errors
    /// Returns [`HttpError::Build`] if the underlying client cannot be
    /// constructed.
    pub fn build(self) -> Result<HttpClient, HttpError> {
        let mut builder = ReqwestClient::builder().timeout(self.timeout);

        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        if let Some(headers) = self.default_headers {
            builder = builder.default_headers(headers);
        }

        let client = builder.build().map_err(|err| HttpError::Build(err.to_string()))?;

        Ok(HttpClient { client })
    }
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;

    use reqwest::StatusCode;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn returns_successful_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpClient::new().unwrap();
        let response = client.send(client.request(Method::GET, server.uri())).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn error_statuses_are_returned_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpClient::new().unwrap();
        let response = client.send(client.request(Method::GET, server.uri())).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
    }

    #[tokio::test]
    async fn connection_failure_maps_to_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener); // release the port so the request fails with ECONNREFUSED
        let url = format!("http://{addr}");

        let client = HttpClient::new().unwrap();
        let result = client.send(client.request(Method::GET, &url)).await;

        assert!(matches!(result, Err(HttpError::Connect(_) | HttpError::Request(_))));
    }

    #[tokio::test]
    async fn builder_applies_user_agent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(wiremock::matchers::header("user-agent", "regdesk-test"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpClient::builder().user_agent("regdesk-test").build().unwrap();
        let response = client.send(client.request(Method::GET, server.uri())).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
