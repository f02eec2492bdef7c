//! Request pipeline with transparent credential recovery
//!
//! Every outbound API call flows through [`ApiClient`]: it attaches the
//! current access token, dispatches through the transport, and on an
//! authorization failure asks the refresh coordinator for a fresh token and
//! replays the request exactly once. The attempt counter is immutable state
//! of the send loop, so a request that fails authorization after its single
//! replay is returned as-is rather than looping.

use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument};

use regdesk_common::auth::{RefreshCoordinator, SessionStore};

use super::errors::{classify_status, status_error, ApiError, ResponseClass};
use crate::http::HttpClient;

/// Configuration for the request pipeline.
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// Base URL every route is appended to (e.g. `http://localhost:3002`).
    pub base_url: String,
}

/// The authenticated request pipeline.
///
/// Cheap to share behind an `Arc`; one instance serves every endpoint
/// service of a client.
pub struct ApiClient {
    http: HttpClient,
    store: Arc<SessionStore>,
    coordinator: Arc<RefreshCoordinator>,
    config: ApiClientConfig,
}

impl ApiClient {
    /// Create a builder for fluent configuration.
    #[must_use]
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    /// Execute a request and return the raw response.
    ///
    /// The response is returned whatever its status; only transport
    /// failures and terminal refresh failures surface as `Err`. Most
    /// callers want the typed [`get`](Self::get) / [`post`](Self::post)
    /// instead.
    ///
    /// # Errors
    /// Returns [`ApiError::Network`]/[`ApiError::Timeout`] when no response
    /// was received and [`ApiError::Refresh`] when the credential was
    /// rejected and could not be refreshed.
    pub async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Response, ApiError> {
        let mut token = self.store.access_token().await;

        // One replay at most: 0 = first send, 1 = already retried after a
        // refresh, never recovered again.
        let mut attempt: u8 = 0;
        loop {
            let response = self.dispatch(&method, path, body, token.as_deref()).await?;

            match classify_status(response.status()) {
                ResponseClass::AuthorizationFailure if attempt == 0 => {
                    attempt = 1;
                    debug!(path, "authorization failure, awaiting fresh token");
                    token = Some(self.coordinator.await_fresh_token().await?);
                }
                _ => return Ok(response),
            }
        }
    }

    /// Execute a GET request and deserialize the response.
    ///
    /// # Errors
    /// Returns an error if the request fails, the status is not a success,
    /// or the body cannot be deserialized.
    #[instrument(skip(self), fields(path = %path))]
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.execute(Method::GET, path, None).await?;
        Self::decode(path, response).await
    }

    /// Execute a POST request and deserialize the response.
    ///
    /// # Errors
    /// Returns an error if the body cannot be serialized, the request
    /// fails, the status is not a success, or the response cannot be
    /// deserialized.
    #[instrument(skip(self, body), fields(path = %path))]
    pub async fn post<B: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, ApiError> {
        let body = serde_json::to_value(body)
            .map_err(|err| ApiError::Client(format!("failed to serialize body: {err}")))?;

        let response = self.execute(Method::POST, path, Some(&body)).await?;
        Self::decode(path, response).await
    }

    /// Session store shared with the rest of the client.
    #[must_use]
    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Send one request with the given credential.
    async fn dispatch(
        &self,
        method: &Method,
        path: &str,
        body: Option<&Value>,
        token: Option<&str>,
    ) -> Result<Response, ApiError> {
        let url = format!("{}{}", self.config.base_url, path);

        let mut request = self
            .http
            .request(method.clone(), &url)
            .header(CONTENT_TYPE, "application/json");

        if let Some(token) = token {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        } else {
            debug!(%url, "no session token, sending unauthenticated");
        }

        if let Some(body) = body {
            request = request.json(body);
        }

        self.http.send(request).await.map_err(ApiError::from)
    }

    /// Turn a raw response into the caller's typed result.
    async fn decode<T: DeserializeOwned>(path: &str, response: Response) -> Result<T, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, path, body));
        }

        // 204/205 have no body by RFC spec
        if status == StatusCode::NO_CONTENT || status == StatusCode::RESET_CONTENT {
            return serde_json::from_value(Value::Null).map_err(|_| {
                ApiError::Client(format!(
                    "no-content response ({}), but response type cannot be deserialized from an empty body",
                    status.as_u16()
                ))
            });
        }

        response
            .json()
            .await
            .map_err(|err| ApiError::Client(format!("failed to parse response: {err}")))
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient").field("base_url", &self.config.base_url).finish_non_exhaustive()
    }
}

/// Builder for [`ApiClient`].
#[derive(Default)]
pub struct ApiClientBuilder {
    base_url: Option<String>,
    http: Option<HttpClient>,
    store: Option<Arc<SessionStore>>,
    coordinator: Option<Arc<RefreshCoordinator>>,
}

impl ApiClientBuilder {
    /// Set the base URL.
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the HTTP transport. Defaults to a transport with default
    /// configuration.
    #[must_use]
    pub fn http(mut self, http: HttpClient) -> Self {
        self.http = Some(http);
        self
    }

    /// Set the session store.
    #[must_use]
    pub fn store(mut self, store: Arc<SessionStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the refresh coordinator.
    #[must_use]
    pub fn coordinator(mut self, coordinator: Arc<RefreshCoordinator>) -> Self {
        self.coordinator = Some(coordinator);
        self
    }

    /// Build the pipeline.
    ///
    /// # Errors
    /// Returns [`ApiError::Config`] when a required collaborator is missing
    /// or the default transport cannot be built.
    pub fn build(self) -> Result<ApiClient, ApiError> {
        let base_url =
            self.base_url.ok_or_else(|| ApiError::Config("base URL not set".to_string()))?;
        let store =
            self.store.ok_or_else(|| ApiError::Config("session store not set".to_string()))?;
        let coordinator = self
            .coordinator
            .ok_or_else(|| ApiError::Config("refresh coordinator not set".to_string()))?;

        let http = match self.http {
            Some(http) => http,
            None => HttpClient::new().map_err(ApiError::from)?,
        };

        Ok(ApiClient { http, store, coordinator, config: ApiClientConfig { base_url } })
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use regdesk_common::auth::{
        MemorySessionBackend, RefreshError, RefreshTransport, Session, SessionEvents, TokenGrant,
    };

    use super::*;

    /// Transport stub for flows that never reach the refresh endpoint.
    struct RejectingTransport;

    #[async_trait]
    impl RefreshTransport for RejectingTransport {
        async fn refresh(&self, _refresh_token: &str) -> Result<TokenGrant, RefreshError> {
            Err(RefreshError::Rejected("not expected in this test".to_string()))
        }
    }

    fn pipeline(base_url: &str) -> (ApiClient, Arc<SessionStore>) {
        let store = Arc::new(SessionStore::new(Arc::new(MemorySessionBackend::new())));
        let coordinator = Arc::new(RefreshCoordinator::new(
            Arc::new(RejectingTransport),
            store.clone(),
            SessionEvents::new(),
        ));
        let client = ApiClient::builder()
            .base_url(base_url)
            .store(store.clone())
            .coordinator(coordinator)
            .build()
            .unwrap();
        (client, store)
    }

    #[derive(Debug, serde::Serialize, serde::Deserialize, PartialEq)]
    struct TestResponse {
        message: String,
    }

    #[tokio::test]
    async fn builder_requires_base_url() {
        let store = Arc::new(SessionStore::new(Arc::new(MemorySessionBackend::new())));
        let coordinator = Arc::new(RefreshCoordinator::new(
            Arc::new(RejectingTransport),
            store.clone(),
            SessionEvents::new(),
        ));

        let result = ApiClient::builder().store(store).coordinator(coordinator).build();
        assert!(matches!(result, Err(ApiError::Config(_))));
    }

    #[tokio::test]
    async fn builder_requires_collaborators() {
        let result = ApiClient::builder().base_url("http://localhost").build();
        assert!(matches!(result, Err(ApiError::Config(_))));
    }

    #[tokio::test]
    async fn get_attaches_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data"))
            .and(header("Authorization", "Bearer T1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(TestResponse { message: "ok".to_string() }),
            )
            .expect(1)
            .mount(&server)
            .await;

        let (client, store) = pipeline(&server.uri());
        store.set(Session::new("T1".to_string(), None, None)).await.unwrap();

        let result: TestResponse = client.get("/data").await.unwrap();
        assert_eq!(result.message, "ok");
    }

    #[tokio::test]
    async fn request_without_session_goes_out_unauthenticated() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/open"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "ok"})))
            .expect(1)
            .mount(&server)
            .await;

        let (client, _store) = pipeline(&server.uri());
        let result: TestResponse = client.post("/open", &json!({"k": "v"})).await.unwrap();
        assert_eq!(result.message, "ok");

        let requests = server.received_requests().await.unwrap();
        assert!(requests[0].headers.get("Authorization").is_none());
    }

    #[tokio::test]
    async fn no_content_deserializes_to_unit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/no-content"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let (client, _store) = pipeline(&server.uri());
        let result: Result<(), ApiError> = client.get("/no-content").await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn server_errors_map_to_server_variant() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/broken"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let (client, _store) = pipeline(&server.uri());
        let result: Result<TestResponse, ApiError> = client.get("/broken").await;
        assert!(matches!(result, Err(ApiError::Server(_))));
    }

    #[tokio::test]
    async fn client_errors_are_not_recovered() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let (client, _store) = pipeline(&server.uri());
        let result: Result<TestResponse, ApiError> = client.get("/missing").await;
        assert!(matches!(result, Err(ApiError::Client(_))));
    }
}
