//! RegDesk client SDK
//!
//! HTTP client layer for the RegDesk platform. Every outbound call flows
//! through one request pipeline that attaches the current access token and
//! transparently recovers from expired credentials: the first rejected
//! request triggers a single token refresh, concurrent rejected requests
//! wait on that same refresh, and each is replayed once with the new token.
//! When a refresh fails terminally, the session is cleared and a single
//! session-ended event is broadcast for the embedding UI to act on.
//!
//! # Usage
//!
//! ```no_run
//! use regdesk_client::{ClientConfig, RegDesk};
//! use regdesk_common::auth::LoginCredentials;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = RegDesk::new(ClientConfig::from_env()?)?;
//!
//!     // Restore a persisted session, if any
//!     client.initialize().await?;
//!
//!     if !client.auth().is_logged_in().await {
//!         client
//!             .auth()
//!             .login(&LoginCredentials {
//!                 email: "admin@example.com".to_string(),
//!                 password: "secret".to_string(),
//!             })
//!             .await?;
//!     }
//!
//!     // React to terminal session loss (e.g. route to the login screen)
//!     let mut events = client.events().subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("session event: {event:?}");
//!         }
//!     });
//!
//!     let stats = client.dashboard().stats().await?;
//!     println!("registrations: {}", stats.total_registrations);
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod http;

use std::sync::Arc;

use regdesk_common::auth::{
    FileSessionBackend, RefreshCoordinator, Session, SessionBackend, SessionEvents, SessionStore,
};

use api::auth::RefreshEndpoint;
use api::{ApiClient, ApiError, AuthService, DashboardService, PaymentService, RegistrationService};
pub use config::ClientConfig;
use http::HttpClient;

/// A fully wired RegDesk client.
///
/// Owns the session store, the refresh coordinator, the request pipeline,
/// and one service per endpoint group. All of them share state by
/// reference, so any number of concurrent calls observe one session and at
/// most one refresh.
pub struct RegDesk {
    store: Arc<SessionStore>,
    events: SessionEvents,
    auth: AuthService,
    payments: PaymentService,
    registration: RegistrationService,
    dashboard: DashboardService,
}

impl RegDesk {
    /// Create a client with a file-backed session store at the configured
    /// path.
    ///
    /// # Errors
    /// Returns [`ApiError::Config`] if the HTTP transport cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let backend: Arc<dyn SessionBackend> =
            Arc::new(FileSessionBackend::new(config.session_file.clone()));
        Self::with_backend(config, backend)
    }

    /// Create a client over a custom session backend.
    ///
    /// # Errors
    /// Returns [`ApiError::Config`] if the HTTP transport cannot be built.
    pub fn with_backend(
        config: ClientConfig,
        backend: Arc<dyn SessionBackend>,
    ) -> Result<Self, ApiError> {
        let store = Arc::new(SessionStore::new(backend));
        let events = SessionEvents::new();

        let http = HttpClient::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(ApiError::from)?;

        let transport = Arc::new(RefreshEndpoint::new(http.clone(), &config.base_url));
        let mut coordinator = RefreshCoordinator::new(transport, store.clone(), events.clone());
        if let Some(limit) = config.refresh_timeout {
            coordinator = coordinator.with_refresh_timeout(limit);
        }
        let coordinator = Arc::new(coordinator);

        let api = Arc::new(
            ApiClient::builder()
                .base_url(config.base_url.clone())
                .http(http)
                .store(store.clone())
                .coordinator(coordinator)
                .build()?,
        );

        Ok(Self {
            store: store.clone(),
            events,
            auth: AuthService::new(api.clone(), store),
            payments: PaymentService::new(api.clone()),
            registration: RegistrationService::new(api.clone()),
            dashboard: DashboardService::new(api),
        })
    }

    /// Restore a persisted session into memory.
    ///
    /// Call once on startup. Returns `true` when a session was restored.
    ///
    /// # Errors
    /// Returns [`ApiError::Storage`] if a stored record exists but cannot
    /// be read.
    pub async fn initialize(&self) -> Result<bool, ApiError> {
        self.store.initialize().await.map_err(ApiError::from)
    }

    /// Authentication operations.
    #[must_use]
    pub fn auth(&self) -> &AuthService {
        &self.auth
    }

    /// Payment operations.
    #[must_use]
    pub fn payments(&self) -> &PaymentService {
        &self.payments
    }

    /// Registration operations.
    #[must_use]
    pub fn registration(&self) -> &RegistrationService {
        &self.registration
    }

    /// Dashboard data.
    #[must_use]
    pub fn dashboard(&self) -> &DashboardService {
        &self.dashboard
    }

    /// Session event channel for the embedding UI layer.
    #[must_use]
    pub fn events(&self) -> &SessionEvents {
        &self.events
    }

    /// Current session snapshot, if signed in.
    pub async fn session(&self) -> Option<Session> {
        self.store.get().await
    }
}

impl std::fmt::Debug for RegDesk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegDesk").finish_non_exhaustive()
    }
}
