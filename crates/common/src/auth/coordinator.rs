//! Single-flight token refresh with FIFO waiter fan-out
//!
//! Refresh is a side-effecting, rate-limited network call: the backend may
//! rotate or invalidate the previous refresh token, so a storm of rejected
//! requests must produce exactly one refresh. The first caller to find the
//! coordinator idle becomes the *leader* and performs the call; every
//! caller arriving while it is in flight is enqueued as a *follower* and
//! suspended until the leader settles. The leader then drains the queue in
//! arrival order, handing every waiter the same outcome.
//!
//! The state mutex is only ever held for the enqueue/transition and the
//! drain, never across an `.await`.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use super::signal::SessionEvents;
use super::store::SessionStore;
use super::traits::RefreshTransport;

/// Error type for a failed refresh cycle.
///
/// Cloneable so a single failure can be fanned out to every queued waiter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefreshError {
    /// No refresh token is stored; nothing to exchange.
    #[error("no refresh token available")]
    NoRefreshToken,

    /// The backend refused the refresh token.
    #[error("refresh rejected by server: {0}")]
    Rejected(String),

    /// The refresh call produced no response.
    #[error("refresh transport failed: {0}")]
    Transport(String),

    /// The backend answered success but supplied no usable access token.
    #[error("refresh response contained no usable access token")]
    EmptyGrant,

    /// The refresh call exceeded its configured bound.
    #[error("refresh timed out after {0:?}")]
    TimedOut(Duration),

    /// The refreshed session could not be persisted.
    #[error("refreshed session could not be persisted: {0}")]
    Persist(String),

    /// The in-flight refresh went away without resolving this waiter.
    #[error("refresh was interrupted before completion")]
    Interrupted,
}

type Waiter = oneshot::Sender<Result<String, RefreshError>>;

enum RefreshState {
    Idle,
    Refreshing { waiters: Vec<Waiter> },
}

/// Coordinates token refresh across all concurrent request flows.
///
/// One coordinator exists per client; the request pipeline calls
/// [`await_fresh_token`](Self::await_fresh_token) whenever a request is
/// rejected with an authorization failure. Whatever the outcome, the
/// coordinator always returns to idle and is ready for a fresh login.
pub struct RefreshCoordinator {
    transport: Arc<dyn RefreshTransport>,
    store: Arc<SessionStore>,
    events: SessionEvents,
    state: Mutex<RefreshState>,
    refresh_timeout: Option<Duration>,
}

impl RefreshCoordinator {
    /// Create a coordinator over the given transport, store, and signal.
    #[must_use]
    pub fn new(
        transport: Arc<dyn RefreshTransport>,
        store: Arc<SessionStore>,
        events: SessionEvents,
    ) -> Self {
        Self { transport, store, events, state: Mutex::new(RefreshState::Idle), refresh_timeout: None }
    }

    /// Bound the refresh network call.
    ///
    /// Without a bound a hung refresh stalls every follower indefinitely;
    /// with one, expiry fails the whole cycle with
    /// [`RefreshError::TimedOut`] and the normal failure teardown runs.
    #[must_use]
    pub fn with_refresh_timeout(mut self, timeout: Duration) -> Self {
        self.refresh_timeout = Some(timeout);
        self
    }

    /// Obtain a fresh access token, joining any refresh already in flight.
    ///
    /// The first caller becomes the leader and performs the network call;
    /// concurrent callers suspend and receive the leader's outcome. On
    /// success the new session is already persisted when this returns; on
    /// failure the session is cleared, every waiter receives the same
    /// error, and one session-ended event has been emitted.
    ///
    /// # Errors
    /// Returns the [`RefreshError`] that settled the cycle.
    pub async fn await_fresh_token(&self) -> Result<String, RefreshError> {
        let enrollment = {
            let mut state = self.state.lock();
            match &mut *state {
                RefreshState::Refreshing { waiters } => {
                    let (tx, rx) = oneshot::channel();
                    waiters.push(tx);
                    debug!(queued = waiters.len(), "refresh in flight, caller enqueued");
                    Some(rx)
                }
                RefreshState::Idle => {
                    *state = RefreshState::Refreshing { waiters: Vec::new() };
                    None
                }
            }
        };

        match enrollment {
            Some(waiter) => waiter.await.unwrap_or(Err(RefreshError::Interrupted)),
            None => self.lead_refresh().await,
        }
    }

    /// Whether a refresh cycle is currently in flight.
    pub fn is_refreshing(&self) -> bool {
        matches!(*self.state.lock(), RefreshState::Refreshing { .. })
    }

    #[cfg(test)]
    fn waiter_count(&self) -> usize {
        match &*self.state.lock() {
            RefreshState::Refreshing { waiters } => waiters.len(),
            RefreshState::Idle => 0,
        }
    }

    /// Leader path: perform the refresh, settle the queue, return the
    /// leader's own outcome.
    async fn lead_refresh(&self) -> Result<String, RefreshError> {
        debug!("leading token refresh");
        let outcome = self.perform_refresh().await;

        if let Err(err) = &outcome {
            warn!(error = %err, "token refresh failed, ending session");
            if let Err(clear_err) = self.store.clear().await {
                warn!(error = %clear_err, "failed to remove persisted session");
            }
        }

        self.drain(&outcome);

        match &outcome {
            Ok(_) => info!("token refresh succeeded"),
            Err(_) => self.events.session_ended(),
        }

        outcome
    }

    /// Exchange the stored refresh token for a new session.
    async fn perform_refresh(&self) -> Result<String, RefreshError> {
        let refresh_token =
            self.store.refresh_token().await.ok_or(RefreshError::NoRefreshToken)?;

        let grant = match self.refresh_timeout {
            Some(limit) => tokio::time::timeout(limit, self.transport.refresh(&refresh_token))
                .await
                .unwrap_or(Err(RefreshError::TimedOut(limit)))?,
            None => self.transport.refresh(&refresh_token).await?,
        };

        let previous = self.store.get().await;
        let session = grant.into_session(previous).ok_or(RefreshError::EmptyGrant)?;
        let token = session.token.clone();

        self.store.set(session).await.map_err(|err| RefreshError::Persist(err.to_string()))?;

        Ok(token)
    }

    /// Resolve every queued waiter with the settled outcome and return the
    /// coordinator to idle. Waiters are resolved in arrival order.
    fn drain(&self, outcome: &Result<String, RefreshError>) {
        let waiters = {
            let mut state = self.state.lock();
            match std::mem::replace(&mut *state, RefreshState::Idle) {
                RefreshState::Refreshing { waiters } => waiters,
                RefreshState::Idle => Vec::new(),
            }
        };

        debug!(waiters = waiters.len(), "settling queued requests");
        for waiter in waiters {
            // A waiter whose caller went away is fine to skip.
            let _ = waiter.send(outcome.clone());
        }
    }
}

impl std::fmt::Debug for RefreshCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshCoordinator")
            .field("refreshing", &self.is_refreshing())
            .field("refresh_timeout", &self.refresh_timeout)
            .finish_non_exhaustive()
    }
}
