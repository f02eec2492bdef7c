//! Traits for session persistence and the refresh network call
//!
//! These traits are the injection seams of the auth core: the coordinator
//! and store are written against them so tests can swap in in-memory and
//! scripted implementations without a server or a filesystem.

use async_trait::async_trait;

use super::coordinator::RefreshError;
use super::store::StoreError;
use super::types::{Session, TokenGrant};

/// Durable storage for a single session record.
///
/// The backend stores the whole session as one value; implementations must
/// replace it atomically so a concurrent reader never observes a new access
/// token paired with a stale refresh token.
#[async_trait]
pub trait SessionBackend: Send + Sync {
    /// Load the persisted session, or `None` when nothing is stored.
    ///
    /// # Errors
    /// Returns an error if the stored record exists but cannot be read or
    /// decoded.
    async fn load(&self) -> Result<Option<Session>, StoreError>;

    /// Persist the session, replacing any previous record.
    ///
    /// # Errors
    /// Returns an error if the record cannot be written.
    async fn save(&self, session: &Session) -> Result<(), StoreError>;

    /// Remove the persisted session. Removing an absent record is not an
    /// error.
    ///
    /// # Errors
    /// Returns an error if an existing record cannot be removed.
    async fn clear(&self) -> Result<(), StoreError>;
}

/// The network call that exchanges a refresh token for a new grant.
///
/// Implementations must go straight to the transport layer rather than
/// through the request pipeline: a refresh that itself received a 401 must
/// surface as [`RefreshError::Rejected`], never re-enter the coordinator.
#[async_trait]
pub trait RefreshTransport: Send + Sync {
    /// Exchange `refresh_token` for a new token grant.
    ///
    /// # Errors
    /// Returns [`RefreshError::Rejected`] when the backend refused the
    /// token and [`RefreshError::Transport`] when no response was received.
    async fn refresh(&self, refresh_token: &str) -> Result<TokenGrant, RefreshError>;
}
