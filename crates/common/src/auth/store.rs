//! Session store: atomic snapshots over a durable backend
//!
//! Layering mirrors the rest of the auth core: `SessionStore` keeps an
//! in-memory snapshot behind a `tokio::sync::RwLock` and writes through to
//! a [`SessionBackend`]. The whole `Option<Session>` is replaced under the
//! write lock, so readers always see a complete session or none at all.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::traits::SessionBackend;
use super::types::{Session, UserProfile};

/// Error type for session storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A session with an empty access token was rejected on write.
    #[error("session rejected: access token is empty")]
    EmptyToken,

    /// Reading or writing the durable record failed.
    #[error("session storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The durable record exists but could not be decoded.
    #[error("session record could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Thread-safe session store with write-through persistence.
///
/// One store is shared by the request pipeline, the refresh coordinator,
/// and the auth service; `get` returns a snapshot that is never partially
/// updated mid-read.
pub struct SessionStore {
    backend: Arc<dyn SessionBackend>,
    current: RwLock<Option<Session>>,
}

impl SessionStore {
    /// Create a store over the given durable backend.
    #[must_use]
    pub fn new(backend: Arc<dyn SessionBackend>) -> Self {
        Self { backend, current: RwLock::new(None) }
    }

    /// Load any persisted session into memory.
    ///
    /// Should be called once on startup. Returns `true` when a session was
    /// restored.
    ///
    /// # Errors
    /// Returns an error if a stored record exists but cannot be read.
    pub async fn initialize(&self) -> Result<bool, StoreError> {
        match self.backend.load().await? {
            Some(session) => {
                *self.current.write().await = Some(session);
                info!("session store initialized with existing session");
                Ok(true)
            }
            None => {
                debug!("no persisted session found");
                Ok(false)
            }
        }
    }

    /// Current session snapshot, or `None` when signed out.
    pub async fn get(&self) -> Option<Session> {
        self.current.read().await.clone()
    }

    /// Persist `session` and make it the current snapshot.
    ///
    /// # Errors
    /// Returns [`StoreError::EmptyToken`] for a session without an access
    /// token, or a backend error if persistence fails; the in-memory
    /// snapshot is left untouched on failure.
    pub async fn set(&self, session: Session) -> Result<(), StoreError> {
        if session.token.is_empty() {
            return Err(StoreError::EmptyToken);
        }

        self.backend.save(&session).await?;
        *self.current.write().await = Some(session);

        info!("session stored");
        Ok(())
    }

    /// Remove the session from memory and durable storage.
    ///
    /// # Errors
    /// Returns a backend error if the durable record cannot be removed; the
    /// in-memory snapshot is cleared regardless, so callers are signed out
    /// either way.
    pub async fn clear(&self) -> Result<(), StoreError> {
        let result = self.backend.clear().await;
        *self.current.write().await = None;

        info!("session cleared");
        result
    }

    /// Current access token, if signed in.
    pub async fn access_token(&self) -> Option<String> {
        self.current.read().await.as_ref().map(|s| s.token.clone())
    }

    /// Current refresh token, if one was issued.
    pub async fn refresh_token(&self) -> Option<String> {
        self.current.read().await.as_ref().and_then(|s| s.refresh_token.clone())
    }

    /// Profile of the signed-in user, if known.
    pub async fn user(&self) -> Option<UserProfile> {
        self.current.read().await.as_ref().and_then(|s| s.user.clone())
    }

    /// Whether a session is currently held.
    pub async fn is_logged_in(&self) -> bool {
        self.current.read().await.is_some()
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore").finish_non_exhaustive()
    }
}

/// Durable backend storing the session as one JSON document on disk.
///
/// Writes go to a sibling temp file first and are moved into place with a
/// rename, so the record is replaced atomically and a crash mid-write can
/// never leave a half-written session behind.
#[derive(Debug, Clone)]
pub struct FileSessionBackend {
    path: PathBuf,
}

impl FileSessionBackend {
    /// Create a backend persisting to `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the durable record.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        let mut staged = self.path.as_os_str().to_owned();
        staged.push(".tmp");
        PathBuf::from(staged)
    }
}

#[async_trait]
impl SessionBackend for FileSessionBackend {
    async fn load(&self) -> Result<Option<Session>, StoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => {
                let session = serde_json::from_slice(&bytes)?;
                Ok(Some(session))
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn save(&self, session: &Session) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let staged = self.staging_path();
        let bytes = serde_json::to_vec_pretty(session)?;
        tokio::fs::write(&staged, &bytes).await?;
        tokio::fs::rename(&staged, &self.path).await?;

        debug!(path = %self.path.display(), "session record written");
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// Ephemeral in-memory backend.
///
/// Used by tests and by embedders that do not want the session to survive a
/// restart.
#[derive(Debug, Default)]
pub struct MemorySessionBackend {
    slot: parking_lot::Mutex<Option<Session>>,
}

impl MemorySessionBackend {
    /// Create an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionBackend for MemorySessionBackend {
    async fn load(&self) -> Result<Option<Session>, StoreError> {
        Ok(self.slot.lock().clone())
    }

    async fn save(&self, session: &Session) -> Result<(), StoreError> {
        *self.slot.lock() = Some(session.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        *self.slot.lock() = None;
        Ok(())
    }
}
