//! Session-ended broadcast
//!
//! The core never navigates or renders; when a refresh cycle fails
//! terminally it emits exactly one [`SessionEvent::Ended`] and the
//! embedding UI/routing layer decides what a sign-out looks like.

use tokio::sync::broadcast;
use tracing::debug;

/// Notifications published by the auth core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// The session is gone and cannot be recovered without a new login.
    Ended,
}

/// Handle for publishing and subscribing to session events.
///
/// Cheap to clone; all clones share one channel. Events published while no
/// subscriber exists are dropped, which is fine: a UI that has not
/// subscribed yet has no session surface to tear down.
#[derive(Debug, Clone)]
pub struct SessionEvents {
    sender: broadcast::Sender<SessionEvent>,
}

impl SessionEvents {
    /// Create a new event channel.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(8);
        Self { sender }
    }

    /// Subscribe to session events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }

    /// Publish the session-ended notification.
    pub fn session_ended(&self) {
        debug!("emitting session-ended event");
        let _ = self.sender.send(SessionEvent::Ended);
    }
}

impl Default for SessionEvents {
    fn default() -> Self {
        Self::new()
    }
}
