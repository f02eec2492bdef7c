//! Session lifecycle and coordinated token refresh
//!
//! This module provides the authentication core shared by every RegDesk
//! client surface:
//!
//! - **Session model**: access token, optional refresh token, optional user
//!   profile, persisted and cleared as one unit
//! - **Session store**: atomic in-memory snapshots over a pluggable durable
//!   backend
//! - **Refresh coordinator**: single-flight token refresh with FIFO fan-out
//!   to every request that failed while the refresh was in flight
//! - **Session signal**: a one-way "session ended" broadcast consumed by
//!   the embedding UI layer
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────┐
//! │ RefreshCoordinator │  Single-flight refresh + waiter queue
//! └─────────┬──────────┘
//!           │
//!           ├──► RefreshTransport   (injected network call)
//!           ├──► SessionStore       (atomic session snapshots)
//!           │         │
//!           │         └──► SessionBackend  (file or in-memory persistence)
//!           │
//!           └──► SessionEvents      ("session ended" broadcast)
//! ```
//!
//! The coordinator is instantiated once per client and shared by reference;
//! it never performs navigation or any other UI side effect.

pub mod coordinator;
pub mod signal;
pub mod store;
pub mod traits;
pub mod types;

pub use coordinator::{RefreshCoordinator, RefreshError};
pub use signal::{SessionEvent, SessionEvents};
pub use store::{FileSessionBackend, MemorySessionBackend, SessionStore, StoreError};
pub use traits::{RefreshTransport, SessionBackend};
pub use types::{LoginCredentials, Session, TokenGrant, UserProfile};
