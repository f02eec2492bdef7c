//! Shared authentication foundation for the RegDesk client SDK.
//!
//! This crate owns the session data model, the durable session store, the
//! refresh coordinator, and the session-ended signal. It carries no HTTP
//! stack of its own; network calls are injected through the
//! [`auth::RefreshTransport`] trait so the coordinator can be exercised
//! without a server.

pub mod auth;
