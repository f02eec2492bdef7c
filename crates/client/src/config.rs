//! Client configuration
//!
//! Defaults suit local development; deployments override through the
//! environment.
//!
//! ## Environment Variables
//! - `REGDESK_API_URL`: base URL of the backend
//! - `REGDESK_HTTP_TIMEOUT_SECS`: per-request timeout in seconds
//! - `REGDESK_SESSION_FILE`: path of the durable session record
//! - `REGDESK_REFRESH_TIMEOUT_SECS`: bound on the token refresh call
//!   (unset = wait indefinitely, matching backend-driven refresh pacing)

use std::path::PathBuf;
use std::time::Duration;

use crate::api::ApiError;

/// Configuration for a [`RegDesk`](crate::RegDesk) client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL every route is appended to.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// User agent sent with every request.
    pub user_agent: String,
    /// Path of the durable session record.
    pub session_file: PathBuf,
    /// Optional bound on the refresh network call.
    pub refresh_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3002".to_string(),
            timeout: Duration::from_secs(30),
            user_agent: format!("regdesk-client/{}", env!("CARGO_PKG_VERSION")),
            session_file: PathBuf::from(".regdesk/session.json"),
            refresh_timeout: None,
        }
    }
}

impl ClientConfig {
    /// Build a configuration from the environment, falling back to
    /// defaults for unset variables.
    ///
    /// # Errors
    /// Returns [`ApiError::Config`] when a variable is set but cannot be
    /// parsed.
    pub fn from_env() -> Result<Self, ApiError> {
        let mut config = Self::default();

        if let Ok(base_url) = std::env::var("REGDESK_API_URL") {
            config.base_url = base_url;
        }
        if let Some(timeout) = env_secs("REGDESK_HTTP_TIMEOUT_SECS")? {
            config.timeout = timeout;
        }
        if let Ok(path) = std::env::var("REGDESK_SESSION_FILE") {
            config.session_file = PathBuf::from(path);
        }
        config.refresh_timeout = env_secs("REGDESK_REFRESH_TIMEOUT_SECS")?;

        Ok(config)
    }
}

fn env_secs(name: &str) -> Result<Option<Duration>, ApiError> {
    match std::env::var(name) {
        Ok(value) => {
            let secs = value
                .parse::<u64>()
                .map_err(|err| ApiError::Config(format!("invalid {name}: {err}")))?;
            Ok(Some(Duration::from_secs(secs)))
        }
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_target_local_development() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:3002");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.refresh_timeout.is_none());
    }

    #[test]
    fn environment_overrides_defaults() {
        std::env::set_var("REGDESK_API_URL", "https://api.example.com");
        std::env::set_var("REGDESK_HTTP_TIMEOUT_SECS", "10");
        std::env::set_var("REGDESK_REFRESH_TIMEOUT_SECS", "7");

        let config = ClientConfig::from_env().unwrap();
        assert_eq!(config.base_url, "https://api.example.com");
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.refresh_timeout, Some(Duration::from_secs(7)));

        std::env::remove_var("REGDESK_API_URL");
        std::env::remove_var("REGDESK_HTTP_TIMEOUT_SECS");
        std::env::remove_var("REGDESK_REFRESH_TIMEOUT_SECS");
    }

    #[test]
    fn unparseable_timeout_is_a_config_error() {
        std::env::set_var("REGDESK_BAD_SECS_TEST", "soon");
        let result = env_secs("REGDESK_BAD_SECS_TEST");
        assert!(matches!(result, Err(ApiError::Config(_))));
        std::env::remove_var("REGDESK_BAD_SECS_TEST");
    }
}
