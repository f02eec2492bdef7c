//! Session and token wire types
//!
//! The backend issues opaque bearer tokens; expiry is discovered through a
//! rejected request, never decoded locally, so no expiry metadata is kept
//! here.

use serde::{Deserialize, Serialize};

/// Opaque user profile attached to a session.
///
/// Stored and returned exactly as the backend sent it; no field of it is
/// interpreted by this crate.
pub type UserProfile = serde_json::Value;

/// An authenticated session.
///
/// Invariant: a session exists iff `token` is non-empty. The store enforces
/// this on write, and clearing always removes all three fields together so
/// a reader can never observe a partial session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Bearer access token attached to authenticated requests.
    pub token: String,

    /// Refresh token used solely to obtain a new access token.
    /// Optional because the backend does not always rotate it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Profile of the signed-in user, if the backend supplied one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserProfile>,
}

impl Session {
    /// Create a session from an access token and optional companions.
    #[must_use]
    pub fn new(token: String, refresh_token: Option<String>, user: Option<UserProfile>) -> Self {
        Self { token, refresh_token, user }
    }
}

/// Token grant returned by the login and refresh endpoints.
///
/// `access_token` is optional at the wire level: the backend has been
/// observed to answer 200 without one, and that case must be treated as a
/// failed grant rather than a usable session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenGrant {
    /// Newly issued access token, when the grant is usable.
    #[serde(default)]
    pub access_token: Option<String>,

    /// Rotated refresh token, when the backend issued one.
    #[serde(default)]
    pub refresh_token: Option<String>,

    /// User profile, supplied on login and sometimes on refresh.
    #[serde(default)]
    pub user: Option<UserProfile>,
}

impl TokenGrant {
    /// The access token, if present and non-empty.
    #[must_use]
    pub fn usable_token(&self) -> Option<&str> {
        self.access_token.as_deref().filter(|token| !token.is_empty())
    }

    /// Merge this grant over an existing session.
    ///
    /// Fields the backend omitted keep their previous values, so a refresh
    /// response carrying only a new access token does not drop the stored
    /// refresh token or user profile.
    #[must_use]
    pub fn into_session(self, previous: Option<Session>) -> Option<Session> {
        let token = self.usable_token()?.to_string();
        let (prior_refresh, prior_user) =
            previous.map_or((None, None), |s| (s.refresh_token, s.user));

        Some(Session {
            token,
            refresh_token: self.refresh_token.or(prior_refresh),
            user: self.user.or(prior_user),
        })
    }
}

/// Credentials submitted to the login endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginCredentials {
    /// Account email address.
    pub email: String,
    /// Account password.
    pub password: String,
}

#[cfg(test)]
mod tests {
    //! Unit tests for auth::types.
    use serde_json::json;

    use super::*;

    #[test]
    fn token_grant_deserializes_camel_case() {
        let grant: TokenGrant = serde_json::from_value(json!({
            "accessToken": "T1",
            "refreshToken": "R1",
            "user": {"email": "a@x.com"}
        }))
        .unwrap();

        assert_eq!(grant.usable_token(), Some("T1"));
        assert_eq!(grant.refresh_token.as_deref(), Some("R1"));
        assert!(grant.user.is_some());
    }

    #[test]
    fn token_grant_tolerates_missing_fields() {
        let grant: TokenGrant = serde_json::from_value(json!({})).unwrap();
        assert!(grant.usable_token().is_none());
        assert!(grant.refresh_token.is_none());
        assert!(grant.user.is_none());
    }

    #[test]
    fn empty_access_token_is_not_usable() {
        let grant: TokenGrant = serde_json::from_value(json!({ "accessToken": "" })).unwrap();
        assert!(grant.usable_token().is_none());
    }

    #[test]
    fn into_session_keeps_prior_fields_when_grant_omits_them() {
        let previous = Session::new(
            "T1".to_string(),
            Some("R1".to_string()),
            Some(json!({"email": "a@x.com"})),
        );
        let grant: TokenGrant = serde_json::from_value(json!({ "accessToken": "T2" })).unwrap();

        let session = grant.into_session(Some(previous)).unwrap();
        assert_eq!(session.token, "T2");
        assert_eq!(session.refresh_token.as_deref(), Some("R1"));
        assert_eq!(session.user, Some(json!({"email": "a@x.com"})));
    }

    #[test]
    fn into_session_prefers_rotated_refresh_token() {
        let previous = Session::new("T1".to_string(), Some("R1".to_string()), None);
        let grant: TokenGrant =
            serde_json::from_value(json!({ "accessToken": "T2", "refreshToken": "R2" })).unwrap();

        let session = grant.into_session(Some(previous)).unwrap();
        assert_eq!(session.refresh_token.as_deref(), Some("R2"));
    }

    #[test]
    fn into_session_without_usable_token_is_none() {
        let grant: TokenGrant = serde_json::from_value(json!({ "refreshToken": "R2" })).unwrap();
        assert!(grant.into_session(None).is_none());
    }

    #[test]
    fn session_round_trips_through_json() {
        let session = Session::new("T1".to_string(), None, None);
        let encoded = serde_json::to_string(&session).unwrap();
        let decoded: Session = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, session);
        // omitted options are not serialized at all
        assert!(!encoded.contains("refresh_token"));
    }
}
