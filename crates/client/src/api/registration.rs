//! Registration submission and verification

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::client::ApiClient;
use super::errors::ApiError;
use super::routes;

/// Fields submitted for a new registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRequest {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Contact email; also the verification target.
    pub email: String,
    /// Department the registrant belongs to.
    pub department: String,
    /// Optional contact phone.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Acknowledgement of a submitted registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationSubmitted {
    /// Identifier of the created registration.
    pub id: String,
    /// Backend-reported state (e.g. `"pending"`).
    #[serde(default)]
    pub status: Option<String>,
    /// Remaining backend fields, passed through untouched.
    #[serde(flatten)]
    pub details: serde_json::Map<String, Value>,
}

/// Fields submitted to verify a registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationVerifyRequest {
    /// Email the verification code was sent to.
    pub email: String,
    /// Verification code.
    pub code: String,
}

/// Result of a verification attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationVerification {
    /// Whether the registration is now verified.
    #[serde(default)]
    pub verified: bool,
    /// Remaining backend fields, passed through untouched.
    #[serde(flatten)]
    pub details: serde_json::Map<String, Value>,
}

/// Registration endpoint service.
#[derive(Debug, Clone)]
pub struct RegistrationService {
    api: Arc<ApiClient>,
}

impl RegistrationService {
    /// Create the service over the shared pipeline.
    #[must_use]
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// Submit a new registration.
    ///
    /// # Errors
    /// Returns the pipeline error if the request fails.
    pub async fn submit(
        &self,
        request: &RegistrationRequest,
    ) -> Result<RegistrationSubmitted, ApiError> {
        self.api.post(routes::registration::SUBMIT, request).await
    }

    /// Verify a submitted registration.
    ///
    /// # Errors
    /// Returns the pipeline error if the request fails.
    pub async fn verify(
        &self,
        request: &RegistrationVerifyRequest,
    ) -> Result<RegistrationVerification, ApiError> {
        self.api.post(routes::registration::VERIFY, request).await
    }
}
