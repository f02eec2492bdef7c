//! Payment operations
//!
//! Initiation hands the caller a provider redirect URL; verification
//! confirms a transaction after the provider round-trip. Listing and
//! details back the admin payment views.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::client::ApiClient;
use super::errors::ApiError;
use super::routes;

/// Fields submitted to start a payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInitiateRequest {
    /// Registration the payment settles.
    pub registration_id: String,
    /// Amount in the smallest currency unit.
    pub amount: u64,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Payer email for the provider receipt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Successful payment initiation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInitiated {
    /// Provider checkout page to send the payer to.
    pub redirect_url: String,
    /// Transaction handle used for later verification.
    pub transaction_id: String,
}

/// Result of verifying a transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentVerification {
    /// Provider-reported transaction state (e.g. `"paid"`, `"failed"`).
    pub status: String,
    /// Remaining provider fields, passed through untouched.
    #[serde(flatten)]
    pub details: serde_json::Map<String, Value>,
}

/// Optional filters for the payment listing.
#[derive(Debug, Clone, Default)]
pub struct PaymentListParams {
    /// 1-based page index.
    pub page: Option<u32>,
    /// Page size.
    pub limit: Option<u32>,
    /// Sort expression understood by the backend.
    pub sort: Option<String>,
}

impl PaymentListParams {
    fn query_string(&self) -> String {
        let mut query = url::form_urlencoded::Serializer::new(String::new());
        if let Some(page) = self.page {
            query.append_pair("page", &page.to_string());
        }
        if let Some(limit) = self.limit {
            query.append_pair("limit", &limit.to_string());
        }
        if let Some(sort) = &self.sort {
            query.append_pair("sort", sort);
        }

        let encoded = query.finish();
        if encoded.is_empty() {
            String::new()
        } else {
            format!("?{encoded}")
        }
    }
}

/// Payment endpoint service.
#[derive(Debug, Clone)]
pub struct PaymentService {
    api: Arc<ApiClient>,
}

impl PaymentService {
    /// Create the service over the shared pipeline.
    #[must_use]
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// Start a payment and obtain the provider redirect.
    ///
    /// # Errors
    /// Returns the pipeline error if the request fails.
    pub async fn initiate(
        &self,
        request: &PaymentInitiateRequest,
    ) -> Result<PaymentInitiated, ApiError> {
        self.api.post(routes::payments::INITIATE, request).await
    }

    /// Verify a transaction after the provider round-trip.
    ///
    /// # Errors
    /// Returns the pipeline error if the request fails.
    pub async fn verify(&self, transaction_id: &str) -> Result<PaymentVerification, ApiError> {
        self.api
            .post(
                routes::payments::VERIFY,
                &serde_json::json!({ "transactionId": transaction_id }),
            )
            .await
    }

    /// List registrations with payment state.
    ///
    /// # Errors
    /// Returns the pipeline error if the request fails.
    pub async fn list(&self, params: &PaymentListParams) -> Result<Value, ApiError> {
        let path = format!("{}{}", routes::payments::LIST, params.query_string());
        self.api.get(&path).await
    }

    /// Details of a single payment.
    ///
    /// # Errors
    /// Returns the pipeline error if the request fails.
    pub async fn details(&self, id: &str) -> Result<Value, ApiError> {
        self.api.get(&routes::payments::details(id)).await
    }
}
