//! API surface: request pipeline, error taxonomy, routes, and endpoint
//! services.

pub mod auth;
pub mod client;
pub mod dashboard;
pub mod errors;
pub mod payments;
pub mod registration;
pub mod routes;

pub use auth::{AuthService, RefreshEndpoint};
pub use client::{ApiClient, ApiClientBuilder, ApiClientConfig};
pub use dashboard::{DashboardService, DashboardStats, DepartmentCount};
pub use errors::{classify_status, status_error, ApiError, ResponseClass};
pub use payments::{
    PaymentInitiateRequest, PaymentInitiated, PaymentListParams, PaymentService,
    PaymentVerification,
};
pub use registration::{
    RegistrationRequest, RegistrationService, RegistrationSubmitted, RegistrationVerification,
    RegistrationVerifyRequest,
};
