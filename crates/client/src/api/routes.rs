//! Centralized API route table
//!
//! All endpoint paths live here so services stay consistent and a backend
//! path change touches one file. Paths are relative to the configured base
//! URL.

/// API version prefix shared by every route.
pub const API_V1: &str = "/api/v1";

/// Authentication endpoints.
pub mod auth {
    /// Admin login.
    pub const LOGIN: &str = "/api/v1/admin/auth/login";
    /// Access-token refresh.
    pub const REFRESH: &str = "/api/v1/admin/auth/refresh";
    /// Logout.
    pub const LOGOUT: &str = "/api/v1/admin/auth/logout";
}

/// Payment endpoints.
pub mod payments {
    /// Paged listing of registrations with payment state.
    pub const LIST: &str = "/api/v1/registration";
    /// Start a payment and obtain the provider redirect.
    pub const INITIATE: &str = "/api/v1/payment/initiate";
    /// Verify a completed transaction.
    pub const VERIFY: &str = "/api/v1/payment/verify";

    /// Details of a single payment.
    #[must_use]
    pub fn details(id: &str) -> String {
        format!("/api/v1/admin/payments/{id}")
    }
}

/// Dashboard endpoints.
pub mod dashboard {
    /// Aggregate statistics.
    pub const STATS: &str = "/api/v1/admin/dashboard/stats";
    /// Most recent registrations.
    pub const RECENT: &str = "/api/v1/admin/dashboard/recent";
    /// Registrations grouped by department.
    pub const DEPARTMENTS: &str = "/api/v1/admin/dashboard/departments";
}

/// Registration endpoints.
pub mod registration {
    /// Submit a new registration.
    pub const SUBMIT: &str = "/api/v1/registration";
    /// Verify a submitted registration.
    pub const VERIFY: &str = "/api/v1/registration/verify";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_routes_are_versioned() {
        for route in [
            auth::LOGIN,
            auth::REFRESH,
            auth::LOGOUT,
            payments::LIST,
            payments::INITIATE,
            payments::VERIFY,
            dashboard::STATS,
            dashboard::RECENT,
            dashboard::DEPARTMENTS,
            registration::SUBMIT,
            registration::VERIFY,
        ] {
            assert!(route.starts_with(API_V1), "unversioned route: {route}");
        }
    }

    #[test]
    fn payment_details_interpolates_id() {
        assert_eq!(payments::details("tx-42"), "/api/v1/admin/payments/tx-42");
    }
}
