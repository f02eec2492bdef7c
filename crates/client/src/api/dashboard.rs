//! Admin dashboard data endpoints

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::client::ApiClient;
use super::errors::ApiError;
use super::routes;

/// Aggregate statistics for the admin dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    /// Total registrations on record.
    #[serde(default)]
    pub total_registrations: u64,
    /// Total completed payments.
    #[serde(default)]
    pub total_payments: u64,
    /// Remaining backend fields, passed through untouched.
    #[serde(flatten)]
    pub details: serde_json::Map<String, Value>,
}

/// Registration count for one department.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentCount {
    /// Department name.
    pub department: String,
    /// Registrations in that department.
    pub count: u64,
}

/// Dashboard endpoint service.
#[derive(Debug, Clone)]
pub struct DashboardService {
    api: Arc<ApiClient>,
}

impl DashboardService {
    /// Create the service over the shared pipeline.
    #[must_use]
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// Aggregate statistics.
    ///
    /// # Errors
    /// Returns the pipeline error if the request fails.
    pub async fn stats(&self) -> Result<DashboardStats, ApiError> {
        self.api.get(routes::dashboard::STATS).await
    }

    /// Most recent registrations.
    ///
    /// # Errors
    /// Returns the pipeline error if the request fails.
    pub async fn recent(&self, limit: u32) -> Result<Vec<Value>, ApiError> {
        let path = format!("{}?limit={limit}", routes::dashboard::RECENT);
        self.api.get(&path).await
    }

    /// Registrations grouped by department.
    ///
    /// # Errors
    /// Returns the pipeline error if the request fails.
    pub async fn departments(&self) -> Result<Vec<DepartmentCount>, ApiError> {
        self.api.get(routes::dashboard::DEPARTMENTS).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_tolerate_missing_and_extra_fields() {
        let stats: DashboardStats = serde_json::from_value(serde_json::json!({
            "totalRegistrations": 120,
            "revenue": 45000
        }))
        .unwrap();
        assert_eq!(stats.total_registrations, 120);
        assert_eq!(stats.total_payments, 0);
        assert_eq!(stats.details["revenue"], 45000);
    }

    #[test]
    fn department_counts_deserialize() {
        let counts: Vec<DepartmentCount> = serde_json::from_value(serde_json::json!([
            {"department": "CSE", "count": 40},
            {"department": "EEE", "count": 25}
        ]))
        .unwrap();
        assert_eq!(counts.len(), 2);
        assert_eq!(counts[0].department, "CSE");
        assert_eq!(counts[1].count, 25);
    }
}
