use serde::{Deserialize, Serialize};
use crate::core::TierBuckets;
use crate::models::domain::Profile;

/// Output of the filter engine: non-spa and spa matches in input order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilteredResult {
    pub profiles: Vec<Profile>,
    pub spas: Vec<Profile>,
    pub total_count: usize,
}

/// Response for the listings endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingsResponse {
    pub profiles: Vec<Profile>,
    pub spas: Vec<Profile>,
    pub total_count: usize,
    pub has_active_filters: bool,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tiers: Option<TierBuckets>,
    pub error: Option<String>,
}

/// Response for a forced refresh
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub success: bool,
    pub total_count: usize,
    pub error: Option<String>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub profiles: usize,
    pub stale: bool,
    pub last_fetch: Option<chrono::DateTime<chrono::Utc>>,
    pub durable_cache: bool,
    pub cached_entries: u64,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
