//! Response DTOs for the gateway API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;
use serde_json::Value;

/// Response body for the intel routes (GET /api/intel/*)
#[derive(Debug, Clone, Serialize)]
pub struct IntelResponse {
    /// Source slug, e.g. `seismic`
    pub source: String,
    /// Whether the payload was served from the cache
    pub cached: bool,
    /// Upstream payload, JSON or text
    pub data: Value,
}

impl IntelResponse {
    pub fn new(source: impl Into<String>, cached: bool, data: Value) -> Self {
        Self {
            source: source.into(),
            cached,
            data,
        }
    }
}

/// Response body for GET /api/features
#[derive(Debug, Clone, Serialize)]
pub struct FeaturesResponse {
    pub enabled: Vec<&'static str>,
    pub any_enabled: bool,
}

/// Response body for DELETE /api/cache
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    pub message: String,
    /// Entries dropped by the clear
    pub removed: usize,
}

impl ClearResponse {
    pub fn new(removed: usize) -> Self {
        Self {
            message: format!("Cleared {} cache entries", removed),
            removed,
        }
    }
}

/// Response body for DELETE /api/cache/:key
#[derive(Debug, Clone, Serialize)]
pub struct InvalidateResponse {
    pub key: String,
    /// False when the key was not cached; invalidating it is still a success
    pub removed: bool,
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
