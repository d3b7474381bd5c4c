//! Error types for the intel gateway
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Fetch Error Enum ==
/// Failure modes of an outbound fetch.
///
/// These never cross the gateway boundary as errors; they are folded into a
/// `FetchResult` so callers branch on a value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The timer fired before the exchange completed
    #[error("Request timeout after {millis}ms")]
    Timeout { millis: u128 },

    /// Upstream answered with a non-success status
    #[error("HTTP {status}: {status_text}")]
    Http { status: u16, status_text: String },

    /// DNS, connection or body decoding failure
    #[error("{0}")]
    Network(String),
}

impl FetchError {
    /// Status code carried into the `FetchResult`.
    pub fn status(&self) -> u16 {
        match self {
            FetchError::Timeout { .. } => 408,
            FetchError::Http { status, .. } => *status,
            FetchError::Network(_) => 500,
        }
    }

    /// Builds a transport failure, falling back to a generic message.
    pub fn network(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.is_empty() {
            FetchError::Network("Network error".to_string())
        } else {
            FetchError::Network(message)
        }
    }
}

// == Api Error Enum ==
/// Errors returned by the intel route handlers.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The intel source is switched off
    #[error("Intel source disabled: {0}")]
    FeatureDisabled(String),

    /// Required query parameters are absent
    #[error("Missing required parameters: {}", .0.join(", "))]
    MissingParams(Vec<String>),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The upstream fetch did not produce data
    #[error("{message}")]
    Upstream { status: u16, message: String },

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<FetchError> for ApiError {
    fn from(err: FetchError) -> Self {
        ApiError::Upstream {
            status: err.status(),
            message: err.to_string(),
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::FeatureDisabled(_) => StatusCode::NOT_FOUND,
            ApiError::MissingParams(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for route handlers.
pub type Result<T> = std::result::Result<T, ApiError>;
