//! Error types for treefinder-search
//!
//! `SearchError` is what the pipeline reports; `ApiError` is what the HTTP
//! surface returns. Empty results are never errors, and a single failed
//! detail lookup never leaves the enrichment stage.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::types::SourceError;

/// Pipeline failure
#[derive(Debug, Error)]
pub enum SearchError {
    /// A required upstream call (geocoding, occurrence search) failed
    #[error("Upstream {source_name} unavailable: {error}")]
    UpstreamUnavailable {
        source_name: &'static str,
        error: SourceError,
    },

    /// Persistent store failure
    #[error("Store error: {0}")]
    Store(#[from] treefinder_common::Error),
}

impl SearchError {
    pub fn upstream(source_name: &'static str, error: SourceError) -> Self {
        SearchError::UpstreamUnavailable { source_name, error }
    }
}

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed location input (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Required data source unreachable (503)
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<SearchError> for ApiError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::UpstreamUnavailable { source_name, error } => {
                tracing::error!(source = source_name, error = %error, "Search aborted, upstream unavailable");
                ApiError::ServiceUnavailable(source_name.to_string())
            }
            SearchError::Store(e) => {
                tracing::error!(error = %e, "Search aborted, store failure");
                ApiError::Internal(e.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg),
            // Generic and retryable: upstream details stay in the logs
            ApiError::ServiceUnavailable(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "UPSTREAM_UNAVAILABLE",
                "Species data is temporarily unavailable. Please try again shortly.".to_string(),
            ),
            ApiError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred.".to_string(),
            ),
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
