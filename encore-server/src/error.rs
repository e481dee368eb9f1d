//! API error handling module
//!
//! Provides a unified error type for all API endpoints with structured error variants.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use encore_core::EncoreError;
use thiserror::Error;

/// API error type with structured variants for different error categories
#[derive(Debug, Error)]
pub enum ApiError {
    /// Bad request - client provided invalid input
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Curated index could not be produced; `detail` is only exposed on request
    #[error("Curated index failed: {reason}")]
    Aggregation {
        reason: String,
        detail: Option<String>,
    },

    /// Encore core error - error from the upstream client or cache
    #[error("Encore error: {0}")]
    Encore(#[from] EncoreError),
}

impl ApiError {
    /// Create a bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    /// Wrap a failed curated-index computation.
    ///
    /// Every failure of the curated endpoint is a 500; the underlying error
    /// text is attached as `detail` only when `debug` is set.
    pub fn aggregation(err: EncoreError, debug: bool) -> Self {
        let reason = err.to_string();
        Self::Aggregation {
            detail: debug.then(|| reason.clone()),
            reason,
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Aggregation { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            // Photo API failures → 502
            Self::Encore(ref e) if e.is_upstream() => StatusCode::BAD_GATEWAY,
            Self::Encore(EncoreError::Config(_)) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Encore(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for programmatic error handling
    fn error_code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "INVALID_INPUT",
            Self::Aggregation { .. } => "CURATED_INDEX_FAILED",
            Self::Encore(ref e) if e.is_upstream() => "UPSTREAM_ERROR",
            Self::Encore(ref e) => match e {
                EncoreError::Config(_) => "SERVICE_UNAVAILABLE",
                EncoreError::CacheWrite(_) => "CACHE_ERROR",
                _ => "CURATED_INDEX_FAILED",
            },
        }
    }

    /// Get sanitized error message for client response
    fn client_message(&self) -> String {
        match self {
            Self::Aggregation { .. } => "Failed to compute curated index".to_string(),
            // For core errors, sanitize internal details
            Self::Encore(ref e) => match e {
                EncoreError::Upstream { status, .. } => {
                    format!("Photo API returned HTTP {status}")
                }
                EncoreError::Network(_) => "Photo API unreachable".to_string(),
                EncoreError::InvalidResponse(_) => "Photo API returned invalid JSON".to_string(),
                EncoreError::Config(_) => "Photo API is not configured".to_string(),
                EncoreError::CacheWrite(_) => "Cache error".to_string(),
                EncoreError::AggregationFailure { .. } => {
                    "Failed to compute curated index".to_string()
                }
            },
            // For other errors, use the Display message
            _ => self.to_string(),
        }
    }

    /// Get the error category for logging
    fn error_category(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "bad_request",
            Self::Aggregation { .. } => "aggregation",
            Self::Encore(_) => "encore",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let category = self.error_category();
        let code = self.error_code();
        let internal_message = self.to_string();
        let client_message = self.client_message();

        // Log based on severity, always including internal details
        match &self {
            Self::BadRequest(_) => {
                tracing::warn!(
                    status = %status,
                    category = category,
                    code = code,
                    error = %internal_message,
                    "Client error"
                );
            }
            Self::Aggregation { .. } => {
                tracing::error!(
                    status = %status,
                    category = category,
                    code = code,
                    error = %internal_message,
                    "Server error"
                );
            }
            Self::Encore(_) => {
                tracing::error!(
                    status = %status,
                    category = category,
                    code = code,
                    error = %internal_message,
                    client_message = %client_message,
                    "Encore error (internal details logged)"
                );
            }
        }

        // All error responses include a `code` field for programmatic error handling
        let mut body = serde_json::json!({
            "error": client_message,
            "code": code,
        });
        if let Self::Aggregation {
            detail: Some(detail),
            ..
        } = &self
        {
            body["detail"] = serde_json::Value::String(detail.clone());
        }

        (status, Json(body)).into_response()
    }
}
