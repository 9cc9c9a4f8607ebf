// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::supabase::{AuthError, StoreError};

/// HTTP API error with appropriate status codes and client-friendly messages.
///
/// Exactly two client-visible kinds exist: authentication failures (401,
/// fixed messages) and validation failures (400, free-text detail echoing
/// the underlying rejection). Read-path store failures never surface here;
/// those handlers substitute their documented defaults instead.
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request - malformed input or store-side rejection on writes
    Validation(String),

    // 401 Unauthorized - missing or invalid bearer token
    Unauthorized(String),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::Validation(_) => 400,
            ApiError::Unauthorized(_) => 401,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::Validation(msg) => msg,
            ApiError::Unauthorized(msg) => msg,
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        json!({
            "error": true,
            "message": self.message(),
        })
    }
}

// Write handlers forward provider rejections as validation failures; the
// authentication guard maps AuthError to Unauthorized itself.
impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::validation(err.to_string())
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}
