//! Error envelope and machine-readable error codes.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable error codes carried in [`ErrorResponse::code`].
pub mod error_codes {
    /// The request is malformed or fails validation.
    pub const INVALID_REQUEST: &str = "invalid_request";
    /// No credential was supplied.
    pub const UNAUTHORIZED: &str = "unauthorized";
    /// The credential is invalid or the caller lacks the required role.
    pub const FORBIDDEN: &str = "forbidden";
    /// The requested resource does not exist.
    pub const NOT_FOUND: &str = "not_found";
    /// The payment gateway rejected or failed the call.
    pub const PAYMENT_GATEWAY_ERROR: &str = "payment_gateway_error";
    /// A required collaborator is not configured.
    pub const SERVICE_UNAVAILABLE: &str = "service_unavailable";
    /// An unexpected error occurred.
    pub const INTERNAL_ERROR: &str = "internal_error";
}

/// Body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{code}: {message}")]
pub struct ErrorResponse {
    /// Human-readable message.
    pub message: String,
    /// One of [`error_codes`].
    pub code: String,
}

impl ErrorResponse {
    /// Creates a new error body.
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: code.to_string(),
        }
    }
}
