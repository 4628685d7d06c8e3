//! Server error types.

use api_protocol::{ErrorResponse, error_codes};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Invalid request parameters.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// No credential supplied.
    #[error("Unauthorized access")]
    AuthenticationRequired,

    /// Credential supplied but invalid or expired.
    #[error("unauthorized user")]
    InvalidCredentials,

    /// Valid identity without the required role or ownership.
    #[error("{0}")]
    PermissionDenied(String),

    /// Store error.
    #[error("Store error: {0}")]
    Store(#[from] booking_store::StoreError),

    /// The payment gateway failed.
    #[error("Payment gateway error: {0}")]
    PaymentGateway(String),

    /// No payment gateway is configured.
    #[error("Payments are not configured")]
    PaymentsUnavailable,

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServerError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ServerError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, error_codes::INVALID_REQUEST),
            ServerError::NotFound(_) => (StatusCode::NOT_FOUND, error_codes::NOT_FOUND),
            ServerError::AuthenticationRequired => {
                (StatusCode::UNAUTHORIZED, error_codes::UNAUTHORIZED)
            }
            ServerError::InvalidCredentials | ServerError::PermissionDenied(_) => {
                (StatusCode::FORBIDDEN, error_codes::FORBIDDEN)
            }
            ServerError::Store(_) | ServerError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, error_codes::INTERNAL_ERROR)
            }
            ServerError::PaymentGateway(_) => {
                (StatusCode::BAD_GATEWAY, error_codes::PAYMENT_GATEWAY_ERROR)
            }
            ServerError::PaymentsUnavailable => {
                (StatusCode::SERVICE_UNAVAILABLE, error_codes::SERVICE_UNAVAILABLE)
            }
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            ServerError::InvalidRequest(msg)
            | ServerError::NotFound(msg)
            | ServerError::PermissionDenied(msg) => msg.clone(),
            ServerError::Store(e) => {
                tracing::error!(error = %e, "Store failure");
                "Internal server error".to_string()
            }
            ServerError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal failure");
                "Internal server error".to_string()
            }
            ServerError::PaymentGateway(msg) => {
                tracing::error!(error = %msg, "Payment gateway failure");
                self.to_string()
            }
            ServerError::AuthenticationRequired
            | ServerError::InvalidCredentials
            | ServerError::PaymentsUnavailable => self.to_string(),
        };

        (status, Json(ErrorResponse::new(code, message))).into_response()
    }
}

/// Result type alias for server operations.
pub type ServerResult<T> = Result<T, ServerError>;
