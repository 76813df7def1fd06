//! Error type shared by the sync engine and its callers

use super::codes::ErrorCode;
use http::StatusCode;
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Application error with structured error code and details
///
/// - Standardized error codes via [`ErrorCode`]
/// - Human-readable messages
/// - Optional structured details (order id, offending value, ...)
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct AppError {
    /// The error code identifying the type of error
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    pub details: Option<HashMap<String, Value>>,
}

impl AppError {
    /// Create a new error with the default message for the error code
    pub fn new(code: ErrorCode) -> Self {
        Self {
            message: code.message().to_string(),
            code,
            details: None,
        }
    }

    /// Create a new error with a custom message
    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Add a detail entry to this error
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Get the HTTP status code for this error
    pub fn http_status(&self) -> StatusCode {
        self.code.http_status()
    }

    // ==================== Convenience constructors ====================

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ValidationFailed, msg)
    }

    /// Create an invalid status error for a value outside the status set
    pub fn invalid_status(value: impl Into<String>) -> Self {
        let v = value.into();
        Self::with_message(ErrorCode::InvalidStatus, format!("Invalid status: {}", v))
            .with_detail("status", v)
    }

    /// Create an order not found error
    pub fn order_not_found(order_id: i64) -> Self {
        Self::with_message(
            ErrorCode::OrderNotFound,
            format!("Order {} not found", order_id),
        )
        .with_detail("order_id", order_id)
    }

    /// Create a tracking unavailable error
    pub fn tracking_unavailable(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::TrackingUnavailable, msg)
    }

    /// Create a tracking rejected error
    pub fn tracking_rejected(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::TrackingRejected, msg)
    }

    /// Create an order source unavailable error
    pub fn order_source_unavailable(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::OrderSourceUnavailable, msg)
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InternalError, msg)
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ConfigError, msg)
    }
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_new() {
        let err = AppError::new(ErrorCode::OrderNotFound);
        assert_eq!(err.code, ErrorCode::OrderNotFound);
        assert_eq!(err.message, "Order not found");
        assert!(err.details.is_none());
    }

    #[test]
    fn test_invalid_status_carries_value() {
        let err = AppError::invalid_status("LOST");
        assert_eq!(err.code, ErrorCode::InvalidStatus);
        assert_eq!(err.message, "Invalid status: LOST");
        let details = err.details.unwrap();
        assert_eq!(details.get("status").unwrap(), "LOST");
    }

    #[test]
    fn test_order_not_found_detail() {
        let err = AppError::order_not_found(42);
        assert_eq!(err.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(err.details.unwrap().get("order_id").unwrap(), 42);
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::tracking_unavailable("connection refused");
        assert_eq!(format!("{}", err), "connection refused");
    }
}
