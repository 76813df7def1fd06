//! Delivery error types

use reqwest::StatusCode;
use shared::AppError;
use thiserror::Error;

/// Outcome of a failed call to the tracking store
#[derive(Debug, Clone, Error)]
pub enum DeliveryError {
    /// Connection refused, DNS failure, timeout
    #[error("Tracking store unreachable: {0}")]
    Unreachable(String),

    /// Downstream answered but is overloaded or failing (5xx, 408, 429)
    #[error("Tracking store unavailable (HTTP {status}): {body}")]
    Unavailable { status: u16, body: String },

    /// Downstream refused the request (other 4xx)
    #[error("Tracking store rejected request (HTTP {status}): {body}")]
    Rejected { status: u16, body: String },

    /// Response body could not be understood
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl DeliveryError {
    /// Whether retrying the same request may succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unreachable(_) | Self::Unavailable { .. })
    }

    /// Classify a non-success HTTP status
    pub fn from_status(status: StatusCode, body: impl Into<String>) -> Self {
        let body = body.into();
        if status.is_server_error()
            || status == StatusCode::REQUEST_TIMEOUT
            || status == StatusCode::TOO_MANY_REQUESTS
        {
            Self::Unavailable {
                status: status.as_u16(),
                body,
            }
        } else {
            Self::Rejected {
                status: status.as_u16(),
                body,
            }
        }
    }
}

impl From<reqwest::Error> for DeliveryError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::InvalidResponse(e.to_string())
        } else if let Some(status) = e.status() {
            Self::from_status(status, e.to_string())
        } else {
            Self::Unreachable(e.to_string())
        }
    }
}

impl From<DeliveryError> for AppError {
    fn from(e: DeliveryError) -> Self {
        match &e {
            DeliveryError::Unreachable(_) | DeliveryError::Unavailable { .. } => {
                AppError::tracking_unavailable(e.to_string())
            }
            DeliveryError::Rejected { status, .. } => {
                AppError::tracking_rejected(e.to_string()).with_detail("http_status", *status)
            }
            DeliveryError::InvalidResponse(_) => AppError::internal(e.to_string()),
        }
    }
}
