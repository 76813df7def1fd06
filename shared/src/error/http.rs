//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Success => StatusCode::OK,

            Self::NotFound | Self::OrderNotFound => StatusCode::NOT_FOUND,

            Self::ValidationFailed | Self::InvalidRequest | Self::InvalidStatus => {
                StatusCode::BAD_REQUEST
            }

            Self::NotAuthenticated => StatusCode::UNAUTHORIZED,

            // Downstream stores
            Self::TrackingUnavailable | Self::OrderSourceUnavailable => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            Self::TrackingRejected => StatusCode::BAD_GATEWAY,

            Self::Unknown | Self::InternalError | Self::ConfigError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}
