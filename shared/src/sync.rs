//! Sync protocol types
//!
//! Carried by every delivery to the tracking store: from the hot write path,
//! from the overflow queue drain and from reconciliation repairs.

use crate::error::{AppError, AppResult};
use crate::models::OrderStatus;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Snapshot of an order status change to propagate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatusUpdate {
    pub order_id: i64,
    pub status: OrderStatus,
}

impl OrderStatusUpdate {
    pub fn new(order_id: i64, status: OrderStatus) -> Self {
        Self { order_id, status }
    }

    /// Build an update from an unvalidated status value
    pub fn parse(order_id: i64, status: &str) -> AppResult<Self> {
        Ok(Self::new(order_id, OrderStatus::validate(status)?))
    }
}

/// Body of `POST /api/tracking/{orderId}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusPayload {
    pub status: OrderStatus,
}

/// Caller-scoped bearer credential
///
/// Passed explicitly through every call boundary. `Debug` never prints the
/// token.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn bearer(token: impl Into<String>) -> AppResult<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(AppError::new(crate::error::ErrorCode::NotAuthenticated));
        }
        Ok(Self(token))
    }

    pub fn token(&self) -> &str {
        &self.0
    }

    /// `Authorization` header value
    pub fn header_value(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential(len={})", self.0.len())
    }
}
