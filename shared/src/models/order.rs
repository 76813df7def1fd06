//! Order-of-record status model

use super::order_status::OrderStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Authoritative status of one order, owned by the order-of-record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatusRecord {
    pub order_id: i64,
    pub status: OrderStatus,
    pub updated_at: DateTime<Utc>,
}

impl OrderStatusRecord {
    /// A freshly created order, always `PENDING`
    pub fn new(order_id: i64) -> Self {
        Self {
            order_id,
            status: OrderStatus::Pending,
            updated_at: Utc::now(),
        }
    }

    pub fn with_status(order_id: i64, status: OrderStatus) -> Self {
        Self {
            order_id,
            status,
            updated_at: Utc::now(),
        }
    }
}
