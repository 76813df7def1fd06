//! Delivery primitive: the one way status reaches the tracking store
//!
//! ```text
//! SyncClient::push ──┐
//! OverflowQueue::drain ──┼──> Delivery::deliver(update, credential)
//! ReconciliationEngine::repair ──┘
//! ```
//!
//! A delivery is a single attempt. Retry policy belongs to the caller.

mod error;
mod http;

pub use error::DeliveryError;
pub use http::HttpTrackingClient;

use async_trait::async_trait;
use shared::{Credential, OrderStatusUpdate, TrackingRecord};

/// Write a status update to the tracking store
///
/// The tracking store overwrites the current status and appends a history
/// entry, creating the record on first delivery.
#[async_trait]
pub trait Delivery: Send + Sync {
    async fn deliver(
        &self,
        update: &OrderStatusUpdate,
        credential: &Credential,
    ) -> Result<(), DeliveryError>;
}

/// Read the current tracking record of an order
#[async_trait]
pub trait TrackingLookup: Send + Sync {
    /// `Ok(None)` when the tracking store has no record for the order
    async fn fetch(
        &self,
        order_id: i64,
        credential: &Credential,
    ) -> Result<Option<TrackingRecord>, DeliveryError>;
}
