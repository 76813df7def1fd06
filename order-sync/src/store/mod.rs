//! Store boundaries
//!
//! - [`OrderRecordSource`] / [`OrderRecordStore`] - the order-of-record
//! - [`InMemoryTrackingStore`] - tracking store with bounded history
//! - [`HttpOrderSource`] - order-of-record over HTTP

mod http;
mod memory;

pub use http::HttpOrderSource;
pub use memory::{InMemoryOrderStore, InMemoryTrackingStore};

use async_trait::async_trait;
use shared::{AppResult, Credential, OrderStatusRecord};

/// Read side of the order-of-record
///
/// Reconciliation only ever reads through this trait.
#[async_trait]
pub trait OrderRecordSource: Send + Sync {
    /// Full, non-paginated scan
    async fn list_orders(&self, credential: &Credential) -> AppResult<Vec<OrderStatusRecord>>;

    async fn get_order(
        &self,
        order_id: i64,
        credential: &Credential,
    ) -> AppResult<Option<OrderStatusRecord>>;
}

/// Write side of the order-of-record
#[async_trait]
pub trait OrderRecordStore: OrderRecordSource {
    /// Insert or overwrite a record
    async fn save(&self, record: OrderStatusRecord) -> AppResult<OrderStatusRecord>;
}
