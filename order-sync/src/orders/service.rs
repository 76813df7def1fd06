//! Order status service
//!
//! Write path of the order-of-record: commit first, then push to the
//! tracking store. A tracking outage never fails the write.

use shared::{AppError, AppResult, Credential, OrderStatus, OrderStatusRecord, OrderStatusUpdate};
use std::sync::Arc;

use crate::store::OrderRecordStore;
use crate::sync::SyncClient;

#[derive(Clone)]
pub struct OrderStatusService {
    store: Arc<dyn OrderRecordStore>,
    sync: SyncClient,
}

impl OrderStatusService {
    pub fn new(store: Arc<dyn OrderRecordStore>, sync: SyncClient) -> Self {
        Self { store, sync }
    }

    /// Register a new order as `PENDING` and propagate it
    pub async fn create_order(
        &self,
        order_id: i64,
        credential: &Credential,
    ) -> AppResult<OrderStatusRecord> {
        if self.store.get_order(order_id, credential).await?.is_some() {
            return Err(AppError::validation(format!("Order {order_id} already exists"))
                .with_detail("order_id", order_id));
        }

        let record = self.store.save(OrderStatusRecord::new(order_id)).await?;
        tracing::info!(order_id, "Order created");

        self.sync
            .push(&OrderStatusUpdate::new(order_id, record.status), credential)
            .await;
        Ok(record)
    }

    /// Validate and commit a status change, then propagate it
    pub async fn update_status(
        &self,
        order_id: i64,
        status: &str,
        credential: &Credential,
    ) -> AppResult<OrderStatusRecord> {
        let status = OrderStatus::validate(status)?;

        let current = self
            .store
            .get_order(order_id, credential)
            .await?
            .ok_or_else(|| AppError::order_not_found(order_id))?;

        let record = self
            .store
            .save(OrderStatusRecord::with_status(order_id, status))
            .await?;
        tracing::info!(order_id, "Order status {} -> {}", current.status, record.status);

        self.sync
            .push(&OrderStatusUpdate::new(order_id, record.status), credential)
            .await;
        Ok(record)
    }
}
