//! In-memory stores
//!
//! The tracking store here has the exact write semantics the engine relies
//! on: overwrite status, prepend history, cap history at 50.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use shared::{
    AppResult, Credential, HistoryEntry, OrderStatusRecord, OrderStatusUpdate, StatusHistory,
    TrackingRecord, TrackingStatistics,
};
use std::collections::{BTreeMap, HashMap};

use super::{OrderRecordSource, OrderRecordStore};
use crate::delivery::{Delivery, DeliveryError, TrackingLookup};

// ============================================================================
// Order-of-record
// ============================================================================

/// Order-of-record kept in memory, scanned in order id order
#[derive(Debug, Default)]
pub struct InMemoryOrderStore {
    records: RwLock<BTreeMap<i64, OrderStatusRecord>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: impl IntoIterator<Item = OrderStatusRecord>) -> Self {
        let store = Self::new();
        for record in records {
            store.insert(record);
        }
        store
    }

    pub fn insert(&self, record: OrderStatusRecord) {
        self.records.write().insert(record.order_id, record);
    }

    pub fn get(&self, order_id: i64) -> Option<OrderStatusRecord> {
        self.records.read().get(&order_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

#[async_trait]
impl OrderRecordSource for InMemoryOrderStore {
    async fn list_orders(&self, _credential: &Credential) -> AppResult<Vec<OrderStatusRecord>> {
        Ok(self.records.read().values().cloned().collect())
    }

    async fn get_order(
        &self,
        order_id: i64,
        _credential: &Credential,
    ) -> AppResult<Option<OrderStatusRecord>> {
        Ok(self.get(order_id))
    }
}

#[async_trait]
impl OrderRecordStore for InMemoryOrderStore {
    async fn save(&self, record: OrderStatusRecord) -> AppResult<OrderStatusRecord> {
        self.insert(record.clone());
        Ok(record)
    }
}

// ============================================================================
// Tracking store
// ============================================================================

#[derive(Debug, Clone)]
struct TrackedOrder {
    record: TrackingRecord,
    history: StatusHistory,
}

/// Tracking store kept in memory
#[derive(Debug, Default)]
pub struct InMemoryTrackingStore {
    orders: RwLock<HashMap<i64, TrackedOrder>>,
}

impl InMemoryTrackingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a status: create on first write, otherwise overwrite and append
    pub fn apply(&self, update: &OrderStatusUpdate) -> TrackingRecord {
        let now = Utc::now();
        let mut orders = self.orders.write();

        let previous = orders.get(&update.order_id).map(|t| t.record.status);
        let tracked = orders.entry(update.order_id).or_insert_with(|| TrackedOrder {
            record: TrackingRecord {
                order_id: update.order_id,
                status: update.status,
                last_updated_at: now,
            },
            history: StatusHistory::new(),
        });

        tracked.record.status = update.status;
        tracked.record.last_updated_at = now;
        tracked.history.record(HistoryEntry {
            timestamp: now,
            previous_status: previous,
            new_status: update.status,
        });

        match previous {
            Some(prev) => tracing::debug!(
                order_id = update.order_id,
                "Tracking status {} -> {}",
                prev,
                update.status
            ),
            None => tracing::debug!(
                order_id = update.order_id,
                status = %update.status,
                "Tracking record created"
            ),
        }

        tracked.record.clone()
    }

    pub fn get(&self, order_id: i64) -> Option<TrackingRecord> {
        self.orders.read().get(&order_id).map(|t| t.record.clone())
    }

    /// Newest first, at most 50 entries; empty for unknown orders
    pub fn history(&self, order_id: i64) -> Vec<HistoryEntry> {
        self.orders
            .read()
            .get(&order_id)
            .map(|t| t.history.entries())
            .unwrap_or_default()
    }

    pub fn statistics(&self) -> TrackingStatistics {
        let orders = self.orders.read();
        let mut status_distribution = BTreeMap::new();
        for tracked in orders.values() {
            *status_distribution.entry(tracked.record.status).or_insert(0) += 1;
        }
        TrackingStatistics {
            total_tracked_orders: orders.len(),
            status_distribution,
            generated_at: Utc::now(),
        }
    }

    pub fn len(&self) -> usize {
        self.orders.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.read().is_empty()
    }
}

#[async_trait]
impl Delivery for InMemoryTrackingStore {
    async fn deliver(
        &self,
        update: &OrderStatusUpdate,
        _credential: &Credential,
    ) -> Result<(), DeliveryError> {
        self.apply(update);
        Ok(())
    }
}

#[async_trait]
impl TrackingLookup for InMemoryTrackingStore {
    async fn fetch(
        &self,
        order_id: i64,
        _credential: &Credential,
    ) -> Result<Option<TrackingRecord>, DeliveryError> {
        Ok(self.get(order_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{HISTORY_CAPACITY, OrderStatus};

    fn update(order_id: i64, status: OrderStatus) -> OrderStatusUpdate {
        OrderStatusUpdate::new(order_id, status)
    }

    #[test]
    fn test_first_write_creates_record() {
        let store = InMemoryTrackingStore::new();
        let record = store.apply(&update(1, OrderStatus::Pending));

        assert_eq!(record.status, OrderStatus::Pending);
        let history = store.history(1);
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].previous_status, None);
        assert_eq!(history[0].new_status, OrderStatus::Pending);
    }

    #[test]
    fn test_overwrite_appends_history_newest_first() {
        let store = InMemoryTrackingStore::new();
        store.apply(&update(1, OrderStatus::Pending));
        store.apply(&update(1, OrderStatus::Shipped));
        // No adjacency rules: going back is accepted
        store.apply(&update(1, OrderStatus::Pending));

        assert_eq!(store.get(1).unwrap().status, OrderStatus::Pending);
        let history = store.history(1);
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].previous_status, Some(OrderStatus::Shipped));
        assert_eq!(history[0].new_status, OrderStatus::Pending);
        assert_eq!(history[2].previous_status, None);
    }

    #[test]
    fn test_history_capped_at_capacity() {
        let store = InMemoryTrackingStore::new();
        for i in 0..(HISTORY_CAPACITY + 25) {
            store.apply(&update(7, OrderStatus::ALL[i % 5]));
        }
        assert_eq!(store.history(7).len(), HISTORY_CAPACITY);
        assert!(store.history(7).iter().all(|e| e.previous_status.is_some()));
    }

    #[test]
    fn test_unknown_order() {
        let store = InMemoryTrackingStore::new();
        assert!(store.get(404).is_none());
        assert!(store.history(404).is_empty());
    }

    #[test]
    fn test_statistics() {
        let store = InMemoryTrackingStore::new();
        store.apply(&update(1, OrderStatus::Shipped));
        store.apply(&update(2, OrderStatus::Shipped));
        store.apply(&update(3, OrderStatus::Pending));
        store.apply(&update(3, OrderStatus::Cancelled));

        let stats = store.statistics();
        assert_eq!(stats.total_tracked_orders, 3);
        assert_eq!(stats.status_distribution[&OrderStatus::Shipped], 2);
        assert_eq!(stats.status_distribution[&OrderStatus::Cancelled], 1);
        assert!(!stats.status_distribution.contains_key(&OrderStatus::Pending));
    }

    #[tokio::test]
    async fn test_order_store_scans_in_id_order() {
        let store = InMemoryOrderStore::with_records([
            OrderStatusRecord::with_status(3, OrderStatus::Cancelled),
            OrderStatusRecord::new(1),
            OrderStatusRecord::with_status(2, OrderStatus::Processing),
        ]);
        let credential = Credential::bearer("t").unwrap();

        let ids: Vec<i64> = store
            .list_orders(&credential)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.order_id)
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert!(store.get_order(9, &credential).await.unwrap().is_none());
    }
}
