mod common;

use async_trait::async_trait;
use common::{FlakyDelivery, credential};
use order_sync::delivery::{Delivery, DeliveryError};
use order_sync::store::InMemoryTrackingStore;
use order_sync::sync::{OverflowItem, OverflowQueue, QueueConfig, QueueStats, SyncClient};
use shared::{Credential, OrderStatus, OrderStatusUpdate};
use std::sync::Arc;
use tokio::sync::Notify;
use tokio::time::Duration;

fn item(order_id: i64, status: OrderStatus) -> OverflowItem {
    OverflowItem::new(OrderStatusUpdate::new(order_id, status), credential())
}

fn setup() -> (Arc<InMemoryTrackingStore>, Arc<FlakyDelivery>, Arc<OverflowQueue>) {
    let store = Arc::new(InMemoryTrackingStore::new());
    let delivery = Arc::new(FlakyDelivery::healthy(store.clone()));
    let queue = Arc::new(OverflowQueue::new(QueueConfig::default()));
    queue.attach_delivery(delivery.clone());
    (store, delivery, queue)
}

#[tokio::test]
async fn test_healthy_drain_strictly_decreases_depth() {
    let (store, _delivery, queue) = setup();
    for id in 1..=25 {
        queue.enqueue(item(id, OrderStatus::Shipped));
    }

    let mut depths = vec![queue.depth()];
    while queue.depth() > 0 {
        let summary = queue.drain().await;
        assert!(summary.delivered <= 10);
        depths.push(queue.depth());
    }

    assert_eq!(depths, vec![25, 15, 5, 0]);
    assert_eq!(store.len(), 25);
    assert_eq!(
        queue.stats(),
        QueueStats {
            pending: 0,
            processed: 25,
            failed: 0
        }
    );
}

#[tokio::test(start_paused = true)]
async fn test_expired_item_dropped_without_delivery() {
    let (store, delivery, queue) = setup();
    queue.enqueue(item(1, OrderStatus::Shipped));

    tokio::time::advance(Duration::from_secs(3601)).await;
    queue.enqueue(item(2, OrderStatus::Pending));

    let summary = queue.drain().await;

    assert_eq!(summary.expired, 1);
    assert_eq!(summary.delivered, 1);
    assert_eq!(delivery.attempts(), 1);
    assert!(store.get(1).is_none());
    assert_eq!(store.get(2).unwrap().status, OrderStatus::Pending);
    assert_eq!(queue.stats().failed, 1);
    assert_eq!(queue.depth(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_item_within_retention_is_delivered() {
    let (store, _delivery, queue) = setup();
    queue.enqueue(item(1, OrderStatus::Delivered));

    tokio::time::advance(Duration::from_secs(3599)).await;
    queue.drain().await;

    assert_eq!(store.get(1).unwrap().status, OrderStatus::Delivered);
}

#[tokio::test]
async fn test_failures_requeue_then_recover() {
    let (store, delivery, queue) = setup();
    delivery.set_down(true);
    for id in 1..=3 {
        queue.enqueue(item(id, OrderStatus::Processing));
    }

    // Three items rotate through the batch of ten
    let summary = queue.drain().await;
    assert_eq!(summary.requeued, 10);
    assert_eq!(delivery.attempts(), 10);
    assert_eq!(queue.depth(), 3);
    assert_eq!(queue.stats().failed, 10);

    delivery.set_down(false);
    let summary = queue.drain().await;
    assert_eq!(summary.delivered, 3);
    assert_eq!(queue.depth(), 0);
    assert_eq!(store.len(), 3);
    assert_eq!(
        queue.stats(),
        QueueStats {
            pending: 0,
            processed: 3,
            failed: 10
        }
    );
}

#[tokio::test]
async fn test_failing_item_retried_until_batch_exhausted() {
    let (store, delivery, queue) = setup();
    delivery.set_down(true);
    queue.enqueue(item(1, OrderStatus::Shipped));

    let summary = queue.drain().await;

    assert_eq!(delivery.attempts(), 10);
    assert_eq!(summary.requeued, 10);
    assert_eq!(summary.delivered, 0);
    assert_eq!(queue.depth(), 1);
    assert_eq!(queue.stats().failed, 10);
    assert!(store.get(1).is_none());
}

#[tokio::test(start_paused = true)]
async fn test_drained_item_keeps_callers_credential() {
    let (store, delivery, queue) = setup();
    let client = SyncClient::new(delivery.clone(), queue.clone());
    let caller = Credential::bearer("caller-token").unwrap();

    delivery.set_down(true);
    client
        .push(&OrderStatusUpdate::new(8, OrderStatus::Delivered), &caller)
        .await;
    assert_eq!(queue.depth(), 1);

    // Another caller's update goes straight through meanwhile
    delivery.set_down(false);
    client
        .push(&OrderStatusUpdate::new(9, OrderStatus::Shipped), &credential())
        .await;

    let summary = queue.drain().await;
    assert_eq!(summary.delivered, 1);
    assert_eq!(store.get(8).unwrap().status, OrderStatus::Delivered);

    let tokens = delivery.seen_tokens();
    assert_eq!(tokens.len(), 5);
    assert!(tokens[..3].iter().all(|t| t == "caller-token"));
    assert_eq!(tokens[3], "test-token");
    assert_eq!(tokens[4], "caller-token");
}

#[tokio::test]
async fn test_drain_respects_batch_size() {
    let store = Arc::new(InMemoryTrackingStore::new());
    let delivery = Arc::new(FlakyDelivery::healthy(store.clone()));
    let queue = OverflowQueue::new(QueueConfig {
        batch_size: 4,
        ..QueueConfig::default()
    });
    queue.attach_delivery(delivery.clone());
    for id in 1..=9 {
        queue.enqueue(item(id, OrderStatus::Shipped));
    }

    let summary = queue.drain().await;
    assert_eq!(summary.delivered, 4);
    assert_eq!(delivery.attempts(), 4);
    assert_eq!(queue.depth(), 5);
}

#[tokio::test]
async fn test_clear_drops_pending_items() {
    let (_store, delivery, queue) = setup();
    for id in 1..=5 {
        queue.enqueue(item(id, OrderStatus::Pending));
    }

    assert_eq!(queue.clear(), 5);
    assert_eq!(queue.depth(), 0);

    let summary = queue.drain().await;
    assert!(summary.is_empty());
    assert_eq!(delivery.attempts(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_enqueue_during_drain() {
    let (store, _delivery, queue) = setup();

    let producers: Vec<_> = (0..8)
        .map(|p| {
            let queue = queue.clone();
            tokio::spawn(async move {
                for i in 0..25 {
                    queue.enqueue(item(p * 100 + i, OrderStatus::Shipped));
                    tokio::task::yield_now().await;
                }
            })
        })
        .collect();

    let drainer = {
        let queue = queue.clone();
        tokio::spawn(async move {
            for _ in 0..10 {
                queue.drain().await;
                tokio::task::yield_now().await;
            }
        })
    };

    for producer in producers {
        producer.await.unwrap();
    }
    drainer.await.unwrap();

    while queue.depth() > 0 {
        queue.drain().await;
    }

    let stats = queue.stats();
    assert_eq!(stats.processed, 200);
    assert_eq!(stats.failed, 0);
    assert_eq!(store.len(), 200);
}

/// Delivery that blocks until released
struct GatedDelivery {
    entered: Notify,
    release: Notify,
}

#[async_trait]
impl Delivery for GatedDelivery {
    async fn deliver(
        &self,
        _update: &OrderStatusUpdate,
        _credential: &Credential,
    ) -> Result<(), DeliveryError> {
        self.entered.notify_one();
        self.release.notified().await;
        Ok(())
    }
}

#[tokio::test]
async fn test_overlapping_drain_is_skipped() {
    let delivery = Arc::new(GatedDelivery {
        entered: Notify::new(),
        release: Notify::new(),
    });
    // One item per pass, so the item enqueued mid-pass stays queued
    let queue = Arc::new(OverflowQueue::new(QueueConfig {
        batch_size: 1,
        ..QueueConfig::default()
    }));
    queue.attach_delivery(delivery.clone());
    queue.enqueue(item(1, OrderStatus::Shipped));

    let running = {
        let queue = queue.clone();
        tokio::spawn(async move { queue.drain().await })
    };
    delivery.entered.notified().await;

    // First pass is parked inside deliver
    let overlapping = queue.drain().await;
    assert!(overlapping.skipped);

    // Enqueue is not blocked by the running pass
    queue.enqueue(item(2, OrderStatus::Pending));
    assert_eq!(queue.depth(), 1);

    delivery.release.notify_one();
    let first = running.await.unwrap();
    assert_eq!(first.delivered, 1);
    assert!(!first.skipped);
    assert_eq!(queue.depth(), 1);
}
