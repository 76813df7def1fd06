//! Overflow queue
//!
//! In-memory holding area for status updates the tracking store could not
//! accept. Enqueue never blocks; a periodic drain retries a bounded batch.
//!
//! Failed items go back on the tail, so ordering is not FIFO across failure
//! cycles and a long outage keeps rotating the same items to the back.

use parking_lot::Mutex;
use serde::Serialize;
use shared::{Credential, OrderStatusUpdate};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use tokio::time::{Duration, Instant};

use crate::delivery::Delivery;

/// Items per drain pass
pub const DEFAULT_BATCH_SIZE: usize = 10;
/// Max age before an item is discarded undelivered
pub const DEFAULT_RETENTION: Duration = Duration::from_secs(3600);

#[derive(Debug, Clone, Copy)]
pub struct QueueConfig {
    pub batch_size: usize,
    pub retention: Duration,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            retention: DEFAULT_RETENTION,
        }
    }
}

/// One undelivered update, with the credential of the caller that produced it
#[derive(Debug, Clone)]
pub struct OverflowItem {
    pub update: OrderStatusUpdate,
    pub credential: Credential,
    enqueued_at: Instant,
}

impl OverflowItem {
    pub fn new(update: OrderStatusUpdate, credential: Credential) -> Self {
        Self {
            update,
            credential,
            enqueued_at: Instant::now(),
        }
    }

    pub fn enqueued_at(&self) -> Instant {
        self.enqueued_at
    }

    pub fn is_expired(&self, retention: Duration) -> bool {
        self.enqueued_at.elapsed() > retention
    }
}

/// Queue statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueStats {
    pub pending: usize,
    /// Cumulative successful deliveries
    pub processed: u64,
    /// Cumulative failed attempts plus expired discards
    pub failed: u64,
}

/// Result of one drain pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DrainSummary {
    pub delivered: usize,
    pub requeued: usize,
    pub expired: usize,
    /// Another pass was already running
    pub skipped: bool,
}

impl DrainSummary {
    fn skipped() -> Self {
        Self {
            skipped: true,
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.delivered == 0 && self.requeued == 0 && self.expired == 0
    }
}

/// Clears the draining flag when a pass ends, panics included
struct DrainGuard<'a>(&'a AtomicBool);

impl<'a> DrainGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct OverflowQueue {
    items: Mutex<VecDeque<OverflowItem>>,
    processed: AtomicU64,
    failed: AtomicU64,
    draining: AtomicBool,
    delivery: OnceLock<Arc<dyn Delivery>>,
    config: QueueConfig,
}

impl std::fmt::Debug for OverflowQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverflowQueue")
            .field("stats", &self.stats())
            .field("config", &self.config)
            .field("delivery_attached", &self.delivery.get().is_some())
            .finish()
    }
}

impl OverflowQueue {
    pub fn new(config: QueueConfig) -> Self {
        Self {
            items: Mutex::new(VecDeque::new()),
            processed: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            draining: AtomicBool::new(false),
            delivery: OnceLock::new(),
            config,
        }
    }

    /// Inject the delivery used by [`drain`](Self::drain)
    ///
    /// Only the first call takes effect; returns false otherwise.
    pub fn attach_delivery(&self, delivery: Arc<dyn Delivery>) -> bool {
        self.delivery.set(delivery).is_ok()
    }

    pub fn config(&self) -> QueueConfig {
        self.config
    }

    pub fn enqueue(&self, item: OverflowItem) {
        let order_id = item.update.order_id;
        let depth = {
            let mut items = self.items.lock();
            items.push_back(item);
            items.len()
        };
        tracing::info!(order_id, depth, "Status update queued for later delivery");
    }

    pub fn depth(&self) -> usize {
        self.items.lock().len()
    }

    pub fn stats(&self) -> QueueStats {
        QueueStats {
            pending: self.depth(),
            processed: self.processed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }

    /// Drop every pending item; counters are left as they are
    pub fn clear(&self) -> usize {
        let dropped = {
            let mut items = self.items.lock();
            let n = items.len();
            items.clear();
            n
        };
        tracing::warn!(dropped, "Overflow queue cleared");
        dropped
    }

    /// Run one drain pass
    ///
    /// Pops up to `batch_size` times and stops early once the queue is empty.
    /// A failed item goes back on the tail and can be popped again in the
    /// same pass while the batch lasts.
    pub async fn drain(&self) -> DrainSummary {
        let Some(_guard) = DrainGuard::acquire(&self.draining) else {
            tracing::debug!("Drain already running, skipping");
            return DrainSummary::skipped();
        };

        let Some(delivery) = self.delivery.get() else {
            tracing::warn!("Overflow queue has no delivery attached, skipping drain");
            return DrainSummary::skipped();
        };

        let limit = self.config.batch_size;
        tracing::debug!(limit, pending = self.depth(), "Draining overflow queue");
        let mut summary = DrainSummary::default();

        for _ in 0..limit {
            let next = self.items.lock().pop_front();
            let Some(item) = next else {
                break;
            };
            let order_id = item.update.order_id;

            if item.is_expired(self.config.retention) {
                self.failed.fetch_add(1, Ordering::Relaxed);
                summary.expired += 1;
                tracing::warn!(
                    order_id,
                    status = %item.update.status,
                    "Queued update expired, discarded without delivery"
                );
                continue;
            }

            match delivery.deliver(&item.update, &item.credential).await {
                Ok(()) => {
                    self.processed.fetch_add(1, Ordering::Relaxed);
                    summary.delivered += 1;
                    tracing::info!(order_id, "Queued update delivered");
                }
                Err(e) => {
                    self.failed.fetch_add(1, Ordering::Relaxed);
                    summary.requeued += 1;
                    tracing::debug!(order_id, "Queued update still undeliverable: {e}");
                    self.items.lock().push_back(item);
                }
            }
        }

        if !summary.is_empty() {
            tracing::info!(
                delivered = summary.delivered,
                requeued = summary.requeued,
                expired = summary.expired,
                pending = self.depth(),
                "Drain pass finished"
            );
        }

        summary
    }
}
