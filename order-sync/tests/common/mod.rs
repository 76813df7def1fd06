#![allow(dead_code)]

use async_trait::async_trait;
use order_sync::delivery::{Delivery, DeliveryError, TrackingLookup};
use order_sync::store::InMemoryTrackingStore;
use parking_lot::Mutex;
use shared::{Credential, OrderStatusUpdate, TrackingRecord};
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::time::Instant;

pub fn credential() -> Credential {
    Credential::bearer("test-token").unwrap()
}

/// Delivery in front of an in-memory tracking store
///
/// Fails with a transient error for the first `fail_first` attempts, or for
/// every attempt while `down` is set.
pub struct FlakyDelivery {
    pub store: Arc<InMemoryTrackingStore>,
    fail_first: usize,
    down: AtomicBool,
    reject: AtomicBool,
    attempts: AtomicUsize,
    attempt_times: Mutex<Vec<Instant>>,
    seen_tokens: Mutex<Vec<String>>,
}

impl FlakyDelivery {
    pub fn new(store: Arc<InMemoryTrackingStore>, fail_first: usize) -> Self {
        Self {
            store,
            fail_first,
            down: AtomicBool::new(false),
            reject: AtomicBool::new(false),
            attempts: AtomicUsize::new(0),
            attempt_times: Mutex::new(Vec::new()),
            seen_tokens: Mutex::new(Vec::new()),
        }
    }

    pub fn healthy(store: Arc<InMemoryTrackingStore>) -> Self {
        Self::new(store, 0)
    }

    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    pub fn set_rejecting(&self, reject: bool) {
        self.reject.store(reject, Ordering::SeqCst);
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn attempt_times(&self) -> Vec<Instant> {
        self.attempt_times.lock().clone()
    }

    /// Bearer token of every delivery attempt, in order
    pub fn seen_tokens(&self) -> Vec<String> {
        self.seen_tokens.lock().clone()
    }
}

#[async_trait]
impl Delivery for FlakyDelivery {
    async fn deliver(
        &self,
        update: &OrderStatusUpdate,
        credential: &Credential,
    ) -> Result<(), DeliveryError> {
        let n = self.attempts.fetch_add(1, Ordering::SeqCst);
        self.attempt_times.lock().push(Instant::now());
        self.seen_tokens.lock().push(credential.token().to_string());

        if self.reject.load(Ordering::SeqCst) {
            return Err(DeliveryError::Rejected {
                status: 400,
                body: "bad request".into(),
            });
        }
        if self.down.load(Ordering::SeqCst) || n < self.fail_first {
            return Err(DeliveryError::Unreachable("connection refused".into()));
        }
        self.store.deliver(update, credential).await
    }
}

/// Tracking lookup that fails for selected orders
pub struct FailingLookup {
    pub store: Arc<InMemoryTrackingStore>,
    failing: HashSet<i64>,
}

impl FailingLookup {
    pub fn new(store: Arc<InMemoryTrackingStore>, failing: impl IntoIterator<Item = i64>) -> Self {
        Self {
            store,
            failing: failing.into_iter().collect(),
        }
    }
}

#[async_trait]
impl TrackingLookup for FailingLookup {
    async fn fetch(
        &self,
        order_id: i64,
        credential: &Credential,
    ) -> Result<Option<TrackingRecord>, DeliveryError> {
        if self.failing.contains(&order_id) {
            return Err(DeliveryError::Unavailable {
                status: 503,
                body: "tracking store overloaded".into(),
            });
        }
        self.store.fetch(order_id, credential).await
    }
}
