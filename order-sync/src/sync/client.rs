//! Sync client: hot-path push to the tracking store

use shared::{AppResult, Credential, OrderStatusUpdate};
use std::sync::Arc;
use tokio::time::Duration;

use super::queue::{OverflowItem, OverflowQueue};
use crate::delivery::Delivery;

/// Attempts per push
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
/// Delay before the second attempt; doubles afterwards
pub const DEFAULT_BACKOFF_BASE: Duration = Duration::from_millis(1000);

/// Bounded exponential backoff
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BACKOFF_BASE,
        }
    }
}

impl RetryPolicy {
    /// Delay after failed attempt `attempt` (1-based): base × 2^(attempt−1)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(16);
        self.base_delay.saturating_mul(1u32 << exp)
    }
}

/// Pushes status updates to the tracking store
///
/// A push never fails: after the last attempt the update is handed to the
/// overflow queue and the caller returns normally.
#[derive(Clone)]
pub struct SyncClient {
    delivery: Arc<dyn Delivery>,
    queue: Arc<OverflowQueue>,
    policy: RetryPolicy,
}

impl SyncClient {
    pub fn new(delivery: Arc<dyn Delivery>, queue: Arc<OverflowQueue>) -> Self {
        Self {
            delivery,
            queue,
            policy: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn queue(&self) -> &Arc<OverflowQueue> {
        &self.queue
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Validate a raw status and push it
    ///
    /// Only an invalid status is an error; nothing is attempted or queued then.
    pub async fn push_status(
        &self,
        order_id: i64,
        status: &str,
        credential: &Credential,
    ) -> AppResult<()> {
        let update = OrderStatusUpdate::parse(order_id, status)?;
        self.push(&update, credential).await;
        Ok(())
    }

    /// Deliver with retries, then fall back to the overflow queue
    pub async fn push(&self, update: &OrderStatusUpdate, credential: &Credential) {
        let max_attempts = self.policy.max_attempts.max(1);

        for attempt in 1..=max_attempts {
            match self.delivery.deliver(update, credential).await {
                Ok(()) => {
                    tracing::info!(
                        order_id = update.order_id,
                        status = %update.status,
                        attempt,
                        "Status synced to tracking store"
                    );
                    return;
                }
                Err(e) if !e.is_transient() => {
                    // 4xx: 重试无意义，直接入队
                    tracing::warn!(
                        order_id = update.order_id,
                        "Tracking store rejected status update: {e}"
                    );
                    break;
                }
                Err(e) if attempt < max_attempts => {
                    let delay = self.policy.delay_for(attempt);
                    tracing::warn!(
                        order_id = update.order_id,
                        attempt,
                        max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        "Sync attempt failed, retrying: {e}"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    tracing::error!(
                        order_id = update.order_id,
                        attempts = max_attempts,
                        "Sync failed after all attempts: {e}"
                    );
                }
            }
        }

        self.queue
            .enqueue(OverflowItem::new(update.clone(), credential.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_backoff_schedule() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(1), Duration::from_secs(1));
        assert_eq!(policy.delay_for(2), Duration::from_secs(2));
        assert_eq!(policy.delay_for(3), Duration::from_secs(4));
    }

    #[test]
    fn test_backoff_does_not_overflow() {
        let policy = RetryPolicy {
            max_attempts: 100,
            base_delay: Duration::from_secs(1),
        };
        assert_eq!(policy.delay_for(99), Duration::from_secs(1 << 16));
    }
}
