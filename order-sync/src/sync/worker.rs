//! DrainWorker: 定时排空溢出队列
//!
//! 注册为 `TaskKind::Worker`。每个 tick 跑完一轮完整的 drain，
//! 收到 shutdown 信号后退出（不会中断正在进行的 drain）。

use std::sync::Arc;
use tokio::time::{Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::queue::OverflowQueue;

/// Default drain period
pub const DEFAULT_DRAIN_INTERVAL: Duration = Duration::from_secs(30);

pub struct DrainWorker {
    queue: Arc<OverflowQueue>,
    interval: Duration,
    shutdown: CancellationToken,
}

impl DrainWorker {
    pub fn new(queue: Arc<OverflowQueue>, interval: Duration, shutdown: CancellationToken) -> Self {
        Self {
            queue,
            interval,
            shutdown,
        }
    }

    pub async fn run(self) {
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            "Overflow drain worker started"
        );

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await; // skip immediate tick

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    tracing::info!(pending = self.queue.depth(), "Overflow drain worker shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    if self.queue.depth() > 0 {
                        self.queue.drain().await;
                    }
                }
            }
        }

        tracing::info!("Overflow drain worker stopped");
    }
}
