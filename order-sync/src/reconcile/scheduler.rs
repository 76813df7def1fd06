//! 对账调度器
//!
//! 按固定间隔运行 `compare()`，开启 auto repair 时随后执行 `repair()`。
//! 注册为 `TaskKind::Periodic`，在 `start_background_tasks()` 中启动。

use shared::Credential;
use std::sync::Arc;
use tokio::time::Duration;
use tokio_util::sync::CancellationToken;

use super::engine::ReconciliationEngine;

pub struct ReconcileScheduler {
    engine: Arc<ReconciliationEngine>,
    credential: Credential,
    interval: Duration,
    auto_repair: bool,
    shutdown: CancellationToken,
}

impl ReconcileScheduler {
    pub fn new(
        engine: Arc<ReconciliationEngine>,
        credential: Credential,
        interval: Duration,
        auto_repair: bool,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            engine,
            credential,
            interval,
            auto_repair,
            shutdown,
        }
    }

    /// 主循环：等待间隔 → 对账 → (可选) 修复
    pub async fn run(self) {
        tracing::info!(
            target: "reconcile",
            interval_secs = self.interval.as_secs(),
            auto_repair = self.auto_repair,
            "Reconcile scheduler started"
        );

        loop {
            // 等待触发或 shutdown
            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = self.shutdown.cancelled() => {
                    tracing::info!(target: "reconcile", "Reconcile scheduler received shutdown signal");
                    break;
                }
            }

            self.run_once().await;
        }

        tracing::info!(target: "reconcile", "Reconcile scheduler stopped");
    }

    async fn run_once(&self) {
        let report = match self.engine.compare(&self.credential).await {
            Ok(report) => report,
            Err(e) => {
                tracing::error!(target: "reconcile", "Scheduled reconciliation failed: {e}");
                return;
            }
        };

        if report.is_consistent() {
            return;
        }

        if !self.auto_repair {
            tracing::warn!(
                target: "reconcile",
                discrepancies = report.discrepancy_count,
                "Stores are inconsistent, auto repair disabled"
            );
            return;
        }

        self.engine.repair(&report, &self.credential).await;
    }
}
