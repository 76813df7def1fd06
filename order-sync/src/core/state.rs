use shared::AppResult;
use std::sync::Arc;

use crate::core::Config;
use crate::core::tasks::{BackgroundTasks, TaskKind};
use crate::delivery::{Delivery, HttpTrackingClient, TrackingLookup};
use crate::orders::OrderStatusService;
use crate::reconcile::{ReconcileScheduler, ReconciliationEngine};
use crate::store::{HttpOrderSource, OrderRecordSource, OrderRecordStore};
use crate::sync::{DrainWorker, OverflowQueue, SyncClient};

/// 同步引擎状态 - 持有所有组件的共享引用
///
/// 使用 Arc 实现浅拷贝。
///
/// | 字段 | 说明 |
/// |------|------|
/// | config | 配置项 (不可变) |
/// | queue | 溢出队列 (与 sync_client 共享) |
/// | sync_client | 热路径 push |
/// | engine | 对账引擎 |
#[derive(Clone)]
pub struct SyncState {
    pub config: Config,
    pub queue: Arc<OverflowQueue>,
    pub sync_client: SyncClient,
    pub engine: Arc<ReconciliationEngine>,
}

impl SyncState {
    /// 组装组件
    ///
    /// 先创建队列，再把 delivery 注入进去，避免 SyncClient 与队列互相引用。
    pub fn new(
        config: Config,
        delivery: Arc<dyn Delivery>,
        tracking: Arc<dyn TrackingLookup>,
        orders: Arc<dyn OrderRecordSource>,
    ) -> Self {
        let queue = Arc::new(OverflowQueue::new(config.queue_config()));
        queue.attach_delivery(delivery.clone());

        let sync_client = SyncClient::new(delivery.clone(), queue.clone())
            .with_retry_policy(config.retry_policy());
        let engine = Arc::new(ReconciliationEngine::new(orders, tracking, delivery));

        Self {
            config,
            queue,
            sync_client,
            engine,
        }
    }

    /// 使用 HTTP transport 组装（生产环境）
    pub fn from_config(config: Config) -> AppResult<Self> {
        config.validate()?;

        let tracking = Arc::new(HttpTrackingClient::new(
            &config.tracking_service_url,
            config.http_timeout(),
        )?);
        let orders = Arc::new(HttpOrderSource::new(
            &config.order_service_url,
            config.http_timeout(),
        )?);

        tracing::info!(
            tracking = %config.tracking_service_url,
            orders = %config.order_service_url,
            "Sync state initialized"
        );

        Ok(Self::new(config, tracking.clone(), tracking, orders))
    }

    /// Order status service writing through `store`
    pub fn order_service(&self, store: Arc<dyn OrderRecordStore>) -> OrderStatusService {
        OrderStatusService::new(store, self.sync_client.clone())
    }

    /// 注册后台任务
    ///
    /// - overflow drain: 始终启动
    /// - 对账调度器: 配置了间隔和服务凭证时启动
    pub fn start_background_tasks(&self, tasks: &mut BackgroundTasks) {
        let worker = DrainWorker::new(
            self.queue.clone(),
            self.config.drain_interval(),
            tasks.shutdown_token(),
        );
        tasks.spawn("overflow_drain", TaskKind::Worker, worker.run());

        match (
            self.config.reconcile_interval(),
            self.config.service_credential(),
        ) {
            (Some(interval), Some(credential)) => {
                let scheduler = ReconcileScheduler::new(
                    self.engine.clone(),
                    credential,
                    interval,
                    self.config.reconcile_auto_repair,
                    tasks.shutdown_token(),
                );
                tasks.spawn("reconcile_scheduler", TaskKind::Periodic, scheduler.run());
            }
            (Some(_), None) => {
                tracing::warn!("SYNC_SERVICE_TOKEN not set, scheduled reconciliation disabled");
            }
            (None, _) => {
                tracing::info!("Scheduled reconciliation disabled");
            }
        }

        tasks.log_summary();
    }
}
