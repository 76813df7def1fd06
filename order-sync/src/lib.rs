//! Order Sync - 订单状态同步与对账引擎
//!
//! # 架构概述
//!
//! - **同步** (`sync`): 带退避重试的 push，失败后进入溢出队列，后台定时排空
//! - **对账** (`reconcile`): 扫描 order-of-record 与 tracking store，报告并修复差异
//! - **投递** (`delivery`): tracking store 的单次写入原语及 HTTP 实现
//! - **存储边界** (`store`): order-of-record 接口、内存实现与 HTTP 实现
//!
//! # 模块结构
//!
//! ```text
//! order-sync/src/
//! ├── core/          # 配置、状态、后台任务
//! ├── delivery/      # Delivery / TrackingLookup 及 HTTP client
//! ├── orders/        # 订单状态写入路径
//! ├── reconcile/     # 对账引擎与调度器
//! ├── store/         # order-of-record 与内存 tracking store
//! ├── sync/          # SyncClient、OverflowQueue、DrainWorker
//! └── utils/         # 日志
//! ```

pub mod core;
pub mod delivery;
pub mod orders;
pub mod reconcile;
pub mod store;
pub mod sync;
pub mod utils;

// Re-export 公共类型
pub use crate::core::{BackgroundTasks, Config, SyncState, TaskKind};
pub use delivery::{Delivery, DeliveryError, HttpTrackingClient, TrackingLookup};
pub use orders::OrderStatusService;
pub use reconcile::{ReconciliationEngine, ReconciliationReport, RepairResult};
pub use sync::{OverflowQueue, SyncClient};

pub use utils::logger::{init_logger, init_logger_with_file};

/// 设置运行环境 (dotenv, 配置, 日志)
pub fn setup_environment() -> anyhow::Result<Config> {
    // .env 文件可选
    dotenv::dotenv().ok();

    let config = Config::from_env();
    init_logger_with_file(&config.log_level, config.log_json, config.log_dir.as_deref())?;

    Ok(config)
}
