use shared::{AppError, AppResult, Credential};
use std::str::FromStr;
use std::time::Duration;

use crate::sync::{QueueConfig, RetryPolicy};

/// 同步服务配置
///
/// # 环境变量
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | TRACKING_SERVICE_URL | http://tracking-service:8084 | tracking store 地址 |
/// | ORDER_SERVICE_URL | http://order-service:8083 | order-of-record 地址 |
/// | SYNC_SERVICE_TOKEN | (未设置) | 后台任务使用的凭证 |
/// | SYNC_MAX_ATTEMPTS | 3 | 每次 push 的尝试次数 |
/// | SYNC_BACKOFF_BASE_MS | 1000 | 首次重试延迟(毫秒) |
/// | QUEUE_DRAIN_INTERVAL_SECS | 30 | 队列排空间隔 |
/// | QUEUE_BATCH_SIZE | 10 | 每轮最多处理条数 |
/// | QUEUE_RETENTION_SECS | 3600 | 队列项最长保留时间 |
/// | RECONCILE_INTERVAL_SECS | 3600 | 对账间隔 (0 = 关闭) |
/// | RECONCILE_AUTO_REPAIR | false | 定时对账后自动修复 |
/// | HTTP_TIMEOUT_MS | 30000 | 单次请求超时(毫秒) |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_JSON | false | JSON 日志 |
/// | LOG_DIR | (未设置) | 日志文件目录 |
/// | ENVIRONMENT | development | 运行环境 |
///
/// # 示例
///
/// ```ignore
/// TRACKING_SERVICE_URL=http://localhost:8084 RECONCILE_AUTO_REPAIR=true cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    pub tracking_service_url: String,
    pub order_service_url: String,
    /// 后台 drain / 对账使用的 bearer token
    pub service_token: Option<String>,
    pub sync_max_attempts: u32,
    pub sync_backoff_base_ms: u64,
    pub queue_drain_interval_secs: u64,
    pub queue_batch_size: usize,
    pub queue_retention_secs: u64,
    /// 0 关闭定时对账
    pub reconcile_interval_secs: u64,
    pub reconcile_auto_repair: bool,
    pub http_timeout_ms: u64,
    pub log_level: String,
    pub log_json: bool,
    pub log_dir: Option<String>,
    /// 运行环境: development | staging | production
    pub environment: String,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置或无法解析，使用默认值
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 从任意 key/value 来源加载配置（测试用）
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let string = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.into());
        let optional = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            tracking_service_url: string("TRACKING_SERVICE_URL", "http://tracking-service:8084"),
            order_service_url: string("ORDER_SERVICE_URL", "http://order-service:8083"),
            service_token: optional("SYNC_SERVICE_TOKEN"),
            sync_max_attempts: parsed(&lookup, "SYNC_MAX_ATTEMPTS", 3),
            sync_backoff_base_ms: parsed(&lookup, "SYNC_BACKOFF_BASE_MS", 1000),
            queue_drain_interval_secs: parsed(&lookup, "QUEUE_DRAIN_INTERVAL_SECS", 30),
            queue_batch_size: parsed(&lookup, "QUEUE_BATCH_SIZE", 10),
            queue_retention_secs: parsed(&lookup, "QUEUE_RETENTION_SECS", 3600),
            reconcile_interval_secs: parsed(&lookup, "RECONCILE_INTERVAL_SECS", 3600),
            reconcile_auto_repair: parsed(&lookup, "RECONCILE_AUTO_REPAIR", false),
            http_timeout_ms: parsed(&lookup, "HTTP_TIMEOUT_MS", 30000),
            log_level: string("LOG_LEVEL", "info"),
            log_json: parsed(&lookup, "LOG_JSON", false),
            log_dir: optional("LOG_DIR"),
            environment: string("ENVIRONMENT", "development"),
        }
    }

    /// 检查取值范围
    pub fn validate(&self) -> AppResult<()> {
        if self.sync_max_attempts == 0 {
            return Err(AppError::config("SYNC_MAX_ATTEMPTS must be at least 1"));
        }
        if self.queue_drain_interval_secs == 0 {
            return Err(AppError::config("QUEUE_DRAIN_INTERVAL_SECS must be greater than 0"));
        }
        if self.queue_batch_size == 0 {
            return Err(AppError::config("QUEUE_BATCH_SIZE must be greater than 0"));
        }
        if self.http_timeout_ms == 0 {
            return Err(AppError::config("HTTP_TIMEOUT_MS must be greater than 0"));
        }
        Ok(())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.sync_max_attempts,
            base_delay: Duration::from_millis(self.sync_backoff_base_ms),
        }
    }

    pub fn queue_config(&self) -> QueueConfig {
        QueueConfig {
            batch_size: self.queue_batch_size,
            retention: Duration::from_secs(self.queue_retention_secs),
        }
    }

    pub fn drain_interval(&self) -> Duration {
        Duration::from_secs(self.queue_drain_interval_secs)
    }

    /// None 表示关闭定时对账
    pub fn reconcile_interval(&self) -> Option<Duration> {
        (self.reconcile_interval_secs > 0).then(|| Duration::from_secs(self.reconcile_interval_secs))
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_millis(self.http_timeout_ms)
    }

    /// 后台任务凭证，未配置时为 None
    pub fn service_credential(&self) -> Option<Credential> {
        self.service_token
            .as_deref()
            .and_then(|token| Credential::bearer(token).ok())
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
