use order_sync::{BackgroundTasks, SyncState, setup_environment};
use std::time::Duration;

const HEALTH_CHECK_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. 设置环境 (dotenv, 配置, 日志)
    let config = setup_environment()?;

    tracing::info!(environment = %config.environment, "Order sync starting...");

    // 2. 组装组件
    let state = SyncState::from_config(config)?;

    // 3. 启动后台任务
    let mut tasks = BackgroundTasks::new();
    state.start_background_tasks(&mut tasks);

    // 4. 等待 Ctrl-C，期间定时检查后台任务
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut health = tokio::time::interval(HEALTH_CHECK_INTERVAL);
    health.tick().await;
    loop {
        tokio::select! {
            signal = &mut ctrl_c => {
                signal?;
                tracing::info!("Shutdown signal received");
                break;
            }
            _ = health.tick() => {
                let dead = tasks.check_health();
                if dead > 0 {
                    tracing::error!(dead, "Background tasks are no longer running");
                }
            }
        }
    }

    tasks.shutdown().await;

    let stats = state.queue.stats();
    if stats.pending > 0 {
        tracing::warn!(
            pending = stats.pending,
            "Exiting with undelivered updates in the overflow queue"
        );
    }

    Ok(())
}
