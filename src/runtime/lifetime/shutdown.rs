use std::time::Duration;

use tokio::signal;
use tokio::time::timeout;
use tracing::{error, info, warn};

use crate::tracking::ClickRecorder;

/// 记录器之外留给关闭流程的余量（秒）
const SHUTDOWN_GRACE_SECS: u64 = 5;

/// 等待 Ctrl+C 信号
pub async fn wait_for_signal() {
    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Shutdown signal received, draining click recorder...");
        }
        Err(e) => {
            warn!(
                "Failed to listen for Ctrl+C: {}. Proceeding with shutdown anyway.",
                e
            );
        }
    }
}

/// 执行关闭任务：写完队列中的点击
///
/// 记录器自身按 `shutdown_timeout_secs` 截断，这里再加一层兜底超时。
pub async fn perform_shutdown_tasks(recorder: &ClickRecorder, drain_timeout: Duration) {
    let limit = drain_timeout + Duration::from_secs(SHUTDOWN_GRACE_SECS);
    match timeout(limit, recorder.shutdown()).await {
        Ok(stats) => {
            info!(
                "All shutdown tasks completed: {} clicks persisted, {} failed, {} dropped",
                stats.persisted, stats.failed, stats.dropped
            );
        }
        Err(_) => {
            error!(
                "Click recorder shutdown timed out after {} seconds",
                limit.as_secs()
            );
        }
    }
}
