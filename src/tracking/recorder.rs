//! 点击记录器
//!
//! 请求路径只做 `try_send`，不等待落库；后台 worker 逐条写入，
//! 每次写入有独立超时，失败按指数退避重试，重试耗尽后丢弃（至多一次）。

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::{Mutex, Notify, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, trace, warn};

use super::device::DeviceInfo;
use crate::config::RecorderConfig;
use crate::storage::ClickEvent;
use crate::storage::backend::retry::calculate_backoff;

/// 点击写入接口
#[async_trait]
pub trait ClickSink: Send + Sync {
    /// 写入一条点击并更新链接计数
    async fn insert_click(&self, event: &ClickEvent) -> anyhow::Result<()>;
}

#[derive(Debug, Default)]
struct Counters {
    accepted: AtomicU64,
    persisted: AtomicU64,
    failed: AtomicU64,
    dropped: AtomicU64,
}

/// 记录器统计快照
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RecorderStats {
    /// 成功入队
    pub accepted: u64,
    /// 成功落库
    pub persisted: u64,
    /// 重试耗尽或关闭时未处理
    pub failed: u64,
    /// 队列满或已关闭，未入队
    pub dropped: u64,
}

impl Counters {
    fn snapshot(&self) -> RecorderStats {
        RecorderStats {
            accepted: self.accepted.load(Ordering::Relaxed),
            persisted: self.persisted.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }
}

pub struct ClickRecorder {
    sender: mpsc::Sender<ClickEvent>,
    shutdown: Arc<Notify>,
    worker: Mutex<Option<JoinHandle<()>>>,
    counters: Arc<Counters>,
    shutdown_timeout: Duration,
}

impl ClickRecorder {
    /// 创建记录器并启动后台 worker（需要在 tokio 运行时内调用）
    pub fn start(sink: Arc<dyn ClickSink>, config: RecorderConfig) -> Self {
        let (sender, receiver) = mpsc::channel(config.queue_capacity.max(1));
        let shutdown = Arc::new(Notify::new());
        let counters = Arc::new(Counters::default());
        let shutdown_timeout = Duration::from_secs(config.shutdown_timeout_secs);

        let worker = Worker {
            sink,
            receiver,
            shutdown: shutdown.clone(),
            counters: counters.clone(),
            config,
        };
        let handle = tokio::spawn(worker.run());

        Self {
            sender,
            shutdown,
            worker: Mutex::new(Some(handle)),
            counters,
            shutdown_timeout,
        }
    }

    /// 投递点击事件，立即返回；返回 false 表示事件被丢弃
    pub fn record(&self, event: ClickEvent) -> bool {
        match self.sender.try_send(event) {
            Ok(()) => {
                self.counters.accepted.fetch_add(1, Ordering::Relaxed);
                true
            }
            Err(mpsc::error::TrySendError::Full(event)) => {
                self.counters.dropped.fetch_add(1, Ordering::Relaxed);
                warn!(
                    "Click queue full, dropping click for link {}",
                    event.link_id
                );
                false
            }
            Err(mpsc::error::TrySendError::Closed(event)) => {
                self.counters.dropped.fetch_add(1, Ordering::Relaxed);
                debug!(
                    "Click recorder stopped, dropping click for link {}",
                    event.link_id
                );
                false
            }
        }
    }

    /// 当前排队中的事件数
    pub fn queued(&self) -> usize {
        self.sender.max_capacity() - self.sender.capacity()
    }

    pub fn stats(&self) -> RecorderStats {
        self.counters.snapshot()
    }

    /// 停止接收新事件，在超时时间内写完队列中的事件
    ///
    /// 重复调用是安全的，之后的调用直接返回统计。
    pub async fn shutdown(&self) -> RecorderStats {
        let Some(mut handle) = self.worker.lock().await.take() else {
            return self.stats();
        };

        let pending = self.queued();
        info!("Stopping click recorder ({} queued)", pending);
        self.shutdown.notify_one();

        if tokio::time::timeout(self.shutdown_timeout, &mut handle)
            .await
            .is_err()
        {
            handle.abort();
            let left = self.queued() as u64;
            self.counters.failed.fetch_add(left, Ordering::Relaxed);
            warn!(
                "Click recorder did not drain within {:?}, {} clicks lost",
                self.shutdown_timeout, left
            );
        }

        let stats = self.stats();
        info!(
            "Click recorder stopped: persisted={}, failed={}, dropped={}",
            stats.persisted, stats.failed, stats.dropped
        );
        stats
    }
}

struct Worker {
    sink: Arc<dyn ClickSink>,
    receiver: mpsc::Receiver<ClickEvent>,
    shutdown: Arc<Notify>,
    counters: Arc<Counters>,
    config: RecorderConfig,
}

impl Worker {
    async fn run(mut self) {
        debug!("Click recorder worker started");
        loop {
            tokio::select! {
                biased;
                _ = self.shutdown.notified() => break,
                next = self.receiver.recv() => match next {
                    Some(event) => self.persist(event).await,
                    None => return,
                },
            }
        }

        // 关闭通道后仍可取出已缓冲的事件
        self.receiver.close();
        while let Some(event) = self.receiver.recv().await {
            self.persist(event).await;
        }
        debug!("Click recorder worker drained");
    }

    async fn persist(&self, mut event: ClickEvent) {
        let device = DeviceInfo::from_user_agent(event.user_agent.as_deref());
        event.device_type = device.device_type;
        event.browser = device.browser;
        event.os = device.os;

        let timeout = Duration::from_millis(self.config.insert_timeout_ms.max(1));
        let mut attempt = 0;
        loop {
            let error = match tokio::time::timeout(timeout, self.sink.insert_click(&event)).await {
                Ok(Ok(())) => {
                    self.counters.persisted.fetch_add(1, Ordering::Relaxed);
                    trace!("Click recorded for link {}", event.link_id);
                    return;
                }
                Ok(Err(e)) => e.to_string(),
                Err(_) => format!("timed out after {} ms", timeout.as_millis()),
            };

            if attempt >= self.config.max_retries {
                self.counters.failed.fetch_add(1, Ordering::Relaxed);
                error!(
                    "Dropping click for link {} after {} attempts: {}",
                    event.link_id,
                    attempt + 1,
                    error
                );
                return;
            }

            attempt += 1;
            let delay =
                calculate_backoff(attempt, self.config.base_delay_ms, self.config.max_delay_ms);
            warn!(
                "Recording click for link {} failed (attempt {}/{}): {}; retrying in {} ms",
                event.link_id,
                attempt,
                self.config.max_retries + 1,
                error,
                delay
            );
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
    }
}
