use std::sync::Arc;

use actix_web::web;
use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::api::services::{AppStartTime, RedirectService};
use crate::config::StaticConfig;
use crate::storage::{AffiliateStore, SeaOrmStorage, StorageFactory};
use crate::tracking::{ClickRecorder, ClickSink};

pub struct StartupContext {
    pub storage: Arc<SeaOrmStorage>,
    pub recorder: Arc<ClickRecorder>,
    pub redirect_service: web::Data<RedirectService>,
    pub app_start_time: AppStartTime,
}

impl StartupContext {
    pub fn store(&self) -> Arc<dyn AffiliateStore> {
        self.storage.clone()
    }
}

/// 准备服务器启动的上下文
/// 包括存储（含迁移）、点击记录器和跳转服务
pub async fn prepare_server_startup(config: &StaticConfig) -> Result<StartupContext> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    let storage = StorageFactory::create(&config.database)
        .await
        .context("Failed to create storage backend")?;
    info!("Using storage backend: {}", storage.backend_name());

    let sink: Arc<dyn ClickSink> = storage.clone();
    let recorder = Arc::new(ClickRecorder::start(sink, config.tracking.recorder.clone()));

    let store: Arc<dyn AffiliateStore> = storage.clone();
    let redirect_service = web::Data::new(RedirectService::new(store, recorder.clone(), config));

    if !config.tracking.cookie_secure {
        warn!("tracking.cookie_secure is disabled, cookies will be sent over plain HTTP");
    }
    if config.cache.link_ttl_secs == 0 {
        info!("Link cache disabled");
    }

    info!(
        "Pre-startup processing completed in {} ms",
        start_time.elapsed().as_millis()
    );

    Ok(StartupContext {
        storage,
        recorder,
        redirect_service,
        app_start_time: AppStartTime {
            start_datetime: chrono::Utc::now(),
        },
    })
}
