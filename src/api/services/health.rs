use actix_web::{HttpResponse, Responder, web};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, trace};

use crate::storage::AffiliateStore;
use crate::tracking::ClickRecorder;

const STORAGE_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

// 应用启动时间结构体
#[derive(Clone, Debug)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize)]
pub struct StorageCheck {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RecorderCheck {
    pub queued: usize,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub uptime_seconds: i64,
    pub storage: StorageCheck,
    pub recorder: RecorderCheck,
}

/// Health Service
///
/// 直接调用存储的 `ping`，不经过跳转逻辑（探针要求快速响应）。
pub struct HealthService;

impl HealthService {
    pub async fn health_check(
        store: web::Data<Arc<dyn AffiliateStore>>,
        recorder: web::Data<Arc<ClickRecorder>>,
        app_start_time: web::Data<AppStartTime>,
    ) -> impl Responder {
        let start_time = Instant::now();
        trace!("Received health check request");

        let storage = match tokio::time::timeout(STORAGE_CHECK_TIMEOUT, store.ping()).await {
            Ok(Ok(())) => StorageCheck {
                status: "healthy",
                error: None,
            },
            Ok(Err(e)) => {
                error!("Storage health check failed: {}", e);
                StorageCheck {
                    status: "unhealthy",
                    error: Some(format!("database error: {}", e)),
                }
            }
            Err(_) => {
                error!("Storage health check timeout");
                StorageCheck {
                    status: "unhealthy",
                    error: Some("timeout".to_string()),
                }
            }
        };

        let is_healthy = storage.error.is_none();
        let uptime_seconds = (chrono::Utc::now() - app_start_time.start_datetime)
            .num_seconds()
            .max(0);

        let body = HealthResponse {
            status: if is_healthy { "healthy" } else { "unhealthy" },
            uptime_seconds,
            storage,
            recorder: RecorderCheck {
                queued: recorder.queued(),
            },
        };

        info!(
            "Health check completed in {:?}, status: {}",
            start_time.elapsed(),
            body.status
        );

        let mut builder = if is_healthy {
            HttpResponse::Ok()
        } else {
            HttpResponse::ServiceUnavailable()
        };
        builder.json(body)
    }

    // 活跃性检查，不访问存储
    pub async fn liveness_check() -> impl Responder {
        trace!("Received liveness check request");

        HttpResponse::NoContent().finish()
    }
}

/// Health 路由配置
pub fn health_routes() -> actix_web::Scope {
    web::scope("/health")
        .route("", web::get().to(HealthService::health_check))
        .route("", web::head().to(HealthService::health_check))
        .route("/live", web::get().to(HealthService::liveness_check))
        .route("/live", web::head().to(HealthService::liveness_check))
}
