//! Server mode
//!
//! Configures and starts the HTTP server, then drains the click recorder
//! once the server stops.

use std::sync::Arc;
use std::time::Duration;

use actix_web::{
    App, HttpServer,
    middleware::{Compress, DefaultHeaders},
    web,
};
use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::api::middleware::RequestIdMiddleware;
use crate::api::services::{health_routes, redirect_routes};
use crate::config::StaticConfig;
use crate::runtime::lifetime;

pub async fn run_server(config: Arc<StaticConfig>) -> Result<()> {
    let startup = lifetime::startup::prepare_server_startup(&config).await?;

    let store = startup.store();
    let recorder = startup.recorder.clone();
    let redirect_service = startup.redirect_service.clone();
    let app_start_time = startup.app_start_time.clone();

    let server_config = &config.server;
    let cpu_count = server_config.cpu_count.max(1);
    let bind_address = format!("{}:{}", server_config.host, server_config.port);

    let recorder_for_app = recorder.clone();
    let server = HttpServer::new(move || {
        App::new()
            .wrap(RequestIdMiddleware) // 为每个请求分配 request_id
            .wrap(Compress::default())
            .wrap(DefaultHeaders::new().add(("X-Content-Type-Options", "nosniff")))
            .app_data(redirect_service.clone())
            .app_data(web::Data::new(store.clone()))
            .app_data(web::Data::new(recorder_for_app.clone()))
            .app_data(web::Data::new(app_start_time.clone()))
            .service(health_routes())
            .service(redirect_routes())
    })
    .keep_alive(Duration::from_secs(30))
    .client_request_timeout(Duration::from_millis(5000))
    .client_disconnect_timeout(Duration::from_millis(1000))
    .workers(cpu_count)
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {}", bind_address))?
    .run();

    warn!("Starting server at http://{}", bind_address);
    let handle = server.handle();

    // Wait for server or shutdown signal
    tokio::select! {
        res = server => {
            res.context("HTTP server error")?;
            info!("HTTP server stopped");
        }
        _ = lifetime::shutdown::wait_for_signal() => {
            handle.stop(true).await;
            info!("HTTP server stopped gracefully");
        }
    }

    let drain_timeout = Duration::from_secs(config.tracking.recorder.shutdown_timeout_secs);
    lifetime::shutdown::perform_shutdown_tasks(&recorder, drain_timeout).await;

    Ok(())
}
