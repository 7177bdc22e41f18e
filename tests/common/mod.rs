//! Shared fixtures for integration tests
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use actix_web::web;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use affilink::api::services::RedirectService;
use affilink::config::{RecorderConfig, StaticConfig};
use affilink::errors::{AffilinkError, Result};
use affilink::storage::{
    AffiliateLink, AffiliatePartner, AffiliateStore, ClickEvent, ClickFilter, LinkStatus,
    LinkWithPartner, PartnerStatus,
};
use affilink::tracking::{ClickRecorder, ClickSink};
use affilink::utils::ip::ip_matches_entry;

pub const BROWSER_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
    (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
pub const GOOGLEBOT_UA: &str =
    "Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)";

/// 内存版存储：链接表、点击表、黑名单，外加可注入的故障
#[derive(Default)]
pub struct MockStore {
    links: Mutex<HashMap<String, LinkWithPartner>>,
    clicks: Mutex<Vec<ClickEvent>>,
    blocked: Mutex<Vec<String>>,
    pub fail_link_lookup: AtomicBool,
    pub fail_blocklist: AtomicBool,
    pub fail_recent_clicks: AtomicBool,
    pub fail_ping: AtomicBool,
}

impl MockStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn add_link(&self, record: LinkWithPartner) {
        self.links
            .lock()
            .unwrap()
            .insert(record.link.short_code.clone(), record);
    }

    pub fn block(&self, entry: &str) {
        self.blocked.lock().unwrap().push(entry.to_string());
    }

    pub fn seed_click(&self, event: ClickEvent) {
        self.clicks.lock().unwrap().push(event);
    }

    pub fn clicks(&self) -> Vec<ClickEvent> {
        self.clicks.lock().unwrap().clone()
    }

    pub fn fail(flag: &AtomicBool) {
        flag.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl AffiliateStore for MockStore {
    async fn find_link_by_short_code(&self, code: &str) -> Result<Option<LinkWithPartner>> {
        if self.fail_link_lookup.load(Ordering::SeqCst) {
            return Err(AffilinkError::database_connection("connection refused"));
        }
        Ok(self.links.lock().unwrap().get(code).cloned())
    }

    async fn find_recent_clicks(
        &self,
        filter: &ClickFilter,
        window: chrono::Duration,
    ) -> Result<Vec<ClickEvent>> {
        if self.fail_recent_clicks.load(Ordering::SeqCst) {
            return Err(AffilinkError::database_operation("query timed out"));
        }
        let since = Utc::now() - window;
        Ok(self
            .clicks
            .lock()
            .unwrap()
            .iter()
            .filter(|c| filter.matches(c) && c.clicked_at >= since)
            .cloned()
            .collect())
    }

    async fn is_ip_blocked(&self, ip: &str) -> Result<bool> {
        if self.fail_blocklist.load(Ordering::SeqCst) {
            return Err(AffilinkError::database_operation("block list unavailable"));
        }
        Ok(self
            .blocked
            .lock()
            .unwrap()
            .iter()
            .any(|entry| ip_matches_entry(ip, entry)))
    }

    async fn ping(&self) -> Result<()> {
        if self.fail_ping.load(Ordering::SeqCst) {
            return Err(AffilinkError::database_connection("database is down"));
        }
        Ok(())
    }
}

#[async_trait]
impl ClickSink for MockStore {
    async fn insert_click(&self, event: &ClickEvent) -> anyhow::Result<()> {
        self.clicks.lock().unwrap().push(event.clone());
        if let Some(record) = self
            .links
            .lock()
            .unwrap()
            .values_mut()
            .find(|r| r.link.id == event.link_id)
        {
            record.link.click_count += 1;
        }
        Ok(())
    }
}

pub fn partner(id: i64, status: PartnerStatus, cookie_duration: Option<i32>) -> AffiliatePartner {
    AffiliatePartner {
        id,
        name: format!("Partner {}", id),
        status,
        cookie_duration,
    }
}

pub fn link(id: i64, short_code: &str, original_url: &str, partner_id: i64) -> AffiliateLink {
    AffiliateLink {
        id,
        short_code: short_code.to_string(),
        original_url: original_url.to_string(),
        tracking_url: None,
        status: LinkStatus::Active,
        expires_at: None,
        partner_id,
        product_id: None,
        campaign_id: None,
        click_count: 0,
        created_at: Utc::now(),
    }
}

pub fn record(link: AffiliateLink, partner: AffiliatePartner) -> LinkWithPartner {
    LinkWithPartner { link, partner }
}

pub fn click(link_id: i64, ip: &str, session_id: &str, clicked_at: DateTime<Utc>) -> ClickEvent {
    ClickEvent {
        link_id,
        partner_id: 1,
        product_id: None,
        session_id: session_id.to_string(),
        ip_address: ip.to_string(),
        user_agent: Some(BROWSER_UA.to_string()),
        referrer: None,
        device_type: None,
        browser: None,
        os: None,
        clicked_at,
        is_bot: false,
    }
}

/// 缓存关闭、记录器快速重试的测试配置
pub fn test_config() -> StaticConfig {
    let mut config = StaticConfig::default();
    config.cache.link_ttl_secs = 0;
    config.cache.blocklist_ttl_secs = 0;
    config.tracking.recorder = RecorderConfig {
        queue_capacity: 64,
        insert_timeout_ms: 500,
        max_retries: 1,
        base_delay_ms: 1,
        max_delay_ms: 5,
        shutdown_timeout_secs: 5,
    };
    config
}

pub struct Harness {
    pub store: Arc<MockStore>,
    pub recorder: Arc<ClickRecorder>,
    pub service: web::Data<RedirectService>,
}

/// 需要在 tokio 运行时内调用（记录器会启动后台任务）
pub fn harness_with(store: Arc<MockStore>, config: &StaticConfig) -> Harness {
    harness_customized(store, config, |service| service)
}

/// 同 `harness_with`，但允许替换跳转服务里的识别/评分策略
pub fn harness_customized(
    store: Arc<MockStore>,
    config: &StaticConfig,
    customize: impl FnOnce(RedirectService) -> RedirectService,
) -> Harness {
    let sink: Arc<dyn ClickSink> = store.clone();
    let recorder = Arc::new(ClickRecorder::start(sink, config.tracking.recorder.clone()));
    let reader: Arc<dyn AffiliateStore> = store.clone();
    let service = web::Data::new(customize(RedirectService::new(
        reader,
        recorder.clone(),
        config,
    )));
    Harness {
        store,
        recorder,
        service,
    }
}

pub fn harness(store: Arc<MockStore>) -> Harness {
    harness_with(store, &test_config())
}
