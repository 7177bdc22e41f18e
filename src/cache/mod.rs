//! 进程内读缓存
//!
//! 两个显式组件，由启动流程创建并注入，TTL 为 0 时禁用：
//! - `LinkCache`：短码 → 链接（含合作方）
//! - `BlockListCache`：IP → 是否命中黑名单
//!
//! 缓存的只是记录本身；链接是否可跳转由解析器每次按当前时间重新判断，
//! 所以缓存不会让过期链接多活一个 TTL。

use std::time::{Duration, Instant};

use moka::future::Cache;
use moka::policy::Expiry;
use tracing::trace;

use crate::config::CacheConfig;
use crate::storage::LinkWithPartner;

/// 链接缓存的过期策略：不超过默认 TTL，也不超过链接自身的过期时间
struct LinkExpiry {
    default_ttl: Duration,
}

impl Expiry<String, LinkWithPartner> for LinkExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &LinkWithPartner,
        _created_at: Instant,
    ) -> Option<Duration> {
        let Some(expires_at) = value.link.expires_at else {
            return Some(self.default_ttl);
        };
        let remaining = (expires_at - chrono::Utc::now())
            .to_std()
            .unwrap_or(Duration::ZERO)
            .max(Duration::from_secs(1));
        Some(remaining.min(self.default_ttl))
    }
}

#[derive(Clone)]
pub struct LinkCache {
    inner: Option<Cache<String, LinkWithPartner>>,
}

impl LinkCache {
    pub fn new(max_capacity: u64, ttl_secs: u64) -> Self {
        if ttl_secs == 0 {
            return Self::disabled();
        }

        let inner = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(LinkExpiry {
                default_ttl: Duration::from_secs(ttl_secs),
            })
            .build();

        trace!(
            "LinkCache initialized: max_capacity={}, ttl={}s",
            max_capacity, ttl_secs
        );
        Self { inner: Some(inner) }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.max_capacity, config.link_ttl_secs)
    }

    pub fn disabled() -> Self {
        Self { inner: None }
    }

    pub async fn get(&self, code: &str) -> Option<LinkWithPartner> {
        let hit = self.inner.as_ref()?.get(code).await;
        if hit.is_some() {
            trace!("LinkCache hit: {}", code);
        }
        hit
    }

    pub async fn insert(&self, code: &str, value: LinkWithPartner) {
        if let Some(ref inner) = self.inner {
            inner.insert(code.to_string(), value).await;
        }
    }
}

#[derive(Clone)]
pub struct BlockListCache {
    inner: Option<Cache<String, bool>>,
}

impl BlockListCache {
    pub fn new(max_capacity: u64, ttl_secs: u64) -> Self {
        if ttl_secs == 0 {
            return Self::disabled();
        }

        let inner = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        trace!(
            "BlockListCache initialized: max_capacity={}, ttl={}s",
            max_capacity, ttl_secs
        );
        Self { inner: Some(inner) }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.max_capacity, config.blocklist_ttl_secs)
    }

    pub fn disabled() -> Self {
        Self { inner: None }
    }

    pub async fn get(&self, ip: &str) -> Option<bool> {
        self.inner.as_ref()?.get(ip).await
    }

    pub async fn insert(&self, ip: &str, blocked: bool) {
        if let Some(ref inner) = self.inner {
            inner.insert(ip.to_string(), blocked).await;
        }
    }
}
