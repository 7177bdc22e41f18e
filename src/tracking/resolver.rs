//! 短码解析与可跳转性判断

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, error, trace};

use crate::cache::LinkCache;
use crate::storage::{AffiliateStore, LinkStatus, LinkWithPartner};
use crate::utils::is_valid_short_code;

/// 解析结果
///
/// 多个不可用原因同时成立时按 `Inactive` → `Expired` → `PartnerInactive` 取第一个。
#[derive(Debug, Clone)]
pub enum Resolution {
    NotFound,
    Inactive(LinkWithPartner),
    Expired(LinkWithPartner),
    PartnerInactive(LinkWithPartner),
    Eligible(LinkWithPartner),
}

impl Resolution {
    /// 根据当前时间判断记录的可跳转性
    pub fn evaluate(record: LinkWithPartner, now: DateTime<Utc>) -> Self {
        if record.link.status != LinkStatus::Active {
            Resolution::Inactive(record)
        } else if record.link.is_expired_at(now) {
            Resolution::Expired(record)
        } else if !record.partner.is_active() {
            Resolution::PartnerInactive(record)
        } else {
            Resolution::Eligible(record)
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Resolution::NotFound => "not_found",
            Resolution::Inactive(_) => "inactive",
            Resolution::Expired(_) => "expired",
            Resolution::PartnerInactive(_) => "partner_inactive",
            Resolution::Eligible(_) => "eligible",
        }
    }
}

pub struct LinkResolver {
    store: Arc<dyn AffiliateStore>,
    cache: LinkCache,
}

impl LinkResolver {
    pub fn new(store: Arc<dyn AffiliateStore>, cache: LinkCache) -> Self {
        Self { store, cache }
    }

    pub async fn resolve(&self, short_code: &str) -> Resolution {
        self.resolve_at(short_code, Utc::now()).await
    }

    /// 以指定时间解析（缓存的记录同样按 `now` 重新判断）
    pub async fn resolve_at(&self, short_code: &str, now: DateTime<Utc>) -> Resolution {
        if !is_valid_short_code(short_code) {
            trace!("Rejected malformed short code: {:?}", short_code);
            return Resolution::NotFound;
        }

        let record = match self.cache.get(short_code).await {
            Some(record) => record,
            None => match self.store.find_link_by_short_code(short_code).await {
                Ok(Some(record)) => {
                    self.cache.insert(short_code, record.clone()).await;
                    record
                }
                Ok(None) => {
                    debug!("Short code not found: {}", short_code);
                    return Resolution::NotFound;
                }
                Err(e) => {
                    error!("Link lookup failed for {}, treating as not found: {}", short_code, e);
                    return Resolution::NotFound;
                }
            },
        };

        let resolution = Resolution::evaluate(record, now);
        trace!("Resolved {} -> {}", short_code, resolution.kind());
        resolution
    }
}
