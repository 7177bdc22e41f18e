//! Query operations for SeaOrmStorage
//!
//! This module contains all read-only database operations.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect};
use tracing::{debug, trace};

use super::converters::{model_to_click, models_to_link_with_partner};
use super::{SeaOrmStorage, retry};
use crate::errors::{AffilinkError, Result};
use crate::storage::{AffiliateStore, ClickEvent, ClickFilter, LinkWithPartner};
use crate::utils::ip::ip_matches_entry;

use migration::entities::{affiliate_link, affiliate_partner, blocked_ip, click};

/// 单次最近点击查询的最大行数（评分只关心是否超过阈值）
const MAX_RECENT_CLICKS: u64 = 1000;

#[async_trait]
impl AffiliateStore for SeaOrmStorage {
    async fn find_link_by_short_code(&self, code: &str) -> Result<Option<LinkWithPartner>> {
        let db = &self.db;
        let code_owned = code.to_string();

        let found = retry::with_retry(
            &format!("find_link({})", code),
            self.retry_config,
            || async {
                affiliate_link::Entity::find()
                    .filter(affiliate_link::Column::ShortCode.eq(code_owned.as_str()))
                    .find_also_related(affiliate_partner::Entity)
                    .one(db)
                    .await
            },
        )
        .await
        .map_err(|e| AffilinkError::database_operation(format!("查询联盟链接失败: {}", e)))?;

        Ok(found.and_then(|(link, partner)| models_to_link_with_partner(link, partner)))
    }

    async fn find_recent_clicks(
        &self,
        filter: &ClickFilter,
        window: chrono::Duration,
    ) -> Result<Vec<ClickEvent>> {
        let since = Utc::now() - window;
        let db = &self.db;

        let mut query = click::Entity::find()
            .filter(click::Column::LinkId.eq(filter.link_id))
            .filter(click::Column::ClickedAt.gte(since));
        if let Some(ref ip) = filter.ip_address {
            query = query.filter(click::Column::IpAddress.eq(ip.as_str()));
        }
        if let Some(ref session_id) = filter.session_id {
            query = query.filter(click::Column::SessionId.eq(session_id.as_str()));
        }
        let query = query
            .order_by_desc(click::Column::ClickedAt)
            .limit(MAX_RECENT_CLICKS);

        let models = retry::with_retry("find_recent_clicks", self.retry_config, || async {
            query.clone().all(db).await
        })
        .await
        .map_err(|e| AffilinkError::database_operation(format!("查询最近点击失败: {}", e)))?;

        trace!(
            "find_recent_clicks(link={}, ip={:?}, session={:?}) -> {}",
            filter.link_id,
            filter.ip_address,
            filter.session_id,
            models.len()
        );

        Ok(models.into_iter().map(model_to_click).collect())
    }

    async fn is_ip_blocked(&self, ip: &str) -> Result<bool> {
        let entries = self.load_blocklist().await?;
        let blocked = entries.iter().any(|entry| ip_matches_entry(ip, entry));
        if blocked {
            debug!("IP {} matched block list", ip);
        }
        Ok(blocked)
    }

    async fn ping(&self) -> Result<()> {
        self.db
            .execute_unprepared("SELECT 1")
            .await
            .map(|_| ())
            .map_err(|e| AffilinkError::database_connection(format!("数据库不可用: {}", e)))
    }
}

impl SeaOrmStorage {
    /// 加载全部黑名单条目（规模很小，CIDR 匹配在内存中进行）
    pub async fn load_blocklist(&self) -> Result<Vec<String>> {
        let db = &self.db;

        retry::with_retry("load_blocklist", self.retry_config, || async {
            blocked_ip::Entity::find()
                .select_only()
                .column(blocked_ip::Column::IpRange)
                .into_tuple::<String>()
                .all(db)
                .await
        })
        .await
        .map_err(|e| AffilinkError::database_operation(format!("加载 IP 黑名单失败: {}", e)))
    }
}
