use std::sync::Arc;

use async_trait::async_trait;

use crate::config::DatabaseConfig;
use crate::errors::Result;

pub mod backend;
pub mod models;

pub use backend::SeaOrmStorage;
pub use models::{
    AffiliateLink, AffiliatePartner, ClickEvent, ClickFilter, LinkStatus, LinkWithPartner,
    PartnerStatus,
};

/// 跳转路径所需的只读存储接口
///
/// 写入走 `tracking::ClickSink`，与读取分开，
/// 以便记录器可以独立替换（例如换成消息队列）。
#[async_trait]
pub trait AffiliateStore: Send + Sync {
    /// 按短码查找链接（含合作方）
    async fn find_link_by_short_code(&self, code: &str) -> Result<Option<LinkWithPartner>>;

    /// 查询 `window` 时间窗口内满足 `filter` 的点击
    async fn find_recent_clicks(
        &self,
        filter: &ClickFilter,
        window: chrono::Duration,
    ) -> Result<Vec<ClickEvent>>;

    /// IP 是否命中黑名单（单 IP 或 CIDR）
    async fn is_ip_blocked(&self, ip: &str) -> Result<bool>;

    /// 健康检查用的最小查询
    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

pub struct StorageFactory;

impl StorageFactory {
    pub async fn create(config: &DatabaseConfig) -> Result<Arc<SeaOrmStorage>> {
        // 从 URL 自动推断数据库类型
        let backend_type = backend::infer_backend_from_url(&config.database_url)?;

        let storage = SeaOrmStorage::new(config, &backend_type).await?;
        Ok(Arc::new(storage))
    }
}
