//! ClickSink implementation for SeaOrmStorage
//!
//! 单次尝试写入；超时与重试由 `tracking::ClickRecorder` 负责，
//! 这里不再套一层 `with_retry`，避免重试次数相乘。

use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, EntityTrait, ExprTrait, QueryFilter};
use tracing::{trace, warn};

use super::SeaOrmStorage;
use super::converters::click_to_active_model;
use crate::storage::ClickEvent;
use crate::tracking::ClickSink;

use migration::entities::{affiliate_link, click};

#[async_trait]
impl ClickSink for SeaOrmStorage {
    async fn insert_click(&self, event: &ClickEvent) -> anyhow::Result<()> {
        click::Entity::insert(click_to_active_model(event))
            .exec(&self.db)
            .await
            .map_err(|e| {
                anyhow::anyhow!("Failed to insert click for link {}: {}", event.link_id, e)
            })?;

        // 计数器是派生数据，点击行已落库就算成功
        let counter = affiliate_link::Entity::update_many()
            .col_expr(
                affiliate_link::Column::ClickCount,
                Expr::col(affiliate_link::Column::ClickCount).add(Expr::val(1i64)),
            )
            .filter(affiliate_link::Column::Id.eq(event.link_id))
            .exec(&self.db)
            .await;

        match counter {
            Ok(res) if res.rows_affected == 0 => {
                warn!("click_count not updated: link {} no longer exists", event.link_id)
            }
            Ok(_) => {}
            Err(e) => warn!(
                "Failed to increment click_count for link {} (click kept): {}",
                event.link_id, e
            ),
        }

        trace!(
            "Click persisted to {} (link={}, bot={})",
            self.backend_name,
            event.link_id,
            event.is_bot
        );
        Ok(())
    }
}
