//! Mutation operations for SeaOrmStorage
//!
//! 管理端写操作（CLI 使用）：新建合作方、生成链接、添加 IP 黑名单。
//! 跳转路径上的写入只有点击记录，见 `click_sink`。

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter,
};
use tracing::info;

use super::SeaOrmStorage;
use super::converters::{model_to_link, model_to_partner};
use super::retry;
use crate::errors::{AffilinkError, Result};
use crate::storage::{AffiliateLink, AffiliatePartner, LinkStatus, PartnerStatus};
use crate::utils::url_validator::validate_destination_url;
use crate::utils::{GENERATED_CODE_LEN, generate_random_code, is_valid_short_code};

use migration::entities::{affiliate_link, affiliate_partner, blocked_ip};

/// 随机短码撞车时的最大重抽次数
const MAX_CODE_ATTEMPTS: usize = 5;

#[derive(Debug, Clone)]
pub struct NewPartner {
    pub name: String,
    pub status: PartnerStatus,
    pub cookie_duration: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct NewLink {
    pub partner_id: i64,
    pub original_url: String,
    pub tracking_url: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub product_id: Option<i64>,
    pub campaign_id: Option<i64>,
    /// 显式指定的短码；为空时随机生成
    pub short_code: Option<String>,
}

impl SeaOrmStorage {
    pub async fn create_partner(&self, new: NewPartner) -> Result<AffiliatePartner> {
        let name = new.name.trim().to_string();
        if name.is_empty() {
            return Err(AffilinkError::validation("Partner name cannot be empty"));
        }

        let model = affiliate_partner::ActiveModel {
            name: Set(name),
            status: Set(new.status.to_string()),
            cookie_duration: Set(new.cookie_duration),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        let db = &self.db;
        let saved = retry::with_retry("create_partner", self.retry_config, || async {
            model.clone().insert(db).await
        })
        .await
        .map_err(|e| AffilinkError::database_operation(format!("创建合作方失败: {}", e)))?;

        info!("Partner created: {} (id={})", saved.name, saved.id);
        Ok(model_to_partner(saved))
    }

    pub async fn create_link(&self, new: NewLink) -> Result<AffiliateLink> {
        validate_destination_url(&new.original_url)?;
        if let Some(ref tracking) = new.tracking_url {
            validate_destination_url(tracking)?;
        }

        let partner_exists = affiliate_partner::Entity::find_by_id(new.partner_id)
            .count(&self.db)
            .await
            .map_err(|e| AffilinkError::database_operation(format!("查询合作方失败: {}", e)))?
            > 0;
        if !partner_exists {
            return Err(AffilinkError::not_found(format!(
                "Partner {} does not exist",
                new.partner_id
            )));
        }

        let short_code = match new.short_code {
            Some(ref code) => {
                if !is_valid_short_code(code) {
                    return Err(AffilinkError::validation(format!(
                        "Invalid short code '{}': use 1-64 characters of [A-Za-z0-9_-]",
                        code
                    )));
                }
                if self.short_code_taken(code).await? {
                    return Err(AffilinkError::validation(format!(
                        "Short code '{}' already exists",
                        code
                    )));
                }
                code.clone()
            }
            None => self.unused_random_code().await?,
        };

        let model = affiliate_link::ActiveModel {
            short_code: Set(short_code),
            original_url: Set(new.original_url.trim().to_string()),
            tracking_url: Set(new.tracking_url.map(|u| u.trim().to_string())),
            status: Set(LinkStatus::Active.to_string()),
            expires_at: Set(new.expires_at),
            partner_id: Set(new.partner_id),
            product_id: Set(new.product_id),
            campaign_id: Set(new.campaign_id),
            click_count: Set(0),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        let db = &self.db;
        let saved = retry::with_retry("create_link", self.retry_config, || async {
            model.clone().insert(db).await
        })
        .await
        .map_err(|e| AffilinkError::database_operation(format!("创建联盟链接失败: {}", e)))?;

        info!(
            "Affiliate link created: {} -> {} (partner={})",
            saved.short_code, saved.original_url, saved.partner_id
        );
        Ok(model_to_link(saved))
    }

    /// 添加黑名单条目（单 IP 或 CIDR）
    pub async fn block_ip(&self, ip_range: &str, reason: Option<String>) -> Result<()> {
        let ip_range = ip_range.trim();
        if !is_valid_block_entry(ip_range) {
            return Err(AffilinkError::validation(format!(
                "'{}' is neither an IP address nor a CIDR range",
                ip_range
            )));
        }

        let model = blocked_ip::ActiveModel {
            ip_range: Set(ip_range.to_string()),
            reason: Set(reason),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        let db = &self.db;
        retry::with_retry("block_ip", self.retry_config, || async {
            model.clone().insert(db).await
        })
        .await
        .map_err(|e| AffilinkError::database_operation(format!("添加 IP 黑名单失败: {}", e)))?;

        info!("IP range blocked: {}", ip_range);
        Ok(())
    }

    async fn short_code_taken(&self, code: &str) -> Result<bool> {
        let count = affiliate_link::Entity::find()
            .filter(affiliate_link::Column::ShortCode.eq(code))
            .count(&self.db)
            .await
            .map_err(|e| AffilinkError::database_operation(format!("查询短码失败: {}", e)))?;
        Ok(count > 0)
    }

    async fn unused_random_code(&self) -> Result<String> {
        for _ in 0..MAX_CODE_ATTEMPTS {
            let code = generate_random_code(GENERATED_CODE_LEN);
            if !self.short_code_taken(&code).await? {
                return Ok(code);
            }
        }
        Err(AffilinkError::database_operation(
            "Could not generate an unused short code",
        ))
    }
}

fn is_valid_block_entry(entry: &str) -> bool {
    use std::net::IpAddr;

    match entry.split_once('/') {
        Some((net, prefix)) => {
            let Ok(net) = net.parse::<IpAddr>() else {
                return false;
            };
            let max = if net.is_ipv4() { 32 } else { 128 };
            prefix.parse::<u32>().is_ok_and(|p| p <= max)
        }
        None => entry.parse::<IpAddr>().is_ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_entry_validation() {
        assert!(is_valid_block_entry("203.0.113.5"));
        assert!(is_valid_block_entry("10.0.0.0/8"));
        assert!(is_valid_block_entry("2001:db8::/32"));
        assert!(!is_valid_block_entry("10.0.0.0/40"));
        assert!(!is_valid_block_entry("not-an-ip"));
        assert!(!is_valid_block_entry(""));
    }
}
