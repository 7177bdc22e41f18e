use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// 联盟链接状态
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LinkStatus {
    Active,
    Paused,
    Expired,
    Archived,
}

/// 合作方状态
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum PartnerStatus {
    Active,
    Pending,
    Suspended,
    Inactive,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AffiliatePartner {
    pub id: i64,
    pub name: String,
    pub status: PartnerStatus,
    /// 归因 Cookie 有效天数；None 或 <= 0 时使用默认值
    pub cookie_duration: Option<i32>,
}

impl AffiliatePartner {
    pub fn is_active(&self) -> bool {
        self.status == PartnerStatus::Active
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AffiliateLink {
    pub id: i64,
    pub short_code: String,
    pub original_url: String,
    pub tracking_url: Option<String>,
    pub status: LinkStatus,
    pub expires_at: Option<DateTime<Utc>>,
    pub partner_id: i64,
    pub product_id: Option<i64>,
    pub campaign_id: Option<i64>,
    #[serde(default)]
    pub click_count: i64,
    pub created_at: DateTime<Utc>,
}

impl AffiliateLink {
    /// 跳转目标：优先使用包装过的追踪地址
    pub fn destination(&self) -> &str {
        self.tracking_url
            .as_deref()
            .filter(|u| !u.is_empty())
            .unwrap_or(&self.original_url)
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|t| t <= now)
    }
}

/// 链接及其所属合作方（跳转路径上的一次读取）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkWithPartner {
    pub link: AffiliateLink,
    pub partner: AffiliatePartner,
}

/// 点击事件（只追加）
///
/// device_type / browser / os 由记录器在后台根据 UA 推导，
/// 请求路径上构造时为 None。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClickEvent {
    pub link_id: i64,
    pub partner_id: i64,
    pub product_id: Option<i64>,
    pub session_id: String,
    pub ip_address: String,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
    pub device_type: Option<String>,
    pub browser: Option<String>,
    pub os: Option<String>,
    pub clicked_at: DateTime<Utc>,
    pub is_bot: bool,
}

/// 最近点击查询条件（link 必填，ip / session 可选）
#[derive(Debug, Clone, Default)]
pub struct ClickFilter {
    pub link_id: i64,
    pub ip_address: Option<String>,
    pub session_id: Option<String>,
}

impl ClickFilter {
    pub fn by_ip(link_id: i64, ip: &str) -> Self {
        Self {
            link_id,
            ip_address: Some(ip.to_string()),
            session_id: None,
        }
    }

    pub fn by_session(link_id: i64, session_id: &str) -> Self {
        Self {
            link_id,
            ip_address: None,
            session_id: Some(session_id.to_string()),
        }
    }

    pub fn matches(&self, click: &ClickEvent) -> bool {
        click.link_id == self.link_id
            && self
                .ip_address
                .as_ref()
                .is_none_or(|ip| *ip == click.ip_address)
            && self
                .session_id
                .as_ref()
                .is_none_or(|sid| *sid == click.session_id)
    }
}
