//! 会话与归因 Cookie
//!
//! 两种令牌，作用域和有效期各自独立：
//! - 会话 Cookie（默认 `aff_sid`，30 天）：与合作方无关的匿名访客标识
//! - 归因 Cookie（`aff_ref_<partner_id>`）：值为会话 ID，有效期取合作方配置
//!
//! 合作方各自调整 cookie_duration 不会影响彼此的归因窗口。

use actix_web::cookie::time::Duration as CookieDuration;
use actix_web::cookie::{Cookie, SameSite};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

use crate::config::TrackingConfig;
use crate::storage::AffiliatePartner;

/// 新会话 ID 的随机字节数（192 bit）
const SESSION_ID_BYTES: usize = 24;
/// 合法会话 ID 的长度范围（base64url 字符）
const SESSION_ID_MIN_LEN: usize = 22;
const SESSION_ID_MAX_LEN: usize = 128;

const SECONDS_PER_DAY: i64 = 86_400;
const FALLBACK_ATTRIBUTION_DAYS: i64 = 30;
/// Cookie 有效期上限（天），超出的配置值按上限处理
const MAX_COOKIE_DAYS: i64 = 3650;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken {
    pub id: String,
    /// 本次请求新签发（请求中没有可用的会话 Cookie）
    pub is_new: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributionCookie {
    pub name: String,
    pub value: String,
    pub max_age_seconds: i64,
}

/// 会话 ID 是否格式正确（仅校验格式，不做服务端查找）
pub fn is_well_formed_session_id(value: &str) -> bool {
    (SESSION_ID_MIN_LEN..=SESSION_ID_MAX_LEN).contains(&value.len())
        && value
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

fn mint_session_id() -> String {
    let bytes: [u8; SESSION_ID_BYTES] = rand::random();
    URL_SAFE_NO_PAD.encode(bytes)
}

#[derive(Debug, Clone)]
pub struct SessionManager {
    cookie_name: String,
    session_ttl_days: i64,
    attribution_prefix: String,
    default_attribution_days: i64,
    secure: bool,
}

impl SessionManager {
    pub fn new(config: &TrackingConfig) -> Self {
        let default_attribution_days = if config.default_attribution_days > 0 {
            config.default_attribution_days.min(MAX_COOKIE_DAYS)
        } else {
            FALLBACK_ATTRIBUTION_DAYS
        };

        Self {
            cookie_name: config.session_cookie_name.clone(),
            session_ttl_days: config.session_ttl_days.clamp(1, MAX_COOKIE_DAYS),
            attribution_prefix: config.attribution_cookie_prefix.clone(),
            default_attribution_days,
            secure: config.cookie_secure,
        }
    }

    pub fn session_cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// 复用格式正确的会话 ID，否则签发新的
    pub fn get_or_create_session(&self, existing: Option<&str>) -> SessionToken {
        match existing {
            Some(id) if is_well_formed_session_id(id) => SessionToken {
                id: id.to_string(),
                is_new: false,
            },
            _ => SessionToken {
                id: mint_session_id(),
                is_new: true,
            },
        }
    }

    /// 合作方归因 Cookie；cookie_duration 未设置或 <= 0 时使用默认天数
    pub fn build_attribution_cookie(
        &self,
        partner: &AffiliatePartner,
        session_id: &str,
    ) -> AttributionCookie {
        let days = partner
            .cookie_duration
            .map(i64::from)
            .filter(|d| *d > 0)
            .map(|d| d.min(MAX_COOKIE_DAYS))
            .unwrap_or(self.default_attribution_days);

        AttributionCookie {
            name: format!("{}{}", self.attribution_prefix, partner.id),
            value: session_id.to_string(),
            max_age_seconds: days * SECONDS_PER_DAY,
        }
    }

    pub fn session_cookie(&self, token: &SessionToken) -> Cookie<'static> {
        self.build_cookie(
            self.cookie_name.clone(),
            token.id.clone(),
            CookieDuration::days(self.session_ttl_days),
        )
    }

    pub fn attribution_cookie(&self, attribution: &AttributionCookie) -> Cookie<'static> {
        self.build_cookie(
            attribution.name.clone(),
            attribution.value.clone(),
            CookieDuration::seconds(attribution.max_age_seconds),
        )
    }

    fn build_cookie(
        &self,
        name: String,
        value: String,
        max_age: CookieDuration,
    ) -> Cookie<'static> {
        let mut cookie = Cookie::new(name, value);
        cookie.set_path("/");
        cookie.set_http_only(true);
        cookie.set_secure(self.secure);
        cookie.set_same_site(SameSite::Lax);
        cookie.set_max_age(max_age);
        cookie
    }
}
