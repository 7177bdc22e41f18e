//! 机器人识别与欺诈评分
//!
//! 两者都是可替换的策略（trait），跳转编排只依赖 trait。
//! 结果是启发式的：误判可以接受，目标是便宜、可解释。

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::trace;

use super::device;
use crate::config::{BotConfig, FraudConfig};
use crate::errors::AffilinkError;
use crate::storage::{AffiliateStore, ClickFilter};
use crate::utils::ip::UNKNOWN_IP;

/// 内置 UA 特征（小写，子串匹配）
const BUILTIN_BOT_SIGNATURES: &[&str] = &[
    "bot",
    "spider",
    "slurp",
    "crawl",
    "scraper",
    "facebookexternalhit",
    "embedly",
    "quora link preview",
    "whatsapp",
    "headlesschrome",
    "phantomjs",
    "lighthouse",
    "curl/",
    "wget/",
    "python-requests",
    "python-urllib",
    "go-http-client",
    "java/",
    "okhttp",
    "libwww-perl",
    "httpclient",
    "axios/",
    "node-fetch",
];

pub const WEIGHT_IP_REPEAT: u8 = 50;
pub const WEIGHT_SESSION_REPEAT: u8 = 50;
pub const WEIGHT_MISSING_USER_AGENT: u8 = 30;
pub const WEIGHT_SHORT_USER_AGENT: u8 = 20;
const MAX_SCORE: u8 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BotVerdict {
    pub is_bot: bool,
    /// 命中原因；UA 缺失时 `is_bot` 为 false 但仍给出原因
    pub reason: Option<String>,
}

impl BotVerdict {
    fn human() -> Self {
        Self {
            is_bot: false,
            reason: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FraudAssessment {
    pub is_allowed: bool,
    /// 0–100
    pub score: u8,
    pub reasons: Vec<String>,
}

impl FraudAssessment {
    /// 评分无法完成时的结果（fail-open）
    pub fn allow() -> Self {
        Self {
            is_allowed: true,
            score: 0,
            reasons: Vec::new(),
        }
    }
}

/// 同步、纯内存的机器人识别
pub trait BotClassifier: Send + Sync {
    fn classify(&self, user_agent: Option<&str>) -> BotVerdict;
}

/// 基于最近点击历史的欺诈评分；返回 Err 时调用方按放行处理
#[async_trait]
pub trait FraudScorer: Send + Sync {
    async fn score(
        &self,
        ip: &str,
        session_id: &str,
        link_id: i64,
        user_agent: Option<&str>,
    ) -> anyhow::Result<FraudAssessment>;
}

/// UA 特征匹配 + woothee 爬虫分类
pub struct SignatureBotClassifier {
    signatures: Vec<String>,
}

impl SignatureBotClassifier {
    pub fn new(config: &BotConfig) -> Self {
        let signatures = BUILTIN_BOT_SIGNATURES
            .iter()
            .map(|s| s.to_string())
            .chain(
                config
                    .extra_signatures
                    .iter()
                    .map(|s| s.trim().to_lowercase())
                    .filter(|s| !s.is_empty()),
            )
            .collect();
        Self { signatures }
    }
}

impl Default for SignatureBotClassifier {
    fn default() -> Self {
        Self::new(&BotConfig::default())
    }
}

impl BotClassifier for SignatureBotClassifier {
    fn classify(&self, user_agent: Option<&str>) -> BotVerdict {
        let Some(ua) = user_agent.map(str::trim).filter(|ua| !ua.is_empty()) else {
            return BotVerdict {
                is_bot: false,
                reason: Some("missing user agent".to_string()),
            };
        };

        let lower = ua.to_lowercase();
        if let Some(sig) = self.signatures.iter().find(|sig| lower.contains(sig.as_str())) {
            return BotVerdict {
                is_bot: true,
                reason: Some(format!("user agent matches bot signature '{}'", sig)),
            };
        }

        if device::is_crawler(ua) {
            return BotVerdict {
                is_bot: true,
                reason: Some("user agent classified as crawler".to_string()),
            };
        }

        BotVerdict::human()
    }
}

/// 最近点击历史 + UA 形态的加权评分
pub struct RecentClickFraudScorer {
    store: Arc<dyn AffiliateStore>,
    config: FraudConfig,
}

impl RecentClickFraudScorer {
    pub fn new(store: Arc<dyn AffiliateStore>, config: FraudConfig) -> Self {
        Self { store, config }
    }

    fn window(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.config.window_secs.min(i64::MAX as u64) as i64)
    }
}

/// 把各项信号汇总为评估结果（与数据来源无关，便于单独测试）
pub fn assess(
    config: &FraudConfig,
    recent_ip_clicks: Option<usize>,
    recent_session_clicks: usize,
    user_agent: Option<&str>,
) -> FraudAssessment {
    let mut score: u16 = 0;
    let mut reasons = Vec::new();

    if let Some(count) = recent_ip_clicks
        && count >= config.max_clicks_per_ip
    {
        score += WEIGHT_IP_REPEAT as u16;
        reasons.push(format!(
            "{} recent clicks from this IP on this link (limit {})",
            count, config.max_clicks_per_ip
        ));
    }

    if recent_session_clicks >= config.max_clicks_per_session {
        score += WEIGHT_SESSION_REPEAT as u16;
        reasons.push(format!(
            "{} recent clicks from this session on this link (limit {})",
            recent_session_clicks, config.max_clicks_per_session
        ));
    }

    match user_agent.map(str::trim).filter(|ua| !ua.is_empty()) {
        None => {
            score += WEIGHT_MISSING_USER_AGENT as u16;
            reasons.push("missing user agent".to_string());
        }
        Some(ua) if ua.chars().count() < config.min_user_agent_len => {
            score += WEIGHT_SHORT_USER_AGENT as u16;
            reasons.push(format!("user agent shorter than {} chars", config.min_user_agent_len));
        }
        Some(_) => {}
    }

    let score = score.min(MAX_SCORE as u16) as u8;
    FraudAssessment {
        is_allowed: score < config.deny_score,
        score,
        reasons,
    }
}

#[async_trait]
impl FraudScorer for RecentClickFraudScorer {
    async fn score(
        &self,
        ip: &str,
        session_id: &str,
        link_id: i64,
        user_agent: Option<&str>,
    ) -> anyhow::Result<FraudAssessment> {
        let window = self.window();
        let ip_filter = ClickFilter::by_ip(link_id, ip);
        let session_filter = ClickFilter::by_session(link_id, session_id);

        let ip_lookup = async {
            if ip == UNKNOWN_IP {
                return Ok::<_, AffilinkError>(None);
            }
            self.store
                .find_recent_clicks(&ip_filter, window)
                .await
                .map(|clicks| Some(clicks.len()))
        };
        let session_lookup = self.store.find_recent_clicks(&session_filter, window);

        let (ip_clicks, session_clicks) = tokio::join!(ip_lookup, session_lookup);
        let ip_clicks = ip_clicks.map_err(|e| anyhow::anyhow!("recent IP clicks: {}", e))?;
        let session_clicks =
            session_clicks.map_err(|e| anyhow::anyhow!("recent session clicks: {}", e))?;

        let assessment = assess(&self.config, ip_clicks, session_clicks.len(), user_agent);
        trace!(
            "Fraud score for link {} ip={} -> {} {:?}",
            link_id, ip, assessment.score, assessment.reasons
        );
        Ok(assessment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BROWSER_UA: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_0) AppleWebKit/605.1.15 \
        (KHTML, like Gecko) Version/17.0 Safari/605.1.15";

    #[test]
    fn test_known_bots_are_flagged() {
        let classifier = SignatureBotClassifier::default();
        for ua in [
            "Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)",
            "Mozilla/5.0 (compatible; bingbot/2.0)",
            "facebookexternalhit/1.1",
            "curl/8.4.0",
            "python-requests/2.31.0",
        ] {
            let verdict = classifier.classify(Some(ua));
            assert!(verdict.is_bot, "{} should be a bot", ua);
            assert!(verdict.reason.is_some());
        }
    }

    #[test]
    fn test_browser_is_human() {
        let verdict = SignatureBotClassifier::default().classify(Some(BROWSER_UA));
        assert_eq!(verdict, BotVerdict::human());
    }

    #[test]
    fn test_missing_user_agent_is_suspicious_not_bot() {
        let classifier = SignatureBotClassifier::default();
        for ua in [None, Some(""), Some("   ")] {
            let verdict = classifier.classify(ua);
            assert!(!verdict.is_bot);
            assert_eq!(verdict.reason.as_deref(), Some("missing user agent"));
        }
    }

    #[test]
    fn test_extra_signatures_are_case_insensitive() {
        let classifier = SignatureBotClassifier::new(&BotConfig {
            extra_signatures: vec!["AcmeMonitor".to_string(), "  ".to_string()],
        });
        assert!(classifier.classify(Some("acmemonitor/3.2 (uptime)")).is_bot);
        assert!(!classifier.classify(Some(BROWSER_UA)).is_bot);
    }

    #[test]
    fn test_clean_request_scores_zero() {
        let result = assess(&FraudConfig::default(), Some(0), 0, Some(BROWSER_UA));
        assert_eq!(result, FraudAssessment::allow());
    }

    #[test]
    fn test_ip_repeat_denies() {
        let config = FraudConfig::default();
        let result = assess(&config, Some(config.max_clicks_per_ip), 0, Some(BROWSER_UA));
        assert_eq!(result.score, WEIGHT_IP_REPEAT);
        assert!(!result.is_allowed);
        assert_eq!(result.reasons.len(), 1);

        let below = assess(&config, Some(config.max_clicks_per_ip - 1), 0, Some(BROWSER_UA));
        assert!(below.is_allowed);
    }

    #[test]
    fn test_session_repeat_denies() {
        let config = FraudConfig::default();
        let result = assess(&config, Some(0), config.max_clicks_per_session, Some(BROWSER_UA));
        assert_eq!(result.score, WEIGHT_SESSION_REPEAT);
        assert!(!result.is_allowed);
    }

    #[test]
    fn test_user_agent_signals_alone_do_not_deny() {
        let config = FraudConfig::default();

        let missing = assess(&config, Some(0), 0, None);
        assert_eq!(missing.score, WEIGHT_MISSING_USER_AGENT);
        assert!(missing.is_allowed);

        let short = assess(&config, Some(0), 0, Some("Mozilla"));
        assert_eq!(short.score, WEIGHT_SHORT_USER_AGENT);
        assert!(short.is_allowed);
    }

    #[test]
    fn test_score_is_capped() {
        let result = assess(&FraudConfig::default(), Some(50), 50, None);
        assert_eq!(result.score, MAX_SCORE);
        assert_eq!(result.reasons.len(), 3);
        assert!(!result.is_allowed);
    }

    #[test]
    fn test_unknown_ip_skips_ip_signal() {
        let result = assess(&FraudConfig::default(), None, 0, Some(BROWSER_UA));
        assert!(result.is_allowed);
        assert_eq!(result.score, 0);
    }
}
