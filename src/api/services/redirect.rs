//! 联盟链接跳转
//!
//! 处理顺序：解析短码 → 可跳转性 → IP 黑名单 → 机器人/欺诈识别
//! → 会话 → 投递点击 → 302。
//!
//! 任何情况下都返回 302（错误跳回首页并带 `?error=<code>`），
//! 点击写入不在响应路径上。

use std::sync::Arc;

use actix_web::http::header::{self, HeaderValue};
use actix_web::{HttpRequest, HttpResponse, Responder, web};
use chrono::Utc;
use tracing::{debug, info, trace, warn};

use crate::cache::{BlockListCache, LinkCache};
use crate::config::StaticConfig;
use crate::storage::{AffiliateStore, ClickEvent};
use crate::tracking::{
    AttributionCookie, BotClassifier, ClickRecorder, FraudAssessment, FraudScorer, LinkResolver,
    RecentClickFraudScorer, Resolution, SessionManager, SessionToken, SignatureBotClassifier,
};
use crate::utils::ip::{UNKNOWN_IP, extract_client_ip};

/// 跳回首页时附带的错误码
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectError {
    InvalidLink,
    ExpiredLink,
    PartnerInactive,
}

impl RedirectError {
    pub fn code(&self) -> &'static str {
        match self {
            RedirectError::InvalidLink => "invalid_link",
            RedirectError::ExpiredLink => "expired_link",
            RedirectError::PartnerInactive => "partner_inactive",
        }
    }
}

/// 点击的处理方式
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recording {
    /// 正常点击
    Clean,
    /// 机器人点击，照常记录并打标
    Bot,
    /// 欺诈评分拒绝，不记录（跳转照常）
    Skipped(FraudAssessment),
}

/// 一次跳转请求的输入（与 HTTP 框架无关）
#[derive(Debug, Clone, Default)]
pub struct RedirectRequest {
    pub short_code: String,
    pub client_ip: String,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
    pub session_cookie: Option<String>,
}

#[derive(Debug, Clone)]
pub enum RedirectOutcome {
    /// 跳回首页，不设置 Cookie
    Error {
        location: String,
        reason: RedirectError,
    },
    /// IP 在黑名单中：直接跳转目标，不设置 Cookie，不记录点击
    Untracked { location: String },
    /// 正常跳转：设置会话与归因 Cookie
    Tracked {
        location: String,
        session: SessionToken,
        attribution: AttributionCookie,
        recording: Recording,
    },
}

impl RedirectOutcome {
    pub fn location(&self) -> &str {
        match self {
            RedirectOutcome::Error { location, .. }
            | RedirectOutcome::Untracked { location }
            | RedirectOutcome::Tracked { location, .. } => location,
        }
    }
}

/// 在首页地址后追加 `error=<code>`
fn error_location(homepage: &str, reason: RedirectError) -> String {
    let separator = if homepage.contains('?') { '&' } else { '?' };
    format!("{}{}error={}", homepage, separator, reason.code())
}

pub struct RedirectService {
    resolver: LinkResolver,
    store: Arc<dyn AffiliateStore>,
    blocklist: BlockListCache,
    bot_classifier: Arc<dyn BotClassifier>,
    fraud_scorer: Arc<dyn FraudScorer>,
    sessions: SessionManager,
    recorder: Arc<ClickRecorder>,
    homepage_url: String,
}

impl RedirectService {
    /// 按配置装配默认策略（特征匹配识别机器人，最近点击历史评分）
    pub fn new(
        store: Arc<dyn AffiliateStore>,
        recorder: Arc<ClickRecorder>,
        config: &StaticConfig,
    ) -> Self {
        let tracking = &config.tracking;
        Self {
            resolver: LinkResolver::new(store.clone(), LinkCache::from_config(&config.cache)),
            blocklist: BlockListCache::from_config(&config.cache),
            bot_classifier: Arc::new(SignatureBotClassifier::new(&tracking.bot)),
            fraud_scorer: Arc::new(RecentClickFraudScorer::new(
                store.clone(),
                tracking.fraud.clone(),
            )),
            sessions: SessionManager::new(tracking),
            homepage_url: tracking.homepage_url.clone(),
            store,
            recorder,
        }
    }

    pub fn with_bot_classifier(mut self, classifier: Arc<dyn BotClassifier>) -> Self {
        self.bot_classifier = classifier;
        self
    }

    pub fn with_fraud_scorer(mut self, scorer: Arc<dyn FraudScorer>) -> Self {
        self.fraud_scorer = scorer;
        self
    }

    /// 跳转决策，不会失败：存储或评分出错时按 not found / 放行处理
    pub async fn handle(&self, request: &RedirectRequest) -> RedirectOutcome {
        let record = match self.resolver.resolve(&request.short_code).await {
            Resolution::Eligible(record) => record,
            Resolution::NotFound => {
                return self.error(&request.short_code, RedirectError::InvalidLink);
            }
            Resolution::Inactive(_) | Resolution::Expired(_) => {
                return self.error(&request.short_code, RedirectError::ExpiredLink);
            }
            Resolution::PartnerInactive(_) => {
                return self.error(&request.short_code, RedirectError::PartnerInactive);
            }
        };
        let location = record.link.destination().to_string();

        if self.is_blocked(&request.client_ip).await {
            info!(
                "Blocked IP {} followed {}, redirecting without tracking",
                request.client_ip, request.short_code
            );
            return RedirectOutcome::Untracked { location };
        }

        let user_agent = request.user_agent.as_deref();
        let verdict = self.bot_classifier.classify(user_agent);
        // 先取会话 ID，评分需要查询 (会话, 链接) 的点击历史
        let session = self
            .sessions
            .get_or_create_session(request.session_cookie.as_deref());

        let assessment = match self
            .fraud_scorer
            .score(&request.client_ip, &session.id, record.link.id, user_agent)
            .await
        {
            Ok(assessment) => assessment,
            Err(e) => {
                warn!(
                    "Fraud scoring failed for {}, allowing: {}",
                    request.short_code, e
                );
                FraudAssessment::allow()
            }
        };

        let recording = if verdict.is_bot {
            Recording::Bot
        } else if assessment.is_allowed {
            Recording::Clean
        } else {
            Recording::Skipped(assessment)
        };

        match &recording {
            Recording::Skipped(assessment) => {
                info!(
                    "Click on {} not recorded: fraud score {} ({})",
                    request.short_code,
                    assessment.score,
                    assessment.reasons.join("; ")
                );
            }
            Recording::Clean | Recording::Bot => {
                if verdict.is_bot {
                    debug!(
                        "Bot click on {}: {}",
                        request.short_code,
                        verdict.reason.as_deref().unwrap_or("unspecified")
                    );
                }
                self.recorder.record(ClickEvent {
                    link_id: record.link.id,
                    partner_id: record.partner.id,
                    product_id: record.link.product_id,
                    session_id: session.id.clone(),
                    ip_address: request.client_ip.clone(),
                    user_agent: request.user_agent.clone(),
                    referrer: request.referrer.clone(),
                    device_type: None,
                    browser: None,
                    os: None,
                    clicked_at: Utc::now(),
                    is_bot: verdict.is_bot,
                });
            }
        }

        let attribution = self
            .sessions
            .build_attribution_cookie(&record.partner, &session.id);
        trace!(
            "Redirecting {} -> {} (partner {}, new session: {})",
            request.short_code, location, record.partner.id, session.is_new
        );

        RedirectOutcome::Tracked {
            location,
            session,
            attribution,
            recording,
        }
    }

    fn error(&self, short_code: &str, reason: RedirectError) -> RedirectOutcome {
        debug!("Redirect for {:?} failed: {}", short_code, reason.code());
        RedirectOutcome::Error {
            location: error_location(&self.homepage_url, reason),
            reason,
        }
    }

    /// 黑名单查询失败时视为未拉黑；只缓存成功的查询结果
    async fn is_blocked(&self, ip: &str) -> bool {
        if ip == UNKNOWN_IP {
            return false;
        }
        if let Some(blocked) = self.blocklist.get(ip).await {
            return blocked;
        }
        match self.store.is_ip_blocked(ip).await {
            Ok(blocked) => {
                self.blocklist.insert(ip, blocked).await;
                blocked
            }
            Err(e) => {
                warn!("Block list lookup failed for {}, allowing: {}", ip, e);
                false
            }
        }
    }

    /// 把决策转换为 HTTP 响应
    pub fn to_response(&self, outcome: &RedirectOutcome) -> HttpResponse {
        let mut builder = HttpResponse::Found();
        builder
            .insert_header((header::CACHE_CONTROL, HeaderValue::from_static("no-store")))
            .insert_header((header::LOCATION, outcome.location()));

        if let RedirectOutcome::Tracked {
            session,
            attribution,
            ..
        } = outcome
        {
            builder
                .cookie(self.sessions.session_cookie(session))
                .cookie(self.sessions.attribution_cookie(attribution));
        }

        builder.finish()
    }

    pub async fn handle_redirect(
        req: HttpRequest,
        path: web::Path<String>,
        service: web::Data<RedirectService>,
    ) -> impl Responder {
        let request = RedirectRequest {
            short_code: path.into_inner(),
            client_ip: extract_client_ip(&req),
            user_agent: header_string(&req, header::USER_AGENT),
            referrer: header_string(&req, header::REFERER),
            session_cookie: req
                .cookie(service.sessions.session_cookie_name())
                .map(|c| c.value().to_string()),
        };

        let outcome = service.handle(&request).await;
        service.to_response(&outcome)
    }
}

fn header_string(req: &HttpRequest, name: header::HeaderName) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

/// Redirect 路由配置
pub fn redirect_routes() -> actix_web::Scope {
    web::scope("/go").route("/{code}", web::get().to(RedirectService::handle_redirect))
}
