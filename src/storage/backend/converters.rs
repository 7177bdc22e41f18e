use tracing::warn;

use crate::storage::{
    AffiliateLink, AffiliatePartner, ClickEvent, LinkStatus, LinkWithPartner, PartnerStatus,
};
use migration::entities::{affiliate_link, affiliate_partner, click};

/// 数据库中的未知状态一律视为不可用，避免脏数据放行跳转
fn parse_link_status(raw: &str, code: &str) -> LinkStatus {
    raw.parse().unwrap_or_else(|_| {
        warn!("Unknown link status '{}' for {}, treating as archived", raw, code);
        LinkStatus::Archived
    })
}

fn parse_partner_status(raw: &str, id: i64) -> PartnerStatus {
    raw.parse().unwrap_or_else(|_| {
        warn!(
            "Unknown partner status '{}' for partner {}, treating as inactive",
            raw, id
        );
        PartnerStatus::Inactive
    })
}

pub fn model_to_partner(model: affiliate_partner::Model) -> AffiliatePartner {
    AffiliatePartner {
        status: parse_partner_status(&model.status, model.id),
        id: model.id,
        name: model.name,
        cookie_duration: model.cookie_duration,
    }
}

pub fn model_to_link(model: affiliate_link::Model) -> AffiliateLink {
    AffiliateLink {
        status: parse_link_status(&model.status, &model.short_code),
        id: model.id,
        short_code: model.short_code,
        original_url: model.original_url,
        tracking_url: model.tracking_url,
        expires_at: model.expires_at,
        partner_id: model.partner_id,
        product_id: model.product_id,
        campaign_id: model.campaign_id,
        click_count: model.click_count,
        created_at: model.created_at,
    }
}

/// 组合 find_also_related 的结果；合作方缺失（外键被破坏）时返回 None
pub fn models_to_link_with_partner(
    link: affiliate_link::Model,
    partner: Option<affiliate_partner::Model>,
) -> Option<LinkWithPartner> {
    let Some(partner) = partner else {
        warn!(
            "Link {} references missing partner {}",
            link.short_code, link.partner_id
        );
        return None;
    };

    Some(LinkWithPartner {
        link: model_to_link(link),
        partner: model_to_partner(partner),
    })
}

pub fn model_to_click(model: click::Model) -> ClickEvent {
    ClickEvent {
        link_id: model.link_id,
        partner_id: model.partner_id,
        product_id: model.product_id,
        session_id: model.session_id,
        ip_address: model.ip_address,
        user_agent: model.user_agent,
        referrer: model.referrer,
        device_type: model.device_type,
        browser: model.browser,
        os: model.os,
        clicked_at: model.clicked_at,
        is_bot: model.is_bot,
    }
}

pub fn click_to_active_model(event: &ClickEvent) -> click::ActiveModel {
    use sea_orm::ActiveValue::*;

    click::ActiveModel {
        id: NotSet,
        link_id: Set(event.link_id),
        partner_id: Set(event.partner_id),
        product_id: Set(event.product_id),
        session_id: Set(event.session_id.clone()),
        ip_address: Set(event.ip_address.clone()),
        user_agent: Set(event.user_agent.clone()),
        referrer: Set(event.referrer.clone()),
        device_type: Set(event.device_type.clone()),
        browser: Set(event.browser.clone()),
        os: Set(event.os.clone()),
        is_bot: Set(event.is_bot),
        clicked_at: Set(event.clicked_at),
    }
}
