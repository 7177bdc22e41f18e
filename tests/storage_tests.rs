//! Storage backend tests
//!
//! SeaOrmStorage against temporary SQLite databases (migrations included).

use chrono::{Duration, Utc};
use tempfile::TempDir;

use affilink::config::DatabaseConfig;
use affilink::storage::backend::{NewLink, NewPartner, SeaOrmStorage};
use affilink::storage::{AffiliateStore, ClickEvent, ClickFilter, LinkStatus, PartnerStatus};
use affilink::tracking::ClickSink;

/// 创建临时 SQLite 数据库的存储实例
async fn create_temp_storage() -> (SeaOrmStorage, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("test.db");
    let config = DatabaseConfig {
        database_url: format!("sqlite://{}?mode=rwc", db_path.display()),
        ..DatabaseConfig::default()
    };

    let storage = SeaOrmStorage::new(&config, "sqlite")
        .await
        .expect("Failed to create storage");

    (storage, temp_dir)
}

fn new_partner(name: &str, cookie_duration: Option<i32>) -> NewPartner {
    NewPartner {
        name: name.to_string(),
        status: PartnerStatus::Active,
        cookie_duration,
    }
}

fn new_link(partner_id: i64, code: Option<&str>) -> NewLink {
    NewLink {
        partner_id,
        original_url: "https://vendor.example/product/9".to_string(),
        tracking_url: None,
        expires_at: None,
        product_id: Some(9),
        campaign_id: None,
        short_code: code.map(str::to_string),
    }
}

fn click_on(link_id: i64, partner_id: i64, ip: &str, session_id: &str) -> ClickEvent {
    ClickEvent {
        link_id,
        partner_id,
        product_id: Some(9),
        session_id: session_id.to_string(),
        ip_address: ip.to_string(),
        user_agent: Some("Mozilla/5.0 (X11; Linux x86_64) Firefox/121.0".to_string()),
        referrer: Some("https://blog.example/".to_string()),
        device_type: Some("pc".to_string()),
        browser: Some("Firefox".to_string()),
        os: Some("Linux".to_string()),
        clicked_at: Utc::now(),
        is_bot: false,
    }
}

#[tokio::test]
async fn test_create_and_find_link() {
    let (storage, _dir) = create_temp_storage().await;

    let partner = storage
        .create_partner(new_partner("Acme", Some(45)))
        .await
        .unwrap();
    assert_eq!(partner.status, PartnerStatus::Active);
    assert_eq!(partner.cookie_duration, Some(45));

    let mut request = new_link(partner.id, Some("abc123"));
    request.tracking_url = Some("https://vendor.example/product/9?aff=acme".to_string());
    request.expires_at = Some(Utc::now() + Duration::days(30));
    let link = storage.create_link(request).await.unwrap();
    assert_eq!(link.short_code, "abc123");
    assert_eq!(link.status, LinkStatus::Active);

    let found = storage
        .find_link_by_short_code("abc123")
        .await
        .unwrap()
        .expect("link should exist");
    assert_eq!(found.link.id, link.id);
    assert_eq!(found.partner.id, partner.id);
    assert_eq!(found.partner.cookie_duration, Some(45));
    assert_eq!(
        found.link.destination(),
        "https://vendor.example/product/9?aff=acme"
    );
    assert!(found.link.expires_at.is_some());

    assert!(storage.find_link_by_short_code("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn test_generated_codes_are_unguessable_and_unique() {
    let (storage, _dir) = create_temp_storage().await;
    let partner = storage.create_partner(new_partner("Acme", None)).await.unwrap();

    let a = storage.create_link(new_link(partner.id, None)).await.unwrap();
    let b = storage.create_link(new_link(partner.id, None)).await.unwrap();
    assert_eq!(a.short_code.len(), 12);
    assert_ne!(a.short_code, b.short_code);
}

#[tokio::test]
async fn test_create_link_rejections() {
    let (storage, _dir) = create_temp_storage().await;
    let partner = storage.create_partner(new_partner("Acme", None)).await.unwrap();
    storage
        .create_link(new_link(partner.id, Some("taken")))
        .await
        .unwrap();

    let dup = storage.create_link(new_link(partner.id, Some("taken"))).await;
    assert_eq!(dup.unwrap_err().code(), "E006");

    let bad_code = storage.create_link(new_link(partner.id, Some("a/b"))).await;
    assert_eq!(bad_code.unwrap_err().code(), "E006");

    let mut js = new_link(partner.id, None);
    js.original_url = "javascript:alert(1)".to_string();
    assert_eq!(storage.create_link(js).await.unwrap_err().code(), "E006");

    let orphan = storage.create_link(new_link(9999, None)).await;
    assert_eq!(orphan.unwrap_err().code(), "E007");

    let empty = storage.create_partner(new_partner("  ", None)).await;
    assert_eq!(empty.unwrap_err().code(), "E006");
}

#[tokio::test]
async fn test_insert_click_increments_counter() {
    let (storage, _dir) = create_temp_storage().await;
    let partner = storage.create_partner(new_partner("Acme", None)).await.unwrap();
    let link = storage
        .create_link(new_link(partner.id, Some("count-me")))
        .await
        .unwrap();

    for _ in 0..3 {
        storage
            .insert_click(&click_on(
                link.id,
                partner.id,
                "198.51.100.1",
                "session-aaaaaaaaaaaaaaaaaaaa",
            ))
            .await
            .unwrap();
    }

    let found = storage
        .find_link_by_short_code("count-me")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.link.click_count, 3);
}

#[tokio::test]
async fn test_find_recent_clicks_filters() {
    let (storage, _dir) = create_temp_storage().await;
    let partner = storage.create_partner(new_partner("Acme", None)).await.unwrap();
    let link = storage
        .create_link(new_link(partner.id, Some("recent")))
        .await
        .unwrap();
    let other = storage
        .create_link(new_link(partner.id, Some("other")))
        .await
        .unwrap();

    let session_a = "session-aaaaaaaaaaaaaaaaaaaa";
    let session_b = "session-bbbbbbbbbbbbbbbbbbbb";
    storage
        .insert_click(&click_on(link.id, partner.id, "198.51.100.1", session_a))
        .await
        .unwrap();
    storage
        .insert_click(&click_on(link.id, partner.id, "198.51.100.1", session_b))
        .await
        .unwrap();
    storage
        .insert_click(&click_on(other.id, partner.id, "198.51.100.1", session_a))
        .await
        .unwrap();

    let mut stale = click_on(link.id, partner.id, "198.51.100.1", session_a);
    stale.clicked_at = Utc::now() - Duration::hours(3);
    storage.insert_click(&stale).await.unwrap();

    let window = Duration::minutes(5);
    let by_ip = storage
        .find_recent_clicks(&ClickFilter::by_ip(link.id, "198.51.100.1"), window)
        .await
        .unwrap();
    assert_eq!(by_ip.len(), 2);

    let by_session = storage
        .find_recent_clicks(&ClickFilter::by_session(link.id, session_a), window)
        .await
        .unwrap();
    assert_eq!(by_session.len(), 1);
    assert_eq!(by_session[0].browser.as_deref(), Some("Firefox"));

    let wide = storage
        .find_recent_clicks(&ClickFilter::by_session(link.id, session_a), Duration::days(1))
        .await
        .unwrap();
    assert_eq!(wide.len(), 2);
}

#[tokio::test]
async fn test_block_list_single_ip_and_cidr() {
    let (storage, _dir) = create_temp_storage().await;

    storage.block_ip("203.0.113.0/24", Some("scraper farm".to_string())).await.unwrap();
    storage.block_ip("192.0.2.55", None).await.unwrap();
    storage.block_ip("2001:db8::/32", None).await.unwrap();
    assert!(storage.block_ip("not-an-ip", None).await.is_err());

    assert!(storage.is_ip_blocked("203.0.113.200").await.unwrap());
    assert!(storage.is_ip_blocked("192.0.2.55").await.unwrap());
    assert!(storage.is_ip_blocked("2001:db8::1").await.unwrap());
    assert!(!storage.is_ip_blocked("192.0.2.56").await.unwrap());
    assert!(!storage.is_ip_blocked("198.51.100.1").await.unwrap());
    assert!(!storage.is_ip_blocked("unknown").await.unwrap());
}

#[tokio::test]
async fn test_ping() {
    let (storage, _dir) = create_temp_storage().await;
    storage.ping().await.unwrap();
}
