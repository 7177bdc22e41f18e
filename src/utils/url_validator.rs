//! 目标 URL 校验
//!
//! 联盟链接只允许跳转到 http/https 地址

use url::Url;

use crate::errors::{AffilinkError, Result};

const DANGEROUS_PROTOCOLS: &[&str] = &["javascript:", "data:", "file:", "vbscript:", "blob:"];

/// 校验跳转目标（原始地址或追踪地址）
pub fn validate_destination_url(url: &str) -> Result<()> {
    let url = url.trim();
    if url.is_empty() {
        return Err(AffilinkError::validation("URL cannot be empty"));
    }

    let lower = url.to_ascii_lowercase();
    if let Some(proto) = DANGEROUS_PROTOCOLS.iter().find(|p| lower.starts_with(*p)) {
        return Err(AffilinkError::validation(format!(
            "Dangerous protocol blocked: {}",
            proto
        )));
    }

    let parsed =
        Url::parse(url).map_err(|e| AffilinkError::validation(format!("Invalid URL: {}", e)))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(AffilinkError::validation(format!(
            "Unsupported protocol '{}': only http and https are allowed",
            other
        ))),
    }
}
