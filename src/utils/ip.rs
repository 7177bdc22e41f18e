//! 客户端 IP 提取与黑名单匹配
//!
//! 优先级：`X-Forwarded-For` 第一个值 → `X-Real-IP` → 连接地址 → `"unknown"`

use std::net::IpAddr;

use actix_web::HttpRequest;
use actix_web::http::header::HeaderMap;

/// 无法确定来源时使用的占位值（欺诈评分会跳过 IP 维度）
pub const UNKNOWN_IP: &str = "unknown";

/// 从 HttpRequest 提取客户端 IP
pub fn extract_client_ip(req: &HttpRequest) -> String {
    client_ip_from_parts(req.headers(), req.peer_addr().map(|addr| addr.ip()))
}

/// 从请求头与连接地址计算客户端 IP
pub fn client_ip_from_parts(headers: &HeaderMap, peer: Option<IpAddr>) -> String {
    forwarded_ip(headers)
        .or_else(|| peer.map(|ip| ip.to_string()))
        .unwrap_or_else(|| UNKNOWN_IP.to_string())
}

fn forwarded_ip(headers: &HeaderMap) -> Option<String> {
    let header_value = |name: &str| {
        headers
            .get(name)
            .and_then(|h| h.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    };

    header_value("x-forwarded-for")
        .and_then(|s| s.split(',').next())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .or_else(|| header_value("x-real-ip"))
        .map(String::from)
}

/// CIDR 检查
pub fn ip_in_cidr(ip: &IpAddr, cidr: &str) -> bool {
    let Some((network, prefix_len)) = cidr.split_once('/') else {
        return false;
    };
    let Ok(prefix_len) = prefix_len.trim().parse::<u32>() else {
        return false;
    };
    let Ok(network_addr) = network.trim().parse::<IpAddr>() else {
        return false;
    };

    match (ip, network_addr) {
        (IpAddr::V4(ip), IpAddr::V4(net)) if prefix_len <= 32 => {
            let mask = u32::MAX.checked_shl(32 - prefix_len).unwrap_or(0);
            (u32::from(*ip) & mask) == (u32::from(net) & mask)
        }
        (IpAddr::V6(ip), IpAddr::V6(net)) if prefix_len <= 128 => {
            let mask = u128::MAX.checked_shl(128 - prefix_len).unwrap_or(0);
            (u128::from(*ip) & mask) == (u128::from(net) & mask)
        }
        _ => false,
    }
}

/// 判断 IP 是否命中一条黑名单记录（单 IP 或 CIDR）
///
/// 无法解析的 IP（包括 `"unknown"`）只做字符串精确比较。
pub fn ip_matches_entry(ip: &str, entry: &str) -> bool {
    let entry = entry.trim();
    let Ok(addr) = ip.parse::<IpAddr>() else {
        return ip == entry;
    };

    if entry.contains('/') {
        ip_in_cidr(&addr, entry)
    } else {
        entry.parse::<IpAddr>().is_ok_and(|e| e == addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::header::{HeaderName, HeaderValue};

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (k, v) in pairs {
            map.insert(
                HeaderName::from_static(k),
                HeaderValue::from_static(v),
            );
        }
        map
    }

    #[test]
    fn test_forwarded_for_first_value_wins() {
        let h = headers(&[
            ("x-forwarded-for", "203.0.113.7, 10.0.0.1"),
            ("x-real-ip", "198.51.100.2"),
        ]);
        let peer = Some("127.0.0.1".parse().unwrap());
        assert_eq!(client_ip_from_parts(&h, peer), "203.0.113.7");
    }

    #[test]
    fn test_real_ip_then_peer_then_unknown() {
        let h = headers(&[("x-real-ip", "198.51.100.2")]);
        assert_eq!(client_ip_from_parts(&h, None), "198.51.100.2");

        let peer = Some("192.0.2.9".parse().unwrap());
        assert_eq!(client_ip_from_parts(&HeaderMap::new(), peer), "192.0.2.9");

        assert_eq!(client_ip_from_parts(&HeaderMap::new(), None), UNKNOWN_IP);
    }

    #[test]
    fn test_blank_forwarded_for_falls_through() {
        let h = headers(&[("x-forwarded-for", " "), ("x-real-ip", "198.51.100.2")]);
        assert_eq!(client_ip_from_parts(&h, None), "198.51.100.2");
    }

    #[test]
    fn test_ip_in_cidr() {
        let ip: IpAddr = "192.168.1.100".parse().unwrap();
        assert!(ip_in_cidr(&ip, "192.168.1.0/24"));
        assert!(ip_in_cidr(&ip, "0.0.0.0/0"));
        assert!(!ip_in_cidr(&ip, "192.168.2.0/24"));
        assert!(!ip_in_cidr(&ip, "192.168.1.0/33"));
        assert!(!ip_in_cidr(&ip, "garbage"));

        let v6: IpAddr = "2001:db8::1".parse().unwrap();
        assert!(ip_in_cidr(&v6, "2001:db8::/32"));
        assert!(!ip_in_cidr(&v6, "10.0.0.0/8"));
    }

    #[test]
    fn test_ip_matches_entry() {
        assert!(ip_matches_entry("10.1.2.3", "10.0.0.0/8"));
        assert!(ip_matches_entry("203.0.113.5", "203.0.113.5"));
        assert!(ip_matches_entry("203.0.113.5", " 203.0.113.5 "));
        assert!(!ip_matches_entry("203.0.113.6", "203.0.113.5"));
        assert!(!ip_matches_entry(UNKNOWN_IP, "10.0.0.0/8"));
        assert!(ip_matches_entry(UNKNOWN_IP, UNKNOWN_IP));
    }
}
