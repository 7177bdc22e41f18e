//! 根据 UserAgent 推导设备类型、浏览器与操作系统（woothee）

use woothee::parser::Parser;

const UNKNOWN: &str = "UNKNOWN";

/// 解析结果；woothee 无法识别的字段为 None
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceInfo {
    /// pc / smartphone / mobilephone / appliance / crawler / misc
    pub device_type: Option<String>,
    pub browser: Option<String>,
    pub os: Option<String>,
}

fn known(value: &str) -> Option<String> {
    (!value.is_empty() && value != UNKNOWN).then(|| value.to_string())
}

impl DeviceInfo {
    pub fn from_user_agent(user_agent: Option<&str>) -> Self {
        let Some(ua) = user_agent.map(str::trim).filter(|ua| !ua.is_empty()) else {
            return Self::default();
        };

        let result = Parser::new().parse(ua).unwrap_or_default();
        Self {
            device_type: known(result.category),
            browser: known(result.name),
            os: known(result.os),
        }
    }
}

/// woothee 是否把该 UA 归类为爬虫
pub fn is_crawler(user_agent: &str) -> bool {
    Parser::new()
        .parse(user_agent)
        .is_some_and(|result| result.category == "crawler")
}
