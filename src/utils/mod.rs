pub mod expiry;
pub mod ip;
pub mod url_validator;

/// 短码最大长度
pub const MAX_SHORT_CODE_LEN: usize = 64;

/// 生成的短码长度（62^12 ≈ 3.2e21，不可枚举）
pub const GENERATED_CODE_LEN: usize = 12;

pub fn generate_random_code(length: usize) -> String {
    use std::iter;

    let chars = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

    iter::repeat_with(|| chars[rand::random_range(0..chars.len())] as char)
        .take(length)
        .collect()
}

/// 短码格式校验：1-64 个 `[A-Za-z0-9_-]`
pub fn is_valid_short_code(code: &str) -> bool {
    !code.is_empty()
        && code.len() <= MAX_SHORT_CODE_LEN
        && code
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}
