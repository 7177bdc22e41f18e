use chrono::{DateTime, Duration, Utc};

use crate::errors::{AffilinkError, Result};

/// 解析链接过期时间
///
/// - RFC3339：`2026-12-31T23:59:59Z`
/// - 相对时间（从现在起）：`30d`、`12h`、`1w`、`1d12h`、`90m`
pub fn parse_expiry(input: &str) -> Result<DateTime<Utc>> {
    let input = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }

    let offset = parse_relative(input)?;
    Utc::now()
        .checked_add_signed(offset)
        .ok_or_else(|| AffilinkError::date_parse(format!("Expiry out of range: '{}'", input)))
}

fn parse_relative(input: &str) -> Result<Duration> {
    let invalid = || {
        AffilinkError::date_parse(format!(
            "Invalid expiry '{}': use RFC3339 or a relative form like 30d, 12h, 1d12h",
            input
        ))
    };

    let mut total = Duration::zero();
    let mut rest = input;
    while !rest.is_empty() {
        let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
        let unit_len = rest[digits..]
            .bytes()
            .take_while(u8::is_ascii_alphabetic)
            .count();
        if digits == 0 || unit_len == 0 {
            return Err(invalid());
        }

        let n: i64 = rest[..digits].parse().map_err(|_| invalid())?;
        let part = match &rest[digits..digits + unit_len] {
            "s" => Duration::try_seconds(n),
            "m" => Duration::try_minutes(n),
            "h" => Duration::try_hours(n),
            "d" => Duration::try_days(n),
            "w" => Duration::try_weeks(n),
            _ => None,
        }
        .ok_or_else(invalid)?;

        total = total.checked_add(&part).ok_or_else(invalid)?;
        rest = &rest[digits + unit_len..];
    }

    if total <= Duration::zero() {
        return Err(invalid());
    }
    Ok(total)
}
