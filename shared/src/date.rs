//! 时间工具模块
//!
//! 服务端时间统一为 UTC (`DateTime<Utc>`)，本模块提供：
//! - 展示格式化（带 "N/A" 兜底）
//! - `datetime-local` 输入框的解析与回填
//! - 二维码有效期倒计时

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use std::fmt::Display;

// =========================================================
// 格式常量 (strftime)
// =========================================================

pub const FORMAT_DEFAULT: &str = "%b %-d, %Y";
pub const FORMAT_FULL: &str = "%A, %B %-d, %Y";
pub const FORMAT_TIME: &str = "%-I:%M %p";
pub const FORMAT_DATETIME: &str = "%b %-d, %Y %-I:%M %p";
/// `<input type="datetime-local">` 使用的格式
pub const FORMAT_INPUT: &str = "%Y-%m-%dT%H:%M";

/// 缺失时间的占位文本
pub const MISSING: &str = "N/A";

// =========================================================
// 格式化
// =========================================================

/// 按 `fmt` 格式化时间，`None` 时返回 "N/A"
pub fn format_date<Tz>(date: Option<&DateTime<Tz>>, fmt: &str) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    match date {
        Some(date) => date.format(fmt).to_string(),
        None => MISSING.to_string(),
    }
}

/// 回填到 `datetime-local` 输入框的值，`None` 时为空串
pub fn format_for_input<Tz>(date: Option<&DateTime<Tz>>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    date.map(|d| d.format(FORMAT_INPUT).to_string())
        .unwrap_or_default()
}

/// 解析 `datetime-local` 输入框的值
///
/// 输入框没有时区信息，按 `tz` 解释后转换为 UTC。
/// 同时接受完整的 RFC 3339 字符串。
pub fn parse_input<Tz: TimeZone>(value: &str, tz: &Tz) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(date) = DateTime::parse_from_rfc3339(value) {
        return Some(date.with_timezone(&Utc));
    }
    let naive = NaiveDateTime::parse_from_str(value, FORMAT_INPUT)
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S"))
        .ok()?;
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|d| d.with_timezone(&Utc))
}

// =========================================================
// 比较与倒计时
// =========================================================

/// 时间是否已经过去；`None` 视为未过去
pub fn is_past(date: Option<&DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    date.is_some_and(|d| *d < now)
}

/// 距离 `expires_at` 的剩余时间，已过期返回 `None`
///
/// 格式：`1d 02h 03m`、`02h 03m 04s` 或 `03m 04s`
pub fn countdown(expires_at: &DateTime<Utc>, now: DateTime<Utc>) -> Option<String> {
    let remaining = expires_at.signed_duration_since(now);
    let total = remaining.num_seconds();
    if total <= 0 {
        return None;
    }
    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;
    let seconds = total % 60;
    Some(if days > 0 {
        format!("{}d {:02}h {:02}m", days, hours, minutes)
    } else if hours > 0 {
        format!("{:02}h {:02}m {:02}s", hours, minutes, seconds)
    } else {
        format!("{:02}m {:02}s", minutes, seconds)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset};

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn format_falls_back_for_missing_dates() {
        assert_eq!(format_date::<Utc>(None, FORMAT_DEFAULT), "N/A");
        let date = at("2024-03-05T14:07:00Z");
        assert_eq!(format_date(Some(&date), FORMAT_DEFAULT), "Mar 5, 2024");
        assert_eq!(format_date(Some(&date), FORMAT_TIME), "2:07 PM");
        assert_eq!(format_for_input(Some(&date)), "2024-03-05T14:07");
        assert_eq!(format_for_input::<Utc>(None), "");
    }

    #[test]
    fn input_values_are_interpreted_in_the_given_zone() {
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        assert_eq!(
            parse_input("2024-03-05T14:07", &tz),
            Some(at("2024-03-05T12:07:00Z"))
        );
        assert_eq!(
            parse_input("2024-03-05T14:07:00+00:00", &tz),
            Some(at("2024-03-05T14:07:00Z"))
        );
        assert_eq!(parse_input("  ", &Utc), None);
        assert_eq!(parse_input("next tuesday", &Utc), None);
    }

    #[test]
    fn countdown_stops_at_expiry() {
        let now = at("2024-03-05T12:00:00Z");
        assert_eq!(
            countdown(&(now + Duration::seconds(65)), now).as_deref(),
            Some("01m 05s")
        );
        assert_eq!(
            countdown(&(now + Duration::seconds(3 * 3600 + 4)), now).as_deref(),
            Some("03h 00m 04s")
        );
        assert_eq!(countdown(&now, now), None);
        assert!(is_past(Some(&(now - Duration::seconds(1))), now));
        assert!(!is_past(None, now));
    }
}
