//! Calendar-day keys and timestamps.
//!
//! The daily challenge resets at local midnight, so day keys use the local offset
//! when the platform exposes it and fall back to UTC otherwise.

use time::{
    Date, OffsetDateTime, format_description::BorrowedFormatItem,
    format_description::well_known::Rfc3339, macros::format_description,
};

const DAY_KEY_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Today's calendar day as `YYYY-MM-DD`.
pub fn today_key() -> String {
    day_key(local_now().date())
}

/// Format a date as a `YYYY-MM-DD` day key.
pub fn day_key(date: Date) -> String {
    date.format(DAY_KEY_FORMAT)
        .unwrap_or_else(|_| "invalid-date".into())
}

/// Parse a `YYYY-MM-DD` day key.
pub fn parse_day_key(key: &str) -> Option<Date> {
    Date::parse(key, DAY_KEY_FORMAT).ok()
}

/// Whether `earlier` is the calendar day right before `later`.
pub fn is_previous_day(earlier: &str, later: &str) -> bool {
    match (parse_day_key(earlier), parse_day_key(later)) {
        (Some(earlier), Some(later)) => later.previous_day() == Some(earlier),
        _ => false,
    }
}

/// Milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

/// Current instant formatted as RFC 3339.
pub fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "invalid-timestamp".into())
}

fn local_now() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn day_key_round_trips() {
        let key = day_key(date!(2026 - 01 - 19));
        assert_eq!(key, "2026-01-19");
        assert_eq!(parse_day_key(&key), Some(date!(2026 - 01 - 19)));
        assert_eq!(parse_day_key("19/01/2026"), None);
    }

    #[test]
    fn previous_day_crosses_month_boundaries() {
        assert!(is_previous_day("2026-02-28", "2026-03-01"));
        assert!(is_previous_day("2025-12-31", "2026-01-01"));
        assert!(!is_previous_day("2026-01-01", "2026-01-01"));
        assert!(!is_previous_day("2026-01-01", "2026-01-03"));
        assert!(!is_previous_day("garbage", "2026-01-03"));
    }

    #[test]
    fn today_key_is_well_formed() {
        assert!(parse_day_key(&today_key()).is_some());
    }
}
