//! Calendar utilities: date-key formatting, weekday tokens, and day/week/month
//! arithmetic.
//!
//! All per-date state in the tracker is keyed by the canonical `YYYY-MM-DD`
//! date-key string: zero-padded, local calendar date, no time-of-day or
//! timezone offset.

use chrono::{Datelike, NaiveDate};

use crate::fields::Weekday;

/// Format a date as its canonical `YYYY-MM-DD` key.
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parse a canonical date-key back into a date. Malformed keys yield `None`;
/// callers degrade to "no occurrence"/"not completed" rather than erroring.
pub fn parse_date_key(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key, "%Y-%m-%d").ok()
}

/// Whole days from `from` to `to` (negative when `to` precedes `from`).
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

/// Whole weeks from `from` to `to`, floored (day 0-6 is week 0, day 7-13 is
/// week 1, and so on).
pub fn week_offset(from: NaiveDate, to: NaiveDate) -> i64 {
    days_between(from, to).div_euclid(7)
}

/// Calendar month difference between two dates, ignoring day-of-month
/// (January to March of the same year is 2 regardless of the days involved).
pub fn month_offset(from: NaiveDate, to: NaiveDate) -> i64 {
    let from_months = from.year() as i64 * 12 + from.month() as i64;
    let to_months = to.year() as i64 * 12 + to.month() as i64;
    to_months - from_months
}

/// Weekday token for a date.
pub fn weekday_token(date: NaiveDate) -> Weekday {
    Weekday::from_chrono(date.weekday())
}

/// True for Saturday and Sunday.
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(weekday_token(date), Weekday::Sat | Weekday::Sun)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_date_key_round_trip() {
        let date = d(2024, 6, 3);
        assert_eq!(date_key(date), "2024-06-03");
        assert_eq!(parse_date_key("2024-06-03"), Some(date));
        assert_eq!(parse_date_key("2024-13-01"), None);
        assert_eq!(parse_date_key("not a date"), None);
    }

    #[test]
    fn test_days_and_weeks() {
        assert_eq!(days_between(d(2024, 1, 1), d(2024, 1, 4)), 3);
        assert_eq!(days_between(d(2024, 1, 4), d(2024, 1, 1)), -3);
        assert_eq!(week_offset(d(2024, 5, 6), d(2024, 5, 8)), 0);
        assert_eq!(week_offset(d(2024, 5, 6), d(2024, 5, 13)), 1);
        assert_eq!(week_offset(d(2024, 5, 6), d(2024, 5, 20)), 2);
    }

    #[test]
    fn test_month_offset() {
        assert_eq!(month_offset(d(2024, 1, 31), d(2024, 3, 31)), 2);
        assert_eq!(month_offset(d(2023, 11, 15), d(2024, 2, 1)), 3);
        assert_eq!(month_offset(d(2024, 5, 1), d(2024, 5, 31)), 0);
    }

    #[test]
    fn test_weekday_tokens() {
        // 2024-05-06 is a Monday.
        assert_eq!(weekday_token(d(2024, 5, 6)), Weekday::Mon);
        assert_eq!(weekday_token(d(2024, 5, 11)), Weekday::Sat);
        assert!(is_weekend(d(2024, 5, 11)));
        assert!(is_weekend(d(2024, 5, 12)));
        assert!(!is_weekend(d(2024, 5, 10)));
    }
}
