//! Observation timestamp parsing and formatting.
//!
//! Observation times are zone-less: a manual entry records whatever the user
//! typed and forecast items are normalized to UTC before they are stored.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use thiserror::Error;

/// Display format used in listings and CSV exports.
pub const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Accepted `date time` layouts, tried in order.
const DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Error returned when a string is not a recognizable point in time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid datetime: {0:?}")]
pub struct TimestampError(pub String);

/// Parses an ISO-8601-like timestamp.
///
/// Accepts `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM[:SS[.fff]]` (a space may replace
/// the `T`) and full RFC 3339 strings. Offsets are converted to UTC and
/// dropped; a bare date means midnight.
pub fn parse_timestamp(input: &str) -> Result<NaiveDateTime, TimestampError> {
    let s = input.trim();
    if s.is_empty() {
        return Err(TimestampError(input.to_string()));
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(dt);
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.naive_utc());
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(dt) = date.and_hms_opt(0, 0, 0) {
            return Ok(dt);
        }
    }

    Err(TimestampError(input.to_string()))
}

/// Converts unix seconds to a naive UTC timestamp.
pub fn from_unix_seconds(secs: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp(secs, 0).map(|dt| dt.naive_utc())
}

/// Formats a timestamp for display and export.
pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(DISPLAY_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Timelike};

    fn ymd_hms(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn test_parse_minutes_precision() {
        assert_eq!(
            parse_timestamp("2024-01-01T03:00").unwrap(),
            ymd_hms(2024, 1, 1, 3, 0, 0)
        );
    }

    #[test]
    fn test_parse_forecast_text_format() {
        assert_eq!(
            parse_timestamp("2024-06-10 15:00:00").unwrap(),
            ymd_hms(2024, 6, 10, 15, 0, 0)
        );
    }

    #[test]
    fn test_parse_fractional_seconds() {
        let ts = parse_timestamp("2024-06-10T15:00:00.250").unwrap();
        assert_eq!(ts.second(), 0);
        assert_eq!(ts.nanosecond(), 250_000_000);
    }

    #[test]
    fn test_parse_rfc3339_converts_to_utc() {
        assert_eq!(
            parse_timestamp("2024-01-01T05:30:00+02:00").unwrap(),
            ymd_hms(2024, 1, 1, 3, 30, 0)
        );
    }

    #[test]
    fn test_parse_bare_date_is_midnight() {
        assert_eq!(
            parse_timestamp("2024-02-29").unwrap(),
            ymd_hms(2024, 2, 29, 0, 0, 0)
        );
    }

    #[test]
    fn test_parse_trims_whitespace() {
        assert!(parse_timestamp("  2024-01-01T00:00  ").is_ok());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_timestamp("").is_err());
        assert!(parse_timestamp("yesterday").is_err());
        assert!(parse_timestamp("2024-13-01T00:00").is_err());
        assert!(parse_timestamp("2023-02-29").is_err());
    }

    #[test]
    fn test_error_message_contains_input() {
        let err = parse_timestamp("not a date").unwrap_err();
        assert_eq!(err.to_string(), "Invalid datetime: \"not a date\"");
    }

    #[test]
    fn test_from_unix_seconds() {
        assert_eq!(
            from_unix_seconds(1_704_067_200).unwrap(),
            ymd_hms(2024, 1, 1, 0, 0, 0)
        );
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(
            format_timestamp(&ymd_hms(2024, 1, 1, 3, 0, 0)),
            "2024-01-01 03:00:00"
        );
    }
}
