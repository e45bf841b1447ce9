//! Date parsing and ranges for command arguments.
//!
//! The core only ever sees `DateTime<Utc>`; everything the user types is
//! turned into one here.

use anyhow::{Result, anyhow};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};

/// Accepted date/time layouts without an offset, interpreted as UTC.
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"];

/// Closed date range for range commands.
#[derive(Debug, Clone, PartialEq)]
pub struct DateRange {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl DateRange {
    /// Build a range from optional `--from`/`--to` values.
    /// - dates (YYYY-MM-DD) mean start of day for `from` and end of day for `to`
    /// - a missing `from` is the start of today
    /// - a missing `to` is `default_days` after `from`
    pub fn from_args(from: Option<&str>, to: Option<&str>, default_days: i64) -> Result<Self> {
        let from_dt = match from {
            Some(s) => parse_bound(s, NaiveTime::default())?,
            None => start_of_day(Utc::now().date_naive()),
        };

        let to_dt = match to {
            Some(s) => parse_bound(s, end_of_day_time())?,
            None => Duration::try_days(default_days)
                .and_then(|span| from_dt.checked_add_signed(span))
                .ok_or_else(|| anyhow!("default_range_days = {} is out of range", default_days))?,
        };

        if to_dt < from_dt {
            return Err(anyhow!("Range end {} is before range start {}", to_dt, from_dt));
        }

        Ok(DateRange {
            from: from_dt,
            to: to_dt,
        })
    }
}

/// Parse a date/time: RFC 3339, a naive date/time (UTC), or a bare date (midnight UTC).
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>> {
    parse_bound(s, NaiveTime::default())
}

/// Like `parse_datetime`, but a bare date means the last second of that day.
pub fn parse_end_of_day(s: &str) -> Result<DateTime<Utc>> {
    parse_bound(s, end_of_day_time())
}

/// Parse a duration like "45m" or "1h 30m".
pub fn parse_duration(s: &str) -> Result<Duration> {
    let std_duration =
        humantime::parse_duration(s.trim()).map_err(|e| anyhow!("Invalid duration '{}': {}", s, e))?;
    Duration::from_std(std_duration).map_err(|e| anyhow!("Duration '{}' is too long: {}", s, e))
}

fn parse_bound(s: &str, date_only_time: NaiveTime) -> Result<DateTime<Utc>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(dt.and_utc());
        }
    }

    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| {
        anyhow!(
            "Invalid date '{}'. Expected YYYY-MM-DD, YYYY-MM-DDTHH:MM or RFC 3339",
            s
        )
    })?;
    Ok(date.and_time(date_only_time).and_utc())
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::default()).and_utc()
}

fn end_of_day_time() -> NaiveTime {
    NaiveTime::from_hms_opt(23, 59, 59).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_rfc3339_with_offset() {
        let dt = parse_datetime("2025-03-20T15:00:00+02:00").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2025, 3, 20, 13, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_naive_datetime_as_utc() {
        let dt = parse_datetime("2025-03-20T15:00").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2025, 3, 20, 15, 0, 0).unwrap());

        let dt = parse_datetime("2025-03-20 15:30:10").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2025, 3, 20, 15, 30, 10).unwrap());
    }

    #[test]
    fn test_parse_bare_date_is_midnight() {
        let dt = parse_datetime("2025-03-20").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2025, 3, 20, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_end_of_day_keeps_explicit_times() {
        let dt = parse_end_of_day("2025-06-30").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2025, 6, 30, 23, 59, 59).unwrap());

        let dt = parse_end_of_day("2025-06-30T09:00").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2025, 6, 30, 9, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_invalid_input() {
        assert!(parse_datetime("next tuesday").is_err());
        assert!(parse_datetime("2025-13-01").is_err());
    }

    #[test]
    fn test_range_dates_cover_whole_days() {
        let range = DateRange::from_args(Some("2025-03-01"), Some("2025-03-31"), 30).unwrap();
        assert_eq!(range.from, Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap());
        assert_eq!(range.to, Utc.with_ymd_and_hms(2025, 3, 31, 23, 59, 59).unwrap());
    }

    #[test]
    fn test_range_defaults_to_days_after_from() {
        let range = DateRange::from_args(Some("2025-03-01"), None, 7).unwrap();
        assert_eq!(range.to, Utc.with_ymd_and_hms(2025, 3, 8, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_range_rejects_oversized_default() {
        assert!(DateRange::from_args(Some("2025-03-01"), None, i64::MAX / 1000).is_err());
        assert!(DateRange::from_args(Some("2025-03-01"), None, 400_000_000).is_err());
    }

    #[test]
    fn test_range_rejects_inverted_bounds() {
        assert!(DateRange::from_args(Some("2025-03-02"), Some("2025-03-01"), 7).is_err());
    }

    #[test]
    fn test_parse_duration_values() {
        assert_eq!(parse_duration("45m").unwrap(), Duration::minutes(45));
        assert_eq!(parse_duration("1h 30m").unwrap(), Duration::minutes(90));
        assert!(parse_duration("soon").is_err());
    }
}
