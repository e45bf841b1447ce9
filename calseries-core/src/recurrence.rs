//! RRULE expansion for recurring series.
//!
//! Turns a frequency, interval and inclusive end bound into the concrete start
//! instants of a series. Calendar arithmetic is delegated to the rrule crate, so
//! months and years follow RFC 5545: a date that does not exist in the target
//! month (Jan 31 + 1 month, Feb 29 + 1 year) is skipped rather than clamped.

use chrono::{DateTime, SubsecRound, Utc};
use rrule::RRuleSet;
use tracing::{debug, warn};

use crate::error::{CalSeriesError, CalSeriesResult};
use crate::event::Frequency;

/// Upper bound on instants produced by one expansion.
const EXPANSION_LIMIT: u16 = u16::MAX;

pub(crate) fn rrule_freq(frequency: Frequency) -> Option<&'static str> {
    match frequency {
        Frequency::None => None,
        Frequency::Daily => Some("DAILY"),
        Frequency::Weekly => Some("WEEKLY"),
        Frequency::Monthly => Some("MONTHLY"),
        Frequency::Yearly => Some("YEARLY"),
    }
}

/// Build an iCalendar-format rule for the rrule crate parser.
fn build_rrule_string(freq: &str, interval: u16, start: DateTime<Utc>, until: DateTime<Utc>) -> String {
    [
        format!("DTSTART:{}", start.format("%Y%m%dT%H%M%SZ")),
        format!(
            "RRULE:FREQ={};INTERVAL={};UNTIL={}",
            freq,
            interval,
            until.format("%Y%m%dT%H%M%SZ")
        ),
    ]
    .join("\n")
}

/// Expand a rule into its start instants.
///
/// The result always begins with `start`, is strictly increasing and never goes
/// past `until`. `Frequency::None`, or an `until` earlier than `start`, yields just
/// `[start]`.
pub fn expand(
    frequency: Frequency,
    interval: u16,
    start: DateTime<Utc>,
    until: DateTime<Utc>,
) -> CalSeriesResult<Vec<DateTime<Utc>>> {
    let Some(freq) = rrule_freq(frequency) else {
        return Ok(vec![start]);
    };
    if until < start {
        return Ok(vec![start]);
    }

    // rrule works at whole seconds; the remainder is put back on every instant
    let whole_start = start.trunc_subsecs(0);
    let subsec = start - whole_start;

    let rrule_str = build_rrule_string(freq, interval.max(1), whole_start, until);
    let rrule_set: RRuleSet = rrule_str.parse().map_err(|e| {
        CalSeriesError::Recurrence(format!(
            "Failed to parse rule '{}': {}",
            rrule_str.replace('\n', " "),
            e
        ))
    })?;

    let result = rrule_set.all(EXPANSION_LIMIT);
    if result.limited {
        warn!(
            frequency = %frequency,
            interval,
            %start,
            %until,
            "Recurrence expansion hit its limit of {} instants",
            EXPANSION_LIMIT
        );
    }

    let dates: Vec<DateTime<Utc>> = result
        .dates
        .iter()
        .map(|dt| dt.with_timezone(&Utc) + subsec)
        .filter(|dt| *dt <= until)
        .collect();

    debug!(frequency = %frequency, interval, count = dates.len(), "Expanded recurrence");

    Ok(dates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn d(y: i32, m: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, day, 10, 0, 0).unwrap()
    }

    #[test]
    fn test_daily_includes_bound() {
        let start = d(2024, 1, 1);
        let dates = expand(Frequency::Daily, 1, start, start + Duration::days(3)).unwrap();
        assert_eq!(
            dates,
            vec![
                start,
                start + Duration::days(1),
                start + Duration::days(2),
                start + Duration::days(3),
            ]
        );
    }

    #[test]
    fn test_biweekly_stops_before_bound() {
        let start = d(2024, 1, 1);
        let dates = expand(Frequency::Weekly, 2, start, start + Duration::days(20)).unwrap();
        assert_eq!(dates, vec![start, start + Duration::days(14)]);
    }

    #[test]
    fn test_monthly_interval() {
        let dates = expand(Frequency::Monthly, 3, d(2024, 1, 15), d(2024, 12, 31)).unwrap();
        assert_eq!(
            dates,
            vec![d(2024, 1, 15), d(2024, 4, 15), d(2024, 7, 15), d(2024, 10, 15)]
        );
    }

    #[test]
    fn test_monthly_skips_months_without_the_day() {
        let dates = expand(Frequency::Monthly, 1, d(2024, 1, 31), d(2024, 6, 30)).unwrap();
        assert_eq!(dates, vec![d(2024, 1, 31), d(2024, 3, 31), d(2024, 5, 31)]);
    }

    #[test]
    fn test_yearly_leap_day_only_in_leap_years() {
        let dates = expand(Frequency::Yearly, 1, d(2024, 2, 29), d(2032, 3, 1)).unwrap();
        assert_eq!(dates, vec![d(2024, 2, 29), d(2028, 2, 29), d(2032, 2, 29)]);
    }

    #[test]
    fn test_none_frequency_yields_start() {
        let start = d(2024, 1, 1);
        let dates = expand(Frequency::None, 1, start, d(2025, 1, 1)).unwrap();
        assert_eq!(dates, vec![start]);
    }

    #[test]
    fn test_until_before_start_yields_start() {
        let start = d(2024, 1, 10);
        let dates = expand(Frequency::Daily, 1, start, d(2024, 1, 1)).unwrap();
        assert_eq!(dates, vec![start]);
    }

    #[test]
    fn test_expansion_is_repeatable() {
        let start = d(2024, 1, 1);
        let until = d(2024, 3, 1);
        let first = expand(Frequency::Weekly, 1, start, until).unwrap();
        let second = expand(Frequency::Weekly, 1, start, until).unwrap();
        assert_eq!(first, second);
        assert!(first.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_subsecond_start_is_preserved() {
        let start = d(2024, 1, 1) + Duration::milliseconds(250);
        let dates = expand(Frequency::Daily, 1, start, start + Duration::days(1)).unwrap();
        assert_eq!(dates, vec![start, start + Duration::days(1)]);
    }
}
