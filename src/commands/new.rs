use anyhow::{Result, anyhow, bail};
use calseries_core::store::JsonFileStore;
use calseries_core::{Color, Event, Frequency, SeriesService};
use chrono::Duration;
use owo_colors::OwoColorize;

use super::Repeat;
use crate::RepeatArgs;
use crate::date_range::{parse_datetime, parse_duration};

pub struct NewArgs {
    pub title: String,
    pub start: String,
    pub end: Option<String>,
    pub duration: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub color: Option<String>,
    pub repeat: RepeatArgs,
}

pub fn run(service: &mut SeriesService<JsonFileStore>, args: NewArgs) -> Result<()> {
    let event = build_event(args)?;
    let stored = service.create_series(event)?;

    println!("{}", format!("  Created: {}", stored.event).green());
    println!("  {}", stored.id.to_string().dimmed());

    if stored.event.is_recurring {
        let occurrences = service
            .list_events()?
            .iter()
            .filter(|e| e.event.parent_id == Some(stored.id))
            .count();
        println!(
            "  Repeats {} until {} ({} more {})",
            stored.event.recurrence_frequency,
            stored
                .event
                .recurrence_end
                .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default(),
            occurrences,
            if occurrences == 1 { "occurrence" } else { "occurrences" }
        );
    }

    Ok(())
}

fn build_event(args: NewArgs) -> Result<Event> {
    let start = parse_datetime(&args.start)?;

    // --end, --duration, or one hour
    let end = if let Some(end) = args.end {
        parse_datetime(&end)?
    } else if let Some(duration) = args.duration {
        start
            .checked_add_signed(parse_duration(&duration)?)
            .ok_or_else(|| anyhow!("Duration '{}' ends past the supported date range", duration))?
    } else {
        start + Duration::hours(1)
    };

    let mut event = Event::new(args.title, start, end);
    event.description = args.description;
    event.location = args.location;

    if let Some(color) = args.color {
        event.color = Color::parse(&color)?;
    }

    let repeat = Repeat::parse(&args.repeat)?;
    if repeat.is_dangling() {
        bail!("--every and --until need --repeat daily|weekly|monthly|yearly");
    }

    if let Some(frequency) = repeat.frequency.filter(|f| *f != Frequency::None) {
        event.is_recurring = true;
        event.recurrence_frequency = frequency;
        event.recurrence_interval = repeat.interval.unwrap_or(1);
        event.recurrence_end = repeat.until;
    }

    Ok(event)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn args(start: &str) -> NewArgs {
        NewArgs {
            title: "Standup".to_string(),
            start: start.to_string(),
            end: None,
            duration: None,
            description: None,
            location: None,
            color: None,
            repeat: RepeatArgs {
                repeat: None,
                every: None,
                until: None,
            },
        }
    }

    #[test]
    fn test_default_end_is_one_hour_later() {
        let event = build_event(args("2025-03-20T09:00")).unwrap();
        assert_eq!(event.start, Utc.with_ymd_and_hms(2025, 3, 20, 9, 0, 0).unwrap());
        assert_eq!(event.end, Utc.with_ymd_and_hms(2025, 3, 20, 10, 0, 0).unwrap());
        assert!(!event.is_recurring);
    }

    #[test]
    fn test_duration_sets_end() {
        let mut a = args("2025-03-20T09:00");
        a.duration = Some("15m".to_string());
        let event = build_event(a).unwrap();
        assert_eq!(event.duration_minutes(), 15);
    }

    #[test]
    fn test_huge_duration_is_an_error() {
        let mut a = args("2025-03-20T09:00");
        a.duration = Some("280000years".to_string());
        assert!(build_event(a).is_err());
    }

    #[test]
    fn test_repeat_makes_a_series_root() {
        let mut a = args("2025-03-20T09:00");
        a.repeat.repeat = Some("weekly".to_string());
        a.repeat.every = Some(2);
        a.repeat.until = Some("2025-06-30".to_string());
        let event = build_event(a).unwrap();

        assert!(event.is_series_root());
        assert_eq!(event.recurrence_frequency, Frequency::Weekly);
        assert_eq!(event.recurrence_interval, 2);
        assert!(event.validate().is_ok());
    }

    #[test]
    fn test_repeat_without_until_fails_validation() {
        let mut a = args("2025-03-20T09:00");
        a.repeat.repeat = Some("daily".to_string());
        let event = build_event(a).unwrap();
        assert!(event.validate().is_err());
    }

    #[test]
    fn test_until_without_repeat_is_rejected() {
        let mut a = args("2025-03-20T09:00");
        a.repeat.until = Some("2025-06-30".to_string());
        assert!(build_event(a).is_err());
    }

    #[test]
    fn test_bad_color_is_rejected() {
        let mut a = args("2025-03-20T09:00");
        a.color = Some("blue".to_string());
        assert!(build_event(a).is_err());
    }
}
