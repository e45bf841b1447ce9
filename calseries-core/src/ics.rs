//! ICS export.
//!
//! Renders occurrences as an RFC 5545 calendar. Each series becomes one master
//! VEVENT whose RRULE reproduces the exported dates. Instances that differ from
//! the master follow as RECURRENCE-ID overrides, dates missing from the export
//! become EXDATEs, and instances moved off the rule are exported on their own.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use icalendar::{Calendar, Component, EventLike};

use crate::error::CalSeriesResult;
use crate::event::{Event, EventId};
use crate::materialize::Occurrence;
use crate::recurrence;

const PRODID: &str = "PRODID:CALSERIES";

fn format_utc(dt: &DateTime<Utc>) -> String {
    dt.format("%Y%m%dT%H%M%SZ").to_string()
}

fn uid(id: EventId) -> String {
    format!("{}@calseries", id)
}

/// Generate .ics content for a list of occurrences
pub fn generate_ics(occurrences: &[Occurrence]) -> CalSeriesResult<String> {
    let mut cal = Calendar::new();
    let mut series: BTreeMap<EventId, Vec<&Occurrence>> = BTreeMap::new();

    for occurrence in occurrences {
        match occurrence.event.parent_id {
            Some(root_id) => series.entry(root_id).or_default().push(occurrence),
            None => {
                cal.push(vevent(&uid(occurrence.id), &occurrence.event).done());
            }
        }
    }

    for (root_id, mut instances) in series {
        instances.sort_by_key(|o| o.start());
        push_series(&mut cal, root_id, &instances)?;
    }

    Ok(strip_ics_bloat(&cal.done().to_string()))
}

fn vevent(uid: &str, event: &Event) -> icalendar::Event {
    let mut ics_event = icalendar::Event::new();
    ics_event.uid(uid);
    ics_event.summary(&event.title);
    ics_event.add_property("DTSTAMP", format_utc(&Utc::now()));
    ics_event.add_property("DTSTART", format_utc(&event.start));
    ics_event.add_property("DTEND", format_utc(&event.end));

    if let Some(ref desc) = event.description {
        ics_event.description(desc);
    }

    if let Some(ref loc) = event.location {
        ics_event.location(loc);
    }

    ics_event.add_property("X-CALSERIES-COLOR", event.color.as_str());
    ics_event
}

/// One master VEVENT for the series, then whatever the rule cannot express.
/// `instances` must be sorted by start.
fn push_series(cal: &mut Calendar, root_id: EventId, instances: &[&Occurrence]) -> CalSeriesResult<()> {
    let Some((master, rest)) = instances.split_first() else {
        return Ok(());
    };

    let series_uid = uid(root_id);
    let mut master_event = vevent(&series_uid, &master.event);
    let frequency = master.event.recurrence_frequency;
    let interval = master.event.recurrence_interval;

    let expected = match (recurrence::rrule_freq(frequency), rest.last()) {
        (Some(freq), Some(last)) => {
            master_event.add_property(
                "RRULE",
                format!(
                    "FREQ={};INTERVAL={};UNTIL={}",
                    freq,
                    interval,
                    format_utc(&last.start())
                ),
            );
            recurrence::expand(frequency, interval, master.start(), last.start())?
        }
        _ => vec![master.start()],
    };

    let exported: HashSet<DateTime<Utc>> = instances.iter().map(|o| o.start()).collect();
    for date in expected.iter().filter(|date| !exported.contains(*date)) {
        master_event.add_multi_property("EXDATE", &format_utc(date));
    }
    cal.push(master_event.done());

    let expected: HashSet<DateTime<Utc>> = expected.into_iter().collect();
    for instance in rest {
        if !expected.contains(&instance.start()) {
            cal.push(vevent(&uid(instance.id), &instance.event).done());
        } else if !same_details(&master.event, &instance.event) {
            let mut override_event = vevent(&series_uid, &instance.event);
            override_event.add_property("RECURRENCE-ID", format_utc(&instance.start()));
            cal.push(override_event.done());
        }
    }

    Ok(())
}

/// Whether an instance is fully described by the master's RRULE.
fn same_details(master: &Event, instance: &Event) -> bool {
    master.title == instance.title
        && master.description == instance.description
        && master.location == instance.location
        && master.color == instance.color
        && master.duration() == instance.duration()
}

/// Clean up ICS output from the icalendar crate
/// - Replace PRODID with our own
/// - Remove CALSCALE:GREGORIAN (it's the default)
fn strip_ics_bloat(ics: &str) -> String {
    let mut result = String::with_capacity(ics.len());

    for line in ics.lines() {
        if line.starts_with("PRODID:") {
            result.push_str(PRODID);
            result.push_str("\r\n");
            continue;
        }

        if line == "CALSCALE:GREGORIAN" {
            continue;
        }

        result.push_str(line);
        result.push_str("\r\n");
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Frequency, StoredEvent};
    use crate::interval::Span;
    use crate::materialize::{persisted_occurrences, virtual_occurrences};
    use chrono::{Duration, TimeZone};

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, hour, 0, 0).unwrap()
    }

    fn stored(event: Event) -> StoredEvent {
        StoredEvent {
            id: EventId::new(),
            event,
            created_at: at(1, 0),
            updated_at: at(1, 0),
        }
    }

    fn standup() -> StoredEvent {
        stored(Event::new("Standup", at(1, 10), at(1, 11)).recurring(Frequency::Daily, 1, at(4, 10)))
    }

    /// Stored children of `root`, as a range read over persisted records sees them.
    fn persisted(root: &StoredEvent) -> Vec<Occurrence> {
        persisted_occurrences(root)
            .unwrap()
            .into_iter()
            .map(|child| Occurrence::from_stored(&stored(child)))
            .collect()
    }

    #[test]
    fn test_single_event() {
        let mut event = Event::new("Dentist", at(5, 9), at(5, 10));
        event.location = Some("Main St".to_string());
        let single = stored(event);

        let ics = generate_ics(&[Occurrence::from_stored(&single)]).unwrap();

        assert!(ics.starts_with("BEGIN:VCALENDAR"));
        assert!(ics.contains("PRODID:CALSERIES"));
        assert!(!ics.contains("CALSCALE"));
        assert!(ics.contains(&format!("UID:{}@calseries", single.id)));
        assert!(ics.contains("SUMMARY:Dentist"));
        assert!(ics.contains("DTSTART:20240105T090000Z"));
        assert!(ics.contains("DTEND:20240105T100000Z"));
        assert!(ics.contains("LOCATION:Main St"));
        assert!(!ics.contains("RECURRENCE-ID"));
        assert!(!ics.contains("RRULE"));
    }

    #[test]
    fn test_series_is_one_master_with_rrule() {
        let root = standup();
        let occurrences = virtual_occurrences(&root, &Span::new(at(1, 0), at(31, 0))).unwrap();
        assert_eq!(occurrences.len(), 4);

        let ics = generate_ics(&occurrences).unwrap();

        assert_eq!(ics.matches("BEGIN:VEVENT").count(), 1);
        assert!(ics.contains(&format!("UID:{}@calseries", root.id)));
        assert!(ics.contains("DTSTART:20240101T100000Z"));
        assert!(ics.contains("RRULE:FREQ=DAILY;INTERVAL=1;UNTIL=20240104T100000Z"));
        assert!(!ics.contains("RECURRENCE-ID"));
        assert!(!ics.contains("EXDATE"));
    }

    #[test]
    fn test_series_master_starts_at_first_exported_date() {
        let root = standup();
        let occurrences = virtual_occurrences(&root, &Span::new(at(2, 0), at(3, 23))).unwrap();

        let ics = generate_ics(&occurrences).unwrap();

        assert_eq!(ics.matches("BEGIN:VEVENT").count(), 1);
        assert!(ics.contains("DTSTART:20240102T100000Z"));
        assert!(ics.contains("UNTIL=20240103T100000Z"));
    }

    #[test]
    fn test_lone_instance_has_no_rule() {
        let root = standup();
        let occurrences = virtual_occurrences(&root, &Span::new(at(3, 0), at(3, 23))).unwrap();

        let ics = generate_ics(&occurrences).unwrap();

        assert_eq!(ics.matches("BEGIN:VEVENT").count(), 1);
        assert!(ics.contains("DTSTART:20240103T100000Z"));
        assert!(!ics.contains("RRULE"));
        assert!(!ics.contains("RECURRENCE-ID"));
    }

    #[test]
    fn test_edited_instance_becomes_override() {
        let root = standup();
        let mut occurrences = persisted(&root);
        occurrences[1].event.title = "Standup (room 4)".to_string();

        let ics = generate_ics(&occurrences).unwrap();

        assert_eq!(ics.matches("BEGIN:VEVENT").count(), 2);
        assert_eq!(ics.matches(&format!("UID:{}@calseries", root.id)).count(), 2);
        assert!(ics.contains("RRULE:FREQ=DAILY;INTERVAL=1;UNTIL=20240104T100000Z"));
        assert_eq!(ics.matches("RECURRENCE-ID").count(), 1);
        assert!(ics.contains("RECURRENCE-ID:20240103T100000Z"));
        assert!(ics.contains("SUMMARY:Standup (room 4)"));
    }

    #[test]
    fn test_missing_instance_is_excluded() {
        let root = standup();
        let mut occurrences = persisted(&root);
        occurrences.remove(1);

        let ics = generate_ics(&occurrences).unwrap();

        assert_eq!(ics.matches("BEGIN:VEVENT").count(), 1);
        assert!(ics.contains("EXDATE:20240103T100000Z"));
        assert!(!ics.contains("RECURRENCE-ID"));
    }

    #[test]
    fn test_moved_instance_is_standalone() {
        let root = standup();
        let mut occurrences = persisted(&root);
        let moved = &mut occurrences[1];
        moved.event.start += Duration::hours(2);
        moved.event.end += Duration::hours(2);
        let moved_id = moved.id;

        let ics = generate_ics(&occurrences).unwrap();

        assert_eq!(ics.matches("BEGIN:VEVENT").count(), 2);
        assert!(ics.contains(&format!("UID:{}@calseries", moved_id)));
        assert!(ics.contains("DTSTART:20240103T120000Z"));
        assert!(ics.contains("EXDATE:20240103T100000Z"));
        assert!(!ics.contains("RECURRENCE-ID"));
    }
}
