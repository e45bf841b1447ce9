//! Occurrence materialization.
//!
//! A recurring root turns into concrete instances in one of two ways:
//! - persist mode: one stored child per generated date after the root's own,
//!   written when the series is created or rebuilt;
//! - view mode: in-memory occurrences for a read window, never stored, all
//!   carrying the root's id so clients can correlate them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CalSeriesResult;
use crate::event::{Event, EventId, StoredEvent};
use crate::interval::{self, Span};
use crate::recurrence;
use crate::store::EventStore;

/// Where an occurrence came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OccurrenceKind {
    /// A stored, non-recurring event
    Single,
    /// A stored child generated from a series root
    Persisted,
    /// Computed for a read; `id` is the root's
    Virtual,
}

/// A concrete, time-bounded instance of an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Occurrence {
    pub id: EventId,
    pub kind: OccurrenceKind,
    #[serde(flatten)]
    pub event: Event,
}

impl Occurrence {
    /// View a stored record as an occurrence of itself.
    pub fn from_stored(stored: &StoredEvent) -> Self {
        let kind = if stored.event.parent_id.is_some() {
            OccurrenceKind::Persisted
        } else {
            OccurrenceKind::Single
        };

        Occurrence {
            id: stored.id,
            kind,
            event: stored.event.clone(),
        }
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.event.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.event.end
    }

    pub fn span(&self) -> Span {
        self.event.span()
    }

    pub fn duration_minutes(&self) -> i64 {
        self.event.duration_minutes()
    }

    pub fn is_virtual(&self) -> bool {
        self.kind == OccurrenceKind::Virtual
    }
}

/// The children persist mode would store for `root`, in date order.
///
/// The root's own date is not included: the root record already represents it.
/// Records that are not series roots produce nothing.
pub fn persisted_occurrences(root: &StoredEvent) -> CalSeriesResult<Vec<Event>> {
    if !root.event.is_series_root() {
        return Ok(Vec::new());
    }
    let Some(until) = root.event.recurrence_end else {
        return Ok(Vec::new());
    };

    let duration = root.event.duration();
    let dates = recurrence::expand(
        root.event.recurrence_frequency,
        root.event.recurrence_interval,
        root.event.start,
        until,
    )?;

    let children = dates
        .into_iter()
        .skip(1)
        .map(|start| Event {
            start,
            end: start + duration,
            parent_id: Some(root.id),
            ..root.event.clone()
        })
        .collect();

    Ok(children)
}

/// Store every child of `root`. Additive: callers clear old children first.
pub fn persist<S: EventStore>(store: &mut S, root: &StoredEvent) -> CalSeriesResult<usize> {
    let children = persisted_occurrences(root)?;
    let count = children.len();

    for child in children {
        store.insert(child)?;
    }

    debug!(root = %root.id, count, "Persisted occurrences");
    Ok(count)
}

/// Occurrences of `root` starting inside `window` (both ends inclusive).
///
/// Non-roots come back as themselves when they touch the window.
pub fn virtual_occurrences(root: &StoredEvent, window: &Span) -> CalSeriesResult<Vec<Occurrence>> {
    if !root.event.is_series_root() {
        if interval::touches(&root.span(), window) {
            return Ok(vec![Occurrence::from_stored(root)]);
        }
        return Ok(Vec::new());
    }

    let until = match root.event.recurrence_end {
        Some(bound) => bound.min(window.end),
        None => window.end,
    };

    let duration = root.event.duration();
    let dates = recurrence::expand(
        root.event.recurrence_frequency,
        root.event.recurrence_interval,
        root.event.start,
        until,
    )?;

    let occurrences = dates
        .into_iter()
        .filter(|date| window.contains(*date))
        .map(|start| Occurrence {
            id: root.id,
            kind: OccurrenceKind::Virtual,
            event: Event {
                start,
                end: start + duration,
                parent_id: Some(root.id),
                ..root.event.clone()
            },
        })
        .collect();

    Ok(occurrences)
}
