//! Series reconciliation.
//!
//! `SeriesService` is the entry point hosts call: it validates input, keeps
//! persisted occurrences in step with their root, and answers range and
//! overlap queries.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{CalSeriesError, CalSeriesResult};
use crate::event::{Event, EventChanges, EventId, StoredEvent};
use crate::interval::Span;
use crate::materialize::{self, Occurrence};
use crate::store::{EventStore, OverlapMode};

/// A stored event that collides with a proposed time slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conflict {
    pub id: EventId,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Result of `SeriesService::check_overlap`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlapReport {
    pub has_overlap: bool,
    pub conflicts: Vec<Conflict>,
}

pub struct SeriesService<S: EventStore> {
    store: S,
}

impl<S: EventStore> SeriesService<S> {
    pub fn new(store: S) -> Self {
        SeriesService { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Store a new event. Recurring roots get their occurrences generated in the
    /// same transaction.
    pub fn create_series(&mut self, event: Event) -> CalSeriesResult<StoredEvent> {
        if event.parent_id.is_some() {
            return Err(CalSeriesError::validation(
                "parent_id",
                "is assigned when occurrences are generated and cannot be set",
            ));
        }
        event.validate()?;

        let (root, generated) = self.store.transaction(|store| {
            let root = store.insert(event)?;
            let generated = materialize::persist(store, &root)?;
            Ok((root, generated))
        })?;

        info!(id = %root.id, title = %root.event.title, generated, "Created event");
        Ok(root)
    }

    /// Apply `changes` to an existing event.
    ///
    /// For a root, every persisted occurrence is deleted and (if it still recurs)
    /// regenerated from the new parameters. Ids of previous occurrences are gone
    /// afterwards. The delete and the rebuild commit together or not at all.
    pub fn update_series(&mut self, id: EventId, changes: EventChanges) -> CalSeriesResult<StoredEvent> {
        let mut updated = self.get_event(id)?;
        changes.apply_to(&mut updated.event);
        updated.event.validate()?;

        let (updated, rebuilt) = self.store.transaction(|store| {
            store.update(&updated)?;
            let updated = store.get(id)?.ok_or(CalSeriesError::NotFound(id))?;

            if updated.event.parent_id.is_some() {
                return Ok((updated, None));
            }

            let removed = store.delete_children(id)?;
            let generated = materialize::persist(store, &updated).map_err(|e| {
                CalSeriesError::Inconsistency(format!(
                    "removed {} occurrences of {} but could not regenerate them: {}",
                    removed, id, e
                ))
            })?;

            Ok((updated, Some((removed, generated))))
        })?;

        match rebuilt {
            Some((removed, generated)) if removed > 0 || generated > 0 => {
                info!(%id, removed, generated, "Regenerated series")
            }
            _ => debug!(%id, "Updated event"),
        }

        Ok(updated)
    }

    /// Everything happening in `[start, end]`, recurring series expanded,
    /// ordered by start.
    ///
    /// Persisted occurrences are never returned directly; their root is expanded
    /// instead, so a series whose first instance lies before the window still
    /// shows up. Every root is expanded at most once.
    pub fn query_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> CalSeriesResult<Vec<Occurrence>> {
        if end < start {
            return Err(CalSeriesError::validation(
                "end",
                "range end must not be before range start",
            ));
        }

        let window = Span::new(start, end);
        let records = self.store.query_overlapping(&window, OverlapMode::Closed)?;

        let mut expanded: HashSet<EventId> = HashSet::new();
        let mut occurrences = Vec::new();

        for record in records {
            match record.event.parent_id {
                None if record.event.is_recurring => {
                    if expanded.insert(record.id) {
                        occurrences.extend(materialize::virtual_occurrences(&record, &window)?);
                    }
                }
                None => occurrences.push(Occurrence::from_stored(&record)),
                Some(parent_id) => {
                    if expanded.contains(&parent_id) {
                        continue;
                    }
                    match self.store.get(parent_id)? {
                        Some(root) if root.event.is_series_root() => {
                            expanded.insert(root.id);
                            occurrences.extend(materialize::virtual_occurrences(&root, &window)?);
                        }
                        Some(_) => {}
                        None => warn!(id = %record.id, %parent_id, "Occurrence has no root"),
                    }
                }
            }
        }

        occurrences.sort_by(|a, b| {
            a.start()
                .cmp(&b.start())
                .then_with(|| a.end().cmp(&b.end()))
                .then_with(|| a.id.cmp(&b.id))
        });

        debug!(%start, %end, count = occurrences.len(), "Queried range");
        Ok(occurrences)
    }

    /// Stored events that would collide with `[start, end)`.
    ///
    /// Only persisted records are compared. Since roots materialize every
    /// occurrence up to their bound on write, that covers every recurring date.
    pub fn check_overlap(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude_id: Option<EventId>,
    ) -> CalSeriesResult<OverlapReport> {
        if end <= start {
            return Err(CalSeriesError::validation(
                "end",
                "end time must be after start time",
            ));
        }

        let conflicts: Vec<Conflict> = self
            .store
            .query_overlapping(&Span::new(start, end), OverlapMode::HalfOpen)?
            .into_iter()
            .filter(|e| Some(e.id) != exclude_id)
            .map(|e| Conflict {
                id: e.id,
                title: e.event.title,
                start: e.event.start,
                end: e.event.end,
            })
            .collect();

        Ok(OverlapReport {
            has_overlap: !conflicts.is_empty(),
            conflicts,
        })
    }

    pub fn get_event(&self, id: EventId) -> CalSeriesResult<StoredEvent> {
        self.store.get(id)?.ok_or(CalSeriesError::NotFound(id))
    }

    /// Every stored record, persisted occurrences included, ordered by start.
    pub fn list_events(&self) -> CalSeriesResult<Vec<StoredEvent>> {
        self.store.all()
    }

    /// Delete an event. Deleting a root takes its occurrences with it.
    pub fn delete_event(&mut self, id: EventId) -> CalSeriesResult<usize> {
        self.get_event(id)?;
        let removed = self.store.transaction(|store| store.delete(id))?;

        info!(%id, removed, "Deleted event");
        Ok(removed)
    }
}
