//! In-memory event store.

use std::collections::HashMap;

use chrono::Utc;

use crate::error::{CalSeriesError, CalSeriesResult};
use crate::event::{Event, EventId, StoredEvent};
use crate::interval::Span;
use crate::store::{EventStore, OverlapMode};

/// Keeps every record in a map. Transactions snapshot the map and restore it on
/// failure.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: HashMap<EventId, StoredEvent>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_events(events: Vec<StoredEvent>) -> Self {
        MemoryStore {
            records: events.into_iter().map(|e| (e.id, e)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records ordered by start, then id, so output is stable between runs.
    pub fn sorted(&self) -> Vec<StoredEvent> {
        sorted(self.records.values().cloned().collect())
    }
}

fn sorted(mut events: Vec<StoredEvent>) -> Vec<StoredEvent> {
    events.sort_by(|a, b| {
        a.event
            .start
            .cmp(&b.event.start)
            .then_with(|| a.id.cmp(&b.id))
    });
    events
}

impl EventStore for MemoryStore {
    fn insert(&mut self, event: Event) -> CalSeriesResult<StoredEvent> {
        let now = Utc::now();
        let stored = StoredEvent {
            id: EventId::new(),
            event,
            created_at: now,
            updated_at: now,
        };
        self.records.insert(stored.id, stored.clone());
        Ok(stored)
    }

    fn get(&self, id: EventId) -> CalSeriesResult<Option<StoredEvent>> {
        Ok(self.records.get(&id).cloned())
    }

    fn update(&mut self, event: &StoredEvent) -> CalSeriesResult<()> {
        let existing = self
            .records
            .get_mut(&event.id)
            .ok_or(CalSeriesError::NotFound(event.id))?;

        existing.event = event.event.clone();
        existing.updated_at = Utc::now();
        Ok(())
    }

    fn query_overlapping(&self, span: &Span, mode: OverlapMode) -> CalSeriesResult<Vec<StoredEvent>> {
        let matching = self
            .records
            .values()
            .filter(|e| mode.matches(&e.span(), span))
            .cloned()
            .collect();
        Ok(sorted(matching))
    }

    fn delete_children(&mut self, parent_id: EventId) -> CalSeriesResult<usize> {
        let before = self.records.len();
        self.records
            .retain(|_, e| e.event.parent_id != Some(parent_id));
        Ok(before - self.records.len())
    }

    fn delete(&mut self, id: EventId) -> CalSeriesResult<usize> {
        if self.records.remove(&id).is_none() {
            return Ok(0);
        }
        Ok(1 + self.delete_children(id)?)
    }

    fn all(&self) -> CalSeriesResult<Vec<StoredEvent>> {
        Ok(self.sorted())
    }

    fn transaction<T, F>(&mut self, f: F) -> CalSeriesResult<T>
    where
        F: FnOnce(&mut Self) -> CalSeriesResult<T>,
    {
        let snapshot = self.records.clone();
        let result = f(self);
        if result.is_err() {
            self.records = snapshot;
        }
        result
    }
}
