//! Event storage.
//!
//! The series engine never talks to a database directly. Hosts hand it something
//! implementing `EventStore`; `MemoryStore` and `JsonFileStore` are the two
//! implementations shipped here.

mod json_file;
mod memory;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

use crate::error::CalSeriesResult;
use crate::event::{Event, EventId, StoredEvent};
use crate::interval::{self, Span};

/// Which overlap test a storage query applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlapMode {
    /// `[start, end)` semantics, touching endpoints excluded (conflict checks)
    HalfOpen,
    /// `[start, end]` semantics, touching endpoints included (range reads)
    Closed,
}

impl OverlapMode {
    pub fn matches(&self, a: &Span, b: &Span) -> bool {
        match self {
            OverlapMode::HalfOpen => interval::overlaps(a, b),
            OverlapMode::Closed => interval::touches(a, b),
        }
    }
}

/// Storage collaborator for the series engine.
///
/// All calls are synchronous. `transaction` must make everything done inside the
/// closure visible all at once, or not at all when the closure fails.
pub trait EventStore {
    /// Store a new record, assigning its id and timestamps.
    fn insert(&mut self, event: Event) -> CalSeriesResult<StoredEvent>;

    fn get(&self, id: EventId) -> CalSeriesResult<Option<StoredEvent>>;

    /// Replace an existing record's data. Fails with `NotFound` for unknown ids.
    fn update(&mut self, event: &StoredEvent) -> CalSeriesResult<()>;

    /// Every record whose span overlaps `span` under `mode`, ordered by start.
    fn query_overlapping(&self, span: &Span, mode: OverlapMode) -> CalSeriesResult<Vec<StoredEvent>>;

    /// Delete every record whose `parent_id` is `parent_id`. Returns how many went.
    fn delete_children(&mut self, parent_id: EventId) -> CalSeriesResult<usize>;

    /// Delete a record and its children. Returns how many records went.
    fn delete(&mut self, id: EventId) -> CalSeriesResult<usize>;

    /// Every record, ordered by start.
    fn all(&self) -> CalSeriesResult<Vec<StoredEvent>>;

    /// Run `f` atomically: on error every change it made is rolled back.
    fn transaction<T, F>(&mut self, f: F) -> CalSeriesResult<T>
    where
        F: FnOnce(&mut Self) -> CalSeriesResult<T>;
}
