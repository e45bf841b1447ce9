//! Event store persisted as a single JSON file.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{CalSeriesError, CalSeriesResult};
use crate::event::{Event, EventId, StoredEvent};
use crate::interval::Span;
use crate::store::{EventStore, MemoryStore, OverlapMode};

/// A `MemoryStore` that is written back to disk after every committed change.
///
/// Only the outermost transaction snapshots and saves. Inside it, nothing is
/// written until the closure succeeds, so a failed transaction leaves both
/// memory and the file untouched.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    inner: MemoryStore,
    depth: usize,
}

impl JsonFileStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> CalSeriesResult<Self> {
        let path = path.into();

        let inner = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            let events: Vec<StoredEvent> = serde_json::from_str(&content).map_err(|e| {
                CalSeriesError::Serialization(format!("Failed to read {}: {}", path.display(), e))
            })?;
            MemoryStore::from_events(events)
        } else {
            MemoryStore::new()
        };

        debug!(path = %path.display(), records = inner.len(), "Opened event store");

        Ok(JsonFileStore {
            path,
            inner,
            depth: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> CalSeriesResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(&self.inner.sorted())
            .map_err(|e| CalSeriesError::Serialization(e.to_string()))?;

        // Write next to the target and rename so readers never see a partial file
        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, content)?;
        std::fs::rename(&tmp_path, &self.path)?;

        Ok(())
    }
}

impl EventStore for JsonFileStore {
    fn insert(&mut self, event: Event) -> CalSeriesResult<StoredEvent> {
        self.transaction(|store| store.inner.insert(event))
    }

    fn get(&self, id: EventId) -> CalSeriesResult<Option<StoredEvent>> {
        self.inner.get(id)
    }

    fn update(&mut self, event: &StoredEvent) -> CalSeriesResult<()> {
        self.transaction(|store| store.inner.update(event))
    }

    fn query_overlapping(&self, span: &Span, mode: OverlapMode) -> CalSeriesResult<Vec<StoredEvent>> {
        self.inner.query_overlapping(span, mode)
    }

    fn delete_children(&mut self, parent_id: EventId) -> CalSeriesResult<usize> {
        self.transaction(|store| store.inner.delete_children(parent_id))
    }

    fn delete(&mut self, id: EventId) -> CalSeriesResult<usize> {
        self.transaction(|store| store.inner.delete(id))
    }

    fn all(&self) -> CalSeriesResult<Vec<StoredEvent>> {
        self.inner.all()
    }

    fn transaction<T, F>(&mut self, f: F) -> CalSeriesResult<T>
    where
        F: FnOnce(&mut Self) -> CalSeriesResult<T>,
    {
        // Nested calls ride on the outermost snapshot
        if self.depth > 0 {
            return f(self);
        }

        let snapshot = self.inner.clone();

        self.depth += 1;
        let result = f(self);
        self.depth -= 1;

        let result = result.and_then(|value| self.save().map(|_| value));
        if result.is_err() {
            self.inner = snapshot;
        }
        result
    }
}
