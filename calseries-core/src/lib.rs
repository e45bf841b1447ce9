//! Recurring event series engine.
//!
//! This crate holds everything with real calendar logic in it:
//! - `recurrence` expands a frequency/interval/bound rule into start instants
//! - `materialize` turns a root event into stored or virtual occurrences
//! - `series` keeps stored occurrences in step with their root and answers
//!   range and overlap queries against an `EventStore`

pub mod config;
pub mod error;
pub mod event;
pub mod ics;
pub mod interval;
pub mod materialize;
pub mod recurrence;
pub mod series;
pub mod store;

pub use error::{CalSeriesError, CalSeriesResult};
pub use event::{Color, Event, EventChanges, EventId, Frequency, StoredEvent};
pub use materialize::{Occurrence, OccurrenceKind};
pub use series::{Conflict, OverlapReport, SeriesService};
