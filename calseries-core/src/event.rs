//! Event types.
//!
//! A single `Event` shape covers all three roles in a series: standalone events,
//! recurring roots and the persisted occurrences generated from a root. Which role
//! a record plays is decided by `is_recurring` and `parent_id`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CalSeriesError, CalSeriesResult};
use crate::interval::{self, Span};

pub const DEFAULT_COLOR: &str = "#4285f4";
pub const MAX_TEXT_LEN: usize = 200;
pub const MIN_INTERVAL: u16 = 1;
pub const MAX_INTERVAL: u16 = 365;

/// Storage identity of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(Uuid);

impl EventId {
    pub fn new() -> Self {
        EventId(Uuid::new_v4())
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EventId {
    type Err = CalSeriesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(EventId)
            .map_err(|e| CalSeriesError::validation("id", format!("'{}' is not a valid id: {}", s, e)))
    }
}

/// How often a series repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::None => "none",
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::Yearly => "yearly",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = CalSeriesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Frequency::None),
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            "yearly" => Ok(Frequency::Yearly),
            other => Err(CalSeriesError::validation(
                "recurrence_frequency",
                format!("unknown frequency '{}'", other),
            )),
        }
    }
}

/// Display color as `#rrggbb`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(String);

impl Color {
    pub fn parse(s: &str) -> CalSeriesResult<Self> {
        let hex = s.strip_prefix('#').unwrap_or_default();
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(CalSeriesError::validation(
                "color",
                format!("'{}' is not a #rrggbb hex color", s),
            ));
        }
        Ok(Color(s.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Color {
    fn default() -> Self {
        Color(DEFAULT_COLOR.to_string())
    }
}

impl TryFrom<String> for Color {
    type Error = CalSeriesError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::parse(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.0
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn default_interval() -> u16 {
    MIN_INTERVAL
}

/// An event or the root of a recurring series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub title: String,
    pub description: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub location: Option<String>,
    #[serde(default)]
    pub color: Color,

    // Recurrence fields
    #[serde(default)]
    pub is_recurring: bool,
    #[serde(default)]
    pub recurrence_frequency: Frequency,
    /// Step multiplier on the frequency unit (2 + weekly = every other week)
    #[serde(default = "default_interval")]
    pub recurrence_interval: u16,
    /// Inclusive bound after which no occurrences are generated
    pub recurrence_end: Option<DateTime<Utc>>,
    /// Series root for persisted occurrences, None for roots and standalone events
    #[serde(default)]
    pub parent_id: Option<EventId>,
}

impl Event {
    pub fn new(title: impl Into<String>, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Event {
            title: title.into(),
            description: None,
            start,
            end,
            location: None,
            color: Color::default(),
            is_recurring: false,
            recurrence_frequency: Frequency::None,
            recurrence_interval: MIN_INTERVAL,
            recurrence_end: None,
            parent_id: None,
        }
    }

    /// Turn this event into the root of a recurring series.
    pub fn recurring(mut self, frequency: Frequency, interval: u16, until: DateTime<Utc>) -> Self {
        self.is_recurring = true;
        self.recurrence_frequency = frequency;
        self.recurrence_interval = interval;
        self.recurrence_end = Some(until);
        self
    }

    pub fn span(&self) -> Span {
        Span::new(self.start, self.end)
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn duration_minutes(&self) -> i64 {
        interval::duration_minutes(&self.span())
    }

    /// A record that defines a series: recurring and not itself a generated occurrence.
    pub fn is_series_root(&self) -> bool {
        self.is_recurring && self.parent_id.is_none()
    }

    /// Check the data-model invariants. Nothing is written before this passes.
    pub fn validate(&self) -> CalSeriesResult<()> {
        if self.title.trim().is_empty() {
            return Err(CalSeriesError::validation("title", "must not be empty"));
        }
        if self.title.chars().count() > MAX_TEXT_LEN {
            return Err(CalSeriesError::validation(
                "title",
                format!("must be at most {} characters", MAX_TEXT_LEN),
            ));
        }
        if self
            .location
            .as_ref()
            .is_some_and(|l| l.chars().count() > MAX_TEXT_LEN)
        {
            return Err(CalSeriesError::validation(
                "location",
                format!("must be at most {} characters", MAX_TEXT_LEN),
            ));
        }
        if self.end <= self.start {
            return Err(CalSeriesError::validation(
                "end",
                "end time must be after start time",
            ));
        }
        if !(MIN_INTERVAL..=MAX_INTERVAL).contains(&self.recurrence_interval) {
            return Err(CalSeriesError::validation(
                "recurrence_interval",
                format!("must be between {} and {}", MIN_INTERVAL, MAX_INTERVAL),
            ));
        }

        // Occurrences carry their root's rule verbatim and are never expanded
        if self.is_series_root() {
            if self.recurrence_frequency == Frequency::None {
                return Err(CalSeriesError::validation(
                    "recurrence_frequency",
                    "must be specified for recurring events",
                ));
            }
            match self.recurrence_end {
                None => {
                    return Err(CalSeriesError::validation(
                        "recurrence_end",
                        "is required for recurring events",
                    ));
                }
                Some(until) if until <= self.start => {
                    return Err(CalSeriesError::validation(
                        "recurrence_end",
                        "must be after the start time",
                    ));
                }
                Some(_) => {}
            }
        }

        Ok(())
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

/// An event as held by an `EventStore`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredEvent {
    pub id: EventId,
    #[serde(flatten)]
    pub event: Event,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoredEvent {
    pub fn span(&self) -> Span {
        self.event.span()
    }
}

/// A partial update for `SeriesService::update_series`.
///
/// `None` leaves a field untouched. For optional fields, `Some(None)` clears the value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventChanges {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub location: Option<Option<String>>,
    pub color: Option<Color>,
    pub is_recurring: Option<bool>,
    pub recurrence_frequency: Option<Frequency>,
    pub recurrence_interval: Option<u16>,
    pub recurrence_end: Option<Option<DateTime<Utc>>>,
}

impl EventChanges {
    pub fn is_empty(&self) -> bool {
        *self == EventChanges::default()
    }

    pub fn apply_to(self, event: &mut Event) {
        if let Some(title) = self.title {
            event.title = title;
        }
        if let Some(description) = self.description {
            event.description = description;
        }
        if let Some(start) = self.start {
            event.start = start;
        }
        if let Some(end) = self.end {
            event.end = end;
        }
        if let Some(location) = self.location {
            event.location = location;
        }
        if let Some(color) = self.color {
            event.color = color;
        }
        if let Some(is_recurring) = self.is_recurring {
            event.is_recurring = is_recurring;
        }
        if let Some(frequency) = self.recurrence_frequency {
            event.recurrence_frequency = frequency;
        }
        if let Some(interval) = self.recurrence_interval {
            event.recurrence_interval = interval;
        }
        if let Some(until) = self.recurrence_end {
            event.recurrence_end = until;
        }
    }
}
