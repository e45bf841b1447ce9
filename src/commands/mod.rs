pub mod config;
pub mod delete;
pub mod events;
pub mod export;
pub mod new;
pub mod overlap;
pub mod show;
pub mod update;

use anyhow::Result;
use calseries_core::{EventId, Frequency};
use chrono::{DateTime, Utc};

use crate::RepeatArgs;
use crate::date_range;

/// `--repeat/--every/--until` after parsing. Each part is optional so `update`
/// can change one of them on an existing series.
#[derive(Debug, Default, PartialEq)]
pub struct Repeat {
    pub frequency: Option<Frequency>,
    pub interval: Option<u16>,
    pub until: Option<DateTime<Utc>>,
}

impl Repeat {
    pub fn parse(args: &RepeatArgs) -> Result<Self> {
        Ok(Repeat {
            frequency: args.repeat.as_deref().map(str::parse::<Frequency>).transpose()?,
            interval: args.every,
            until: args.until.as_deref().map(date_range::parse_end_of_day).transpose()?,
        })
    }

    /// Interval or bound given without saying how often to repeat.
    pub fn is_dangling(&self) -> bool {
        matches!(self.frequency, None | Some(Frequency::None))
            && (self.interval.is_some() || self.until.is_some())
    }
}

pub fn parse_id(id: &str) -> Result<EventId> {
    Ok(id.parse()?)
}
