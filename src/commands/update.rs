use anyhow::{Result, bail};
use calseries_core::store::JsonFileStore;
use calseries_core::{Color, EventChanges, Frequency, SeriesService};
use owo_colors::OwoColorize;

use super::{Repeat, parse_id};
use crate::RepeatArgs;
use crate::date_range::parse_datetime;

pub struct UpdateArgs {
    pub title: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub color: Option<String>,
    pub repeat: RepeatArgs,
    pub no_repeat: bool,
}

pub fn run(service: &mut SeriesService<JsonFileStore>, id: &str, args: UpdateArgs) -> Result<()> {
    let id = parse_id(id)?;
    let changes = build_changes(args)?;

    if changes.is_empty() {
        println!("{}", "Nothing to update".dimmed());
        return Ok(());
    }

    let stored = service.update_series(id, changes)?;
    println!("{}", format!("  Updated: {}", stored.event).yellow());

    if stored.event.is_series_root() {
        println!("  {}", "Occurrences regenerated".dimmed());
    }

    Ok(())
}

fn build_changes(args: UpdateArgs) -> Result<EventChanges> {
    let mut changes = EventChanges {
        title: args.title,
        start: args.start.as_deref().map(parse_datetime).transpose()?,
        end: args.end.as_deref().map(parse_datetime).transpose()?,
        color: args.color.as_deref().map(Color::parse).transpose()?,
        ..Default::default()
    };

    // An empty string clears the field
    if let Some(description) = args.description {
        changes.description = Some(Some(description).filter(|d| !d.is_empty()));
    }
    if let Some(location) = args.location {
        changes.location = Some(Some(location).filter(|l| !l.is_empty()));
    }

    let repeat = Repeat::parse(&args.repeat)?;

    if args.no_repeat || repeat.frequency == Some(Frequency::None) {
        if repeat.is_dangling() {
            bail!("--every and --until cannot be combined with --repeat none");
        }
        changes.is_recurring = Some(false);
        changes.recurrence_frequency = Some(Frequency::None);
        changes.recurrence_end = Some(None);
        return Ok(changes);
    }

    if let Some(frequency) = repeat.frequency {
        changes.is_recurring = Some(true);
        changes.recurrence_frequency = Some(frequency);
    }
    changes.recurrence_interval = repeat.interval;
    changes.recurrence_end = repeat.until.map(Some);

    Ok(changes)
}
