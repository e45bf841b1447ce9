//! Colored terminal rendering for core types.

use calseries_core::{Conflict, Occurrence, OccurrenceKind};
use chrono::{DateTime, Local, Utc};
use owo_colors::OwoColorize;

/// Extension trait for terminal rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

impl Render for OccurrenceKind {
    fn render(&self) -> String {
        match self {
            OccurrenceKind::Single => " ".to_string(),
            OccurrenceKind::Persisted => "↻".cyan().to_string(),
            OccurrenceKind::Virtual => "↻".dimmed().to_string(),
        }
    }
}

impl Render for Occurrence {
    fn render(&self) -> String {
        let time = format!(
            "{}-{}",
            format_time(&self.start()),
            format_time(&self.end())
        );
        let mut line = format!("{:>11} {} {}", time, self.kind.render(), self.event.title);

        if let Some(ref location) = self.event.location {
            line.push_str(&format!(" {}", format!("@ {}", location).dimmed()));
        }
        line.push_str(&format!(" {}", self.id.to_string().dimmed()));
        line
    }
}

impl Render for Conflict {
    fn render(&self) -> String {
        format!(
            "{} {} {}",
            "✗".red(),
            self.title,
            format!(
                "{} → {}",
                format_datetime(&self.start),
                format_datetime(&self.end)
            )
            .dimmed()
        )
    }
}

fn format_time(dt: &DateTime<Utc>) -> String {
    dt.with_timezone(&Local).format("%H:%M").to_string()
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}
