use anyhow::Result;
use calseries_core::SeriesService;
use calseries_core::store::JsonFileStore;
use chrono::{DateTime, Local, Utc};
use owo_colors::OwoColorize;

use crate::date_range::DateRange;
use crate::render::Render;

pub fn run(service: &SeriesService<JsonFileStore>, range: DateRange, json: bool) -> Result<()> {
    let occurrences = service.query_range(range.from, range.to)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&occurrences)?);
        return Ok(());
    }

    if occurrences.is_empty() {
        println!("{}", "No events found".dimmed());
        return Ok(());
    }

    // Group by day
    let mut current_date: Option<String> = None;

    for occurrence in &occurrences {
        let date_label = format_date_label(&occurrence.start());

        if current_date.as_ref() != Some(&date_label) {
            if current_date.is_some() {
                println!();
            }
            println!("{}", date_label.bold());
            current_date = Some(date_label);
        }

        println!("  {}", occurrence.render());
    }

    Ok(())
}

/// "Today", "Tomorrow", or e.g. "Wed Feb 25"
fn format_date_label(start: &DateTime<Utc>) -> String {
    let today = Local::now().date_naive();
    let date = start.with_timezone(&Local).date_naive();

    match (date - today).num_days() {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        _ => date.format("%a %b %-d %Y").to_string(),
    }
}
