use std::path::Path;

use anyhow::Result;
use calseries_core::SeriesService;
use calseries_core::ics::generate_ics;
use calseries_core::store::JsonFileStore;
use owo_colors::OwoColorize;

use crate::date_range::DateRange;

pub fn run(service: &SeriesService<JsonFileStore>, range: DateRange, output: Option<&Path>) -> Result<()> {
    let occurrences = service.query_range(range.from, range.to)?;
    let ics = generate_ics(&occurrences)?;

    match output {
        Some(path) => {
            std::fs::write(path, ics)?;
            eprintln!(
                "{}",
                format!("  Exported {} events to {}", occurrences.len(), path.display()).green()
            );
        }
        None => print!("{}", ics),
    }

    Ok(())
}
