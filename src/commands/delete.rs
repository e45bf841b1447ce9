use anyhow::Result;
use calseries_core::SeriesService;
use calseries_core::store::JsonFileStore;
use owo_colors::OwoColorize;

use super::parse_id;

pub fn run(service: &mut SeriesService<JsonFileStore>, id: &str) -> Result<()> {
    let id = parse_id(id)?;
    let title = service.get_event(id)?.event.title;
    let removed = service.delete_event(id)?;

    println!("{}", format!("  Deleted: {}", title).red());
    if removed > 1 {
        println!("  {}", format!("({} occurrences removed)", removed - 1).dimmed());
    }

    Ok(())
}
