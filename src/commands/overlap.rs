use anyhow::Result;
use calseries_core::SeriesService;
use calseries_core::store::JsonFileStore;
use owo_colors::OwoColorize;

use super::parse_id;
use crate::date_range::parse_datetime;
use crate::render::Render;

pub fn run(
    service: &SeriesService<JsonFileStore>,
    start: &str,
    end: &str,
    exclude: Option<&str>,
    json: bool,
) -> Result<()> {
    let start = parse_datetime(start)?;
    let end = parse_datetime(end)?;
    let exclude = exclude.map(parse_id).transpose()?;

    let report = service.check_overlap(start, end, exclude)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if !report.has_overlap {
        println!("{}", "  Slot is free".green());
        return Ok(());
    }

    let count = report.conflicts.len();
    println!(
        "{}",
        format!(
            "  {} {}:",
            count,
            if count == 1 { "conflict" } else { "conflicts" }
        )
        .red()
    );
    for conflict in &report.conflicts {
        println!("   {}", conflict.render());
    }

    Ok(())
}
