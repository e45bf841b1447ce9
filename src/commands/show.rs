use anyhow::Result;
use calseries_core::SeriesService;
use calseries_core::store::JsonFileStore;

use super::parse_id;

pub fn run(service: &SeriesService<JsonFileStore>, id: &str) -> Result<()> {
    let stored = service.get_event(parse_id(id)?)?;
    println!("{}", serde_json::to_string_pretty(&stored)?);
    Ok(())
}
