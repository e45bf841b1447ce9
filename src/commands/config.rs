use anyhow::Result;
use calseries_core::config::SeriesConfig;
use owo_colors::OwoColorize;

pub fn run(config: &SeriesConfig) -> Result<()> {
    let config_path = SeriesConfig::config_path()?;

    println!("{}", "Paths".bold());
    println!("  Config:  {}", config_path.display());
    println!("  Store:   {}", config.store_path().display());
    println!();
    println!("{}", "Values".bold());
    for line in config.to_toml()?.lines() {
        println!("  {}", line);
    }

    Ok(())
}
