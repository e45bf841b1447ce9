//! Host configuration.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::{CalSeriesError, CalSeriesResult};

static DEFAULT_STORE_PATH: &str = "~/calendar/calseries.json";
const DEFAULT_RANGE_DAYS: i64 = 30;

fn default_store_path() -> PathBuf {
    PathBuf::from(DEFAULT_STORE_PATH)
}

fn default_range_days() -> i64 {
    DEFAULT_RANGE_DAYS
}

/// Configuration at ~/.config/calseries/config.toml
///
/// Every key can be overridden from the environment with a `CALSERIES_` prefix,
/// e.g. `CALSERIES_STORE_PATH`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SeriesConfig {
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,

    /// Days shown by range commands when no bounds are given
    #[serde(default = "default_range_days")]
    pub default_range_days: i64,

    /// Tracing filter, e.g. "info" or "calseries_core=debug"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

impl Default for SeriesConfig {
    fn default() -> Self {
        SeriesConfig {
            store_path: default_store_path(),
            default_range_days: DEFAULT_RANGE_DAYS,
            log_level: None,
        }
    }
}

impl SeriesConfig {
    pub fn config_path() -> CalSeriesResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| CalSeriesError::Config("Could not determine config directory".into()))?
            .join("calseries");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from the default location, writing a commented template on first run.
    pub fn load() -> CalSeriesResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> CalSeriesResult<Self> {
        Config::builder()
            .add_source(File::from(path.to_path_buf()).required(false))
            .add_source(Environment::with_prefix("CALSERIES"))
            .build()
            .map_err(|e| CalSeriesError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| CalSeriesError::Config(e.to_string()))
    }

    /// Store location with `~` expanded.
    pub fn store_path(&self) -> PathBuf {
        let full_path_str = shellexpand::tilde(&self.store_path.to_string_lossy()).into_owned();

        PathBuf::from(full_path_str)
    }

    pub fn to_toml(&self) -> CalSeriesResult<String> {
        toml::to_string_pretty(self).map_err(|e| CalSeriesError::Config(e.to_string()))
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> CalSeriesResult<()> {
        let contents = format!(
            "\
# calseries configuration

# Where events are stored:
# store_path = \"{}\"

# Days shown by `events` and `export` when no range is given:
# default_range_days = {}

# Log filter (RUST_LOG takes precedence):
# log_level = \"info\"
",
            DEFAULT_STORE_PATH, DEFAULT_RANGE_DAYS
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                CalSeriesError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| CalSeriesError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_template_loads_as_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("calseries").join("config.toml");

        SeriesConfig::create_default_config(&path).unwrap();
        let config = SeriesConfig::load_from(&path).unwrap();

        assert_eq!(config.store_path, PathBuf::from(DEFAULT_STORE_PATH));
        assert_eq!(config.default_range_days, DEFAULT_RANGE_DAYS);
        assert_eq!(config.log_level, None);
    }

    #[test]
    fn test_values_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "store_path = \"/srv/events.json\"\ndefault_range_days = 7\nlog_level = \"debug\"\n",
        )
        .unwrap();

        let config = SeriesConfig::load_from(&path).unwrap();
        assert_eq!(config.store_path(), PathBuf::from("/srv/events.json"));
        assert_eq!(config.default_range_days, 7);
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = SeriesConfig {
            log_level: Some("info".to_string()),
            ..Default::default()
        };
        let text = config.to_toml().unwrap();
        let parsed: SeriesConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }
}
