//! Dashboard configuration, read from an optional TOML file.
//!
//! ```toml
//! data_path = "data/spotify_songs.csv"
//! resize_debounce_ms = 300
//! log_level = "info"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::scheduler::DEFAULT_RESIZE_DEBOUNCE;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardConfig {
    /// Track table loaded when no path is given on the command line.
    pub data_path: Option<PathBuf>,
    pub resize_debounce_ms: u64,
    pub log_level: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: None,
            resize_debounce_ms: DEFAULT_RESIZE_DEBOUNCE.as_millis() as u64,
            log_level: "info".to_string(),
        }
    }
}

impl DashboardConfig {
    pub fn resize_debounce(&self) -> Duration {
        Duration::from_millis(self.resize_debounce_ms)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read `path`; `None` when the file does not exist.
    pub fn read(path: &Path) -> Result<Option<Self>, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::from_toml(&text).map(Some),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Read `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Ok(Self::read(path)?.unwrap_or_else(|| {
            log::warn!("config {} not found, using defaults", path.display());
            Self::default()
        }))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.resize_debounce_ms == 0 {
            return Err(ConfigError::Invalid(
                "resize_debounce_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
