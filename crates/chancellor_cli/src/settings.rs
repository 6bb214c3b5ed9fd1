//! The optional `chancellor.toml` file.

use anyhow::{Context, Result};
use chancellor_oracle::{ExplorerFilters, OracleSettings};
use chancellor_search::SearchConfig;
use serde::Deserialize;
use std::path::Path;

pub const DEFAULT_SETTINGS_FILE: &str = "chancellor.toml";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub search: SearchConfig,
    pub oracle: OracleSettings,
    pub filters: ExplorerFilters,
}

impl Settings {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let settings: Self = toml::from_str(text).context("invalid settings")?;
        settings.search.validate()?;
        Ok(settings)
    }

    /// Settings from `path`, or the defaults when no path was given and the
    /// default file does not exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path,
            None if Path::new(DEFAULT_SETTINGS_FILE).exists() => Path::new(DEFAULT_SETTINGS_FILE),
            None => return Ok(Self::default()),
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("in {}", path.display()))
    }
}
