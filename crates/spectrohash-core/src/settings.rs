//! TOML settings for the command-line tools
//!
//! ```toml
//! [engine]
//! window = "hann"
//! hash_size = 16
//!
//! [catalog]
//! path = "./catalog.json"
//! format = "auto"
//!
//! [loader]
//! max_duration_ms = 60000
//! ```
//!
//! Every section and field is optional.

use crate::config::EngineConfig;
use crate::error::{Result, SpectroHashError};
use serde::{Deserialize, Serialize};
use spectrohash_catalog::CatalogFormat;
use std::path::{Path, PathBuf};

/// File picked up from the working directory when no path is given
pub const DEFAULT_SETTINGS_FILE: &str = "spectrohash.toml";

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub catalog: CatalogSettings,
    #[serde(default)]
    pub loader: LoaderSettings,
}

/// Where the catalog lives and how it is encoded
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CatalogSettings {
    #[serde(default = "default_catalog_path")]
    pub path: PathBuf,
    #[serde(default)]
    pub format: CatalogFormat,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            path: default_catalog_path(),
            format: CatalogFormat::default(),
        }
    }
}

fn default_catalog_path() -> PathBuf {
    PathBuf::from("./catalog.json")
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LoaderSettings {
    /// Clips are truncated to this many milliseconds; 0 keeps everything
    #[serde(default = "default_max_duration_ms")]
    pub max_duration_ms: u64,
}

impl Default for LoaderSettings {
    fn default() -> Self {
        Self {
            max_duration_ms: default_max_duration_ms(),
        }
    }
}

fn default_max_duration_ms() -> u64 {
    60_000
}

impl LoaderSettings {
    pub fn max_duration(&self) -> Option<u64> {
        (self.max_duration_ms > 0).then_some(self.max_duration_ms)
    }
}

impl Settings {
    /// Load settings from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SpectroHashError::config(format!(
                "failed to read settings file {}: {e}",
                path.display()
            ))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let settings: Settings = toml::from_str(content)
            .map_err(|e| SpectroHashError::config(format!("failed to parse TOML settings: {e}")))?;
        settings.engine.validate()?;
        Ok(settings)
    }

    /// `path` if given, else [`DEFAULT_SETTINGS_FILE`] if present, else defaults
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let default = Path::new(DEFAULT_SETTINGS_FILE);
                if default.exists() {
                    log::info!("using settings from {}", default.display());
                    Self::load(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}
