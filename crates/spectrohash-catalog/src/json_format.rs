//! JSON encoding of catalog files
//!
//! Layout: `{ "<id>": { "spectrohash": "<hex>", "features": ["<mel>", "<cepstral>", "<chroma>"] } }`

use crate::format::CatalogFile;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

impl CatalogFile {
    /// Encode as pretty JSON with a 4-space indent
    pub fn to_json_string(&self) -> Result<String> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut serializer)?;
        Ok(String::from_utf8(buf)?)
    }

    /// Decode from a JSON string
    pub fn from_json_str(json_str: &str) -> Result<Self> {
        let catalog: CatalogFile = serde_json::from_str(json_str)?;
        Ok(catalog)
    }

    /// Save to JSON file
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json_str = self.to_json_string()?;
        std::fs::write(path, json_str)
            .with_context(|| format!("Failed to write catalog: {}", path.display()))?;
        log::debug!("Wrote {} catalog entries to {}", self.len(), path.display());
        Ok(())
    }

    /// Load from JSON file
    pub fn load_json(path: &Path) -> Result<Self> {
        let json_str = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog: {}", path.display()))?;
        Self::from_json_str(&json_str)
            .with_context(|| format!("Invalid JSON catalog: {}", path.display()))
    }
}
