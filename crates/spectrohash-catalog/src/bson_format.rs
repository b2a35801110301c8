//! BSON encoding of catalog files
//!
//! Same document shape as the JSON layout, stored as a single BSON document.

use crate::format::CatalogFile;
use anyhow::{Context, Result};
use std::path::Path;

impl CatalogFile {
    pub fn to_bson_bytes(&self) -> Result<Vec<u8>> {
        Ok(bson::to_vec(self)?)
    }

    pub fn from_bson_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(bson::from_slice(bytes)?)
    }

    /// Save to BSON file
    pub fn save_bson(&self, path: &Path) -> Result<()> {
        let bytes = self.to_bson_bytes()?;
        std::fs::write(path, bytes)
            .with_context(|| format!("Failed to write catalog: {}", path.display()))?;
        log::debug!("Wrote {} catalog entries to {}", self.len(), path.display());
        Ok(())
    }

    /// Load from BSON file
    pub fn load_bson(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read catalog: {}", path.display()))?;
        Self::from_bson_bytes(&bytes)
            .with_context(|| format!("Invalid BSON catalog: {}", path.display()))
    }
}
