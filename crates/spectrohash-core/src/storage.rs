//! Catalog persistence
//!
//! [`CatalogStore`] is the seam between the matcher and wherever fingerprint
//! sets are kept. [`FilesystemStore`] keeps them in a single JSON or BSON
//! catalog file.

use crate::error::{Result, SpectroHashError};
use crate::fingerprint::FingerprintSet;
use crate::matching::Catalog;
use spectrohash_catalog::{CatalogFile, CatalogFormat, CatalogRecord};
use std::path::{Path, PathBuf};

/// Read and write access to a catalog
pub trait CatalogStore: Send + Sync {
    /// Every entry in stored order
    fn load_all(&self) -> Result<Catalog>;

    /// Add or replace one entry
    fn append(&self, id: &str, set: &FingerprintSet) -> Result<()>;

    /// Replace the whole catalog
    fn write_all(&self, catalog: &Catalog) -> Result<()>;

    /// Add or replace several entries
    fn append_all(&self, catalog: &Catalog) -> Result<()> {
        for (id, set) in catalog.iter() {
            self.append(id, set)?;
        }
        Ok(())
    }
}

/// Catalog kept in one file
pub struct FilesystemStore {
    path: PathBuf,
    format: CatalogFormat,
}

impl FilesystemStore {
    pub fn new(path: impl Into<PathBuf>, format: CatalogFormat) -> Self {
        Self {
            path: path.into(),
            format,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn error(&self, e: impl std::fmt::Display) -> SpectroHashError {
        SpectroHashError::Catalog {
            path: self.path.clone(),
            message: e.to_string(),
        }
    }

    fn read_file(&self) -> Result<CatalogFile> {
        self.format
            .load(&self.path)
            .map_err(|e| self.error(format!("{e:#}")))
    }

    /// Stored catalog, or an empty one when the file does not exist yet
    fn read_or_empty(&self) -> Result<CatalogFile> {
        if self.path.exists() {
            self.read_file()
        } else {
            log::debug!("{} does not exist yet, starting empty", self.path.display());
            Ok(CatalogFile::new())
        }
    }

    fn write_file(&self, file: &CatalogFile) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| self.error(e))?;
        }
        self.format
            .save(&self.path, file)
            .map_err(|e| self.error(format!("{e:#}")))?;
        log::info!("wrote {} catalog entries to {}", file.len(), self.path.display());
        Ok(())
    }
}

impl CatalogStore for FilesystemStore {
    fn load_all(&self) -> Result<Catalog> {
        let file = self.read_file()?;
        let catalog = file_to_catalog(&file).map_err(|e| self.error(e))?;
        log::info!("loaded {} catalog entries from {}", catalog.len(), self.path.display());
        Ok(catalog)
    }

    fn append(&self, id: &str, set: &FingerprintSet) -> Result<()> {
        let mut file = self.read_or_empty()?;
        file.insert(id.to_string(), CatalogRecord::from(set));
        self.write_file(&file)
    }

    fn write_all(&self, catalog: &Catalog) -> Result<()> {
        self.write_file(&catalog_to_file(catalog))
    }

    fn append_all(&self, catalog: &Catalog) -> Result<()> {
        let mut file = self.read_or_empty()?;
        file.extend(catalog_to_file(catalog));
        self.write_file(&file)
    }
}

pub fn catalog_to_file(catalog: &Catalog) -> CatalogFile {
    catalog
        .iter()
        .map(|(id, set)| (id.to_string(), CatalogRecord::from(set)))
        .collect()
}

pub fn file_to_catalog(file: &CatalogFile) -> Result<Catalog> {
    file.iter()
        .map(|(id, record)| {
            let set = FingerprintSet::try_from(record).map_err(|e| {
                SpectroHashError::invalid(format!("catalog entry '{id}': {e}"))
            })?;
            Ok((id.to_string(), set))
        })
        .collect()
}
