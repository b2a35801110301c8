//! Catalog file structures

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

/// Number of feature hashes stored per entry
pub const FEATURE_COUNT: usize = 3;

/// Structural problems in a catalog file
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FormatError {
    #[error("entry '{id}' has {found} feature hashes, expected {}", FEATURE_COUNT)]
    FeatureCount { id: String, found: usize },

    #[error("entry '{id}' has an empty hash")]
    EmptyHash { id: String },

    #[error("cannot infer catalog format from path: {0}")]
    UnknownExtension(String),
}

/// Stored hashes of a single catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogRecord {
    /// Hex hash of the spectrogram
    pub spectrohash: String,
    /// Hex hashes of the mel, cepstral and chroma features (in that order)
    pub features: Vec<String>,
}

impl CatalogRecord {
    pub fn new(spectrohash: String, mel: String, cepstral: String, chroma: String) -> Self {
        Self {
            spectrohash,
            features: vec![mel, cepstral, chroma],
        }
    }

    /// Check the record shape for the given entry id
    pub fn validate(&self, id: &str) -> Result<(), FormatError> {
        if self.features.len() != FEATURE_COUNT {
            return Err(FormatError::FeatureCount {
                id: id.to_string(),
                found: self.features.len(),
            });
        }
        if self.spectrohash.is_empty() || self.features.iter().any(String::is_empty) {
            return Err(FormatError::EmptyHash { id: id.to_string() });
        }
        Ok(())
    }
}

/// Ordered collection of catalog records keyed by entry id
///
/// Iteration follows insertion (or file) order. Ids are unique: inserting an
/// existing id replaces its record without moving it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogFile {
    entries: Vec<(String, CatalogRecord)>,
    /// id -> position in `entries`
    index: HashMap<String, usize>,
}

impl CatalogFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a record, returning the previous one
    pub fn insert(&mut self, id: String, record: CatalogRecord) -> Option<CatalogRecord> {
        match self.index.get(&id) {
            Some(&position) => Some(std::mem::replace(&mut self.entries[position].1, record)),
            None => {
                self.index.insert(id.clone(), self.entries.len());
                self.entries.push((id, record));
                None
            }
        }
    }

    /// Merge another catalog into this one; records from `other` win
    pub fn extend(&mut self, other: CatalogFile) {
        for (id, record) in other.entries {
            self.insert(id, record);
        }
    }

    pub fn get(&self, id: &str) -> Option<&CatalogRecord> {
        self.index.get(id).map(|&position| &self.entries[position].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CatalogRecord)> {
        self.entries.iter().map(|(id, record)| (id.as_str(), record))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Validate every record
    pub fn validate(&self) -> Result<(), FormatError> {
        self.entries
            .iter()
            .try_for_each(|(id, record)| record.validate(id))
    }
}

impl FromIterator<(String, CatalogRecord)> for CatalogFile {
    fn from_iter<I: IntoIterator<Item = (String, CatalogRecord)>>(iter: I) -> Self {
        let mut catalog = CatalogFile::new();
        for (id, record) in iter {
            catalog.insert(id, record);
        }
        catalog
    }
}

impl Serialize for CatalogFile {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (id, record) in &self.entries {
            map.serialize_entry(id, record)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for CatalogFile {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CatalogVisitor;

        impl<'de> Visitor<'de> for CatalogVisitor {
            type Value = CatalogFile;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of entry id to catalog record")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut catalog = CatalogFile::new();
                while let Some((id, record)) = access.next_entry::<String, CatalogRecord>()? {
                    catalog.insert(id, record);
                }
                Ok(catalog)
            }
        }

        deserializer.deserialize_map(CatalogVisitor)
    }
}

/// On-disk encoding of a catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogFormat {
    Json,
    Bson,
    /// Pick JSON or BSON from the file extension
    #[default]
    Auto,
}

impl CatalogFormat {
    /// Resolve `Auto` against a path; explicit formats are returned unchanged
    pub fn resolve(self, path: &Path) -> Result<CatalogFormat, FormatError> {
        match self {
            CatalogFormat::Auto => match path.extension().and_then(|e| e.to_str()) {
                Some("json") => Ok(CatalogFormat::Json),
                Some("bson") => Ok(CatalogFormat::Bson),
                _ => Err(FormatError::UnknownExtension(path.display().to_string())),
            },
            explicit => Ok(explicit),
        }
    }

    /// Load a catalog in this format
    pub fn load(self, path: &Path) -> anyhow::Result<CatalogFile> {
        let catalog = match self.resolve(path)? {
            CatalogFormat::Bson => CatalogFile::load_bson(path)?,
            _ => CatalogFile::load_json(path)?,
        };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Save a catalog in this format
    pub fn save(self, path: &Path, catalog: &CatalogFile) -> anyhow::Result<()> {
        catalog.validate()?;
        match self.resolve(path)? {
            CatalogFormat::Bson => catalog.save_bson(path),
            _ => catalog.save_json(path),
        }
    }
}
