//! Spectrohash catalog file format library
//!
//! A catalog maps an entry identifier to the four hex-encoded perceptual
//! hashes of one audio clip. Files are stored as JSON or BSON documents.

pub mod bson_format;
pub mod format;
pub mod json_format;

pub use format::{CatalogFile, CatalogFormat, CatalogRecord, FormatError, FEATURE_COUNT};
