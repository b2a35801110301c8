//! Error types for the fingerprinting engine

use std::path::PathBuf;

/// Errors raised by transforms, hashing, comparison and the collaborators
/// wrapped by this crate
#[derive(Debug, thiserror::Error)]
pub enum SpectroHashError {
    /// Malformed or empty numeric input
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Fingerprints of different bit length or kind were compared
    #[error("incompatible fingerprints: {0}")]
    IncompatibleFingerprint(String),

    /// Audio could not be decoded
    #[error("failed to load {}: {message}", path.display())]
    Load { path: PathBuf, message: String },

    /// Unknown window name or unsupported hash size
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Catalog persistence failure
    #[error("catalog error at {}: {message}", path.display())]
    Catalog { path: PathBuf, message: String },
}

impl SpectroHashError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        SpectroHashError::InvalidInput(message.into())
    }

    pub(crate) fn config(message: impl Into<String>) -> Self {
        SpectroHashError::Configuration(message.into())
    }
}

pub type Result<T> = std::result::Result<T, SpectroHashError>;
