//! Spectrohash Core - perceptual audio fingerprinting
//!
//! A clip is reduced to four perceptual hashes: one of its spectrogram and
//! one each of its mel-band energy, cepstral coefficients and chroma energy.
//! Catalog entries are ranked against a query by the Hamming distances
//! between hashes of the same kind.

pub mod audio;
pub mod config;
pub mod distance;
pub mod error;
pub mod fingerprint;
pub mod matching;
pub mod matrix;
pub mod mixer;
pub mod pcm;
pub mod phash;
pub mod settings;
pub mod storage;
pub mod transform;

#[cfg(test)]
pub(crate) mod signals;
#[cfg(test)]
mod tests;

pub use config::EngineConfig;
pub use distance::{compare, hamming_distance, Comparison, PerKind};
pub use error::{Result, SpectroHashError};
pub use fingerprint::{Fingerprint, FingerprintGenerator, FingerprintKind, FingerprintSet};
pub use matching::{rank, rank_parallel, Catalog, MatchResult};
pub use mixer::mix;
pub use pcm::{PcmBuffer, Samples};
pub use settings::Settings;
pub use storage::{CatalogStore, FilesystemStore};
pub use transform::{TransformEngine, WindowType};

/// Fingerprint set of the first channel of `pcm`
pub fn compute_fingerprint_set(pcm: &PcmBuffer, config: &EngineConfig) -> Result<FingerprintSet> {
    FingerprintGenerator::new(config)?.generate(pcm)
}
