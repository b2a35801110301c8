//! Configuration parameters for the fingerprinting engine

use crate::error::{Result, SpectroHashError};
use crate::transform::WindowType;
use serde::{Deserialize, Serialize};

/// Largest supported hash size (bits per side of the square hash)
pub const MAX_HASH_SIZE: usize = 64;

/// Algorithm configuration
///
/// Two fingerprints are only comparable when computed with the same
/// `hash_size`; the remaining fields change the matrices that get hashed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // Spectrogram
    pub window: WindowType,
    pub segment_length: usize,
    /// Defaults to `segment_length / 8` when unset
    pub segment_overlap: Option<usize>,

    // Mel energy
    pub mel_bands: usize,

    // Cepstral coefficients
    pub cepstral_fft_size: usize,
    pub cepstral_hop: usize,
    pub cepstral_coefficients: usize,
    pub cepstral_top_db: f64,

    // Perceptual hash
    pub hash_size: usize,
    pub highfreq_factor: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            window: WindowType::Hann,
            segment_length: 256,
            segment_overlap: None,

            mel_bands: 128,

            cepstral_fft_size: 2048,
            cepstral_hop: 512,
            cepstral_coefficients: 20,
            cepstral_top_db: 80.0,

            hash_size: 16,
            highfreq_factor: 4,
        }
    }
}

impl EngineConfig {
    /// Overlap between successive spectrogram segments
    pub fn overlap(&self) -> usize {
        self.segment_overlap.unwrap_or(self.segment_length / 8)
    }

    /// Bits per fingerprint
    pub fn bit_len(&self) -> usize {
        self.hash_size * self.hash_size
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.segment_length < 2 {
            return Err(SpectroHashError::config("segment_length must be >= 2"));
        }
        if self.overlap() >= self.segment_length {
            return Err(SpectroHashError::config(
                "segment_overlap must be < segment_length",
            ));
        }
        if self.mel_bands == 0 {
            return Err(SpectroHashError::config("mel_bands must be > 0"));
        }
        if self.cepstral_fft_size < 2 || self.cepstral_hop == 0 {
            return Err(SpectroHashError::config(
                "cepstral_fft_size must be >= 2 and cepstral_hop > 0",
            ));
        }
        if self.cepstral_coefficients == 0 || self.cepstral_coefficients > self.mel_bands {
            return Err(SpectroHashError::config(
                "cepstral_coefficients must be in 1..=mel_bands",
            ));
        }
        if !(self.cepstral_top_db > 0.0) {
            return Err(SpectroHashError::config("cepstral_top_db must be > 0"));
        }
        validate_hash_size(self.hash_size)?;
        if self.highfreq_factor == 0 {
            return Err(SpectroHashError::config("highfreq_factor must be > 0"));
        }
        Ok(())
    }
}

/// Hash sizes must be even (whole hex digits) and at most [`MAX_HASH_SIZE`]
pub fn validate_hash_size(hash_size: usize) -> Result<()> {
    if hash_size < 2 || hash_size % 2 != 0 || hash_size > MAX_HASH_SIZE {
        return Err(SpectroHashError::config(format!(
            "unsupported hash size {hash_size}: must be even and in 2..={MAX_HASH_SIZE}"
        )));
    }
    Ok(())
}
