//! Hamming distance and similarity scores
//!
//! Distances are normalised by the fingerprint's bit length, so scores stay
//! comparable across hash sizes.

use crate::error::{Result, SpectroHashError};
use crate::fingerprint::{Fingerprint, FingerprintKind, FingerprintSet};
use serde::Serialize;

/// One value per fingerprint kind
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PerKind<T> {
    pub spectrogram: T,
    pub mel: T,
    pub cepstral: T,
    pub chroma: T,
}

impl<T: Copy> PerKind<T> {
    pub fn get(&self, kind: FingerprintKind) -> T {
        match kind {
            FingerprintKind::Spectrogram => self.spectrogram,
            FingerprintKind::Mel => self.mel,
            FingerprintKind::Cepstral => self.cepstral,
            FingerprintKind::Chroma => self.chroma,
        }
    }

    pub fn values(&self) -> [T; 4] {
        [self.spectrogram, self.mel, self.cepstral, self.chroma]
    }
}

/// Raw distances between two fingerprint sets plus the derived scores
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub distances: PerKind<u32>,
    /// Per-kind similarity percentages
    pub kind_scores: PerKind<f64>,
    /// Similarity percentage over all four kinds
    pub score: f64,
}

/// Number of differing bits; fails on a bit-length mismatch
pub fn hamming_distance(a: &Fingerprint, b: &Fingerprint) -> Result<u32> {
    a.hamming_distance(b)
}

/// `1 - distance / bit_len`, in `[0, 1]`
pub fn similarity(distance: u32, bit_len: usize) -> Result<f64> {
    check_distance(distance as f64, bit_len)?;
    Ok(1.0 - distance as f64 / bit_len as f64)
}

/// [`similarity`] as a percentage
pub fn similarity_percent(distance: u32, bit_len: usize) -> Result<f64> {
    Ok(similarity(distance, bit_len)? * 100.0)
}

/// Equal-weight average of the four distances as a similarity percentage
pub fn aggregate(distances: &PerKind<u32>, bit_len: usize) -> Result<f64> {
    let mean = distances.values().iter().map(|&d| d as f64).sum::<f64>() / 4.0;
    check_distance(mean, bit_len)?;
    Ok((1.0 - mean / bit_len as f64) * 100.0)
}

/// Compare every kind of `query` with the same kind of `entry`
pub fn compare(query: &FingerprintSet, entry: &FingerprintSet) -> Result<Comparison> {
    let bit_len = query.bit_len()?;
    let distances = PerKind {
        spectrogram: query.spectrogram.hamming_distance(&entry.spectrogram)?,
        mel: query.mel.hamming_distance(&entry.mel)?,
        cepstral: query.cepstral.hamming_distance(&entry.cepstral)?,
        chroma: query.chroma.hamming_distance(&entry.chroma)?,
    };

    let kind_scores = PerKind {
        spectrogram: similarity_percent(distances.spectrogram, bit_len)?,
        mel: similarity_percent(distances.mel, bit_len)?,
        cepstral: similarity_percent(distances.cepstral, bit_len)?,
        chroma: similarity_percent(distances.chroma, bit_len)?,
    };
    Ok(Comparison {
        distances,
        kind_scores,
        score: aggregate(&distances, bit_len)?,
    })
}

fn check_distance(distance: f64, bit_len: usize) -> Result<()> {
    if bit_len == 0 {
        return Err(SpectroHashError::invalid("bit length must be > 0"));
    }
    if distance > bit_len as f64 {
        return Err(SpectroHashError::invalid(format!(
            "distance {distance} exceeds bit length {bit_len}"
        )));
    }
    Ok(())
}
