//! Fingerprints and fingerprint sets
//!
//! A fingerprint is the bit string produced by hashing one matrix. Every
//! clip is described by four of them, one per [`FingerprintKind`].

use crate::config::EngineConfig;
use crate::error::{Result, SpectroHashError};
use crate::phash::PerceptualHasher;
use crate::pcm::PcmBuffer;
use crate::transform::TransformEngine;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use spectrohash_catalog::{CatalogRecord, FEATURE_COUNT};
use std::fmt;
use std::str::FromStr;

/// Fixed-length bit string, most significant bit first
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    words: Vec<u64>,
    bit_len: usize,
}

impl Fingerprint {
    /// Pack bits; the length must be a positive multiple of 4 so the hash
    /// has an exact hex form
    pub fn from_bits(bits: &[bool]) -> Result<Self> {
        if bits.is_empty() || bits.len() % 4 != 0 {
            return Err(SpectroHashError::invalid(format!(
                "fingerprint length must be a positive multiple of 4, got {}",
                bits.len()
            )));
        }
        let mut words = vec![0u64; bits.len().div_ceil(64)];
        for (i, &bit) in bits.iter().enumerate() {
            if bit {
                words[i / 64] |= 1u64 << (63 - i % 64);
            }
        }
        Ok(Self {
            words,
            bit_len: bits.len(),
        })
    }

    pub fn bit_len(&self) -> usize {
        self.bit_len
    }

    pub fn bit(&self, index: usize) -> bool {
        index < self.bit_len && self.words[index / 64] & (1u64 << (63 - index % 64)) != 0
    }

    pub fn count_ones(&self) -> u32 {
        self.words.iter().map(|w| w.count_ones()).sum()
    }

    /// Number of differing bit positions
    pub fn hamming_distance(&self, other: &Fingerprint) -> Result<u32> {
        if self.bit_len != other.bit_len {
            return Err(SpectroHashError::IncompatibleFingerprint(format!(
                "cannot compare a {}-bit fingerprint with a {}-bit fingerprint",
                self.bit_len, other.bit_len
            )));
        }
        Ok(self
            .words
            .iter()
            .zip(&other.words)
            .map(|(a, b)| (a ^ b).count_ones())
            .sum())
    }

    pub fn to_hex(&self) -> String {
        (0..self.bit_len / 4)
            .map(|nibble| {
                let value = (0..4).fold(0u32, |acc, i| (acc << 1) | self.bit(nibble * 4 + i) as u32);
                char::from_digit(value, 16).unwrap_or('0')
            })
            .collect()
    }

    pub fn from_hex(hex: &str) -> Result<Self> {
        let hex = hex.trim();
        let mut bits = Vec::with_capacity(hex.len() * 4);
        for c in hex.chars() {
            let value = c.to_digit(16).ok_or_else(|| {
                SpectroHashError::invalid(format!("'{c}' is not a hex digit in fingerprint '{hex}'"))
            })?;
            bits.extend((0..4).rev().map(|shift| (value >> shift) & 1 == 1));
        }
        Self::from_bits(&bits)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Fingerprint {
    type Err = SpectroHashError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl Serialize for Fingerprint {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Fingerprint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        Fingerprint::from_hex(&hex).map_err(serde::de::Error::custom)
    }
}

/// The matrix a fingerprint was computed from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FingerprintKind {
    Spectrogram,
    Mel,
    Cepstral,
    Chroma,
}

impl FingerprintKind {
    /// Kinds in their fixed storage order
    pub const ALL: [FingerprintKind; 4] = [
        FingerprintKind::Spectrogram,
        FingerprintKind::Mel,
        FingerprintKind::Cepstral,
        FingerprintKind::Chroma,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            FingerprintKind::Spectrogram => "spectrogram",
            FingerprintKind::Mel => "mel",
            FingerprintKind::Cepstral => "cepstral",
            FingerprintKind::Chroma => "chroma",
        }
    }
}

impl fmt::Display for FingerprintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One fingerprint per kind for a single clip
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FingerprintSet {
    pub spectrogram: Fingerprint,
    pub mel: Fingerprint,
    pub cepstral: Fingerprint,
    pub chroma: Fingerprint,
}

impl FingerprintSet {
    pub fn get(&self, kind: FingerprintKind) -> &Fingerprint {
        match kind {
            FingerprintKind::Spectrogram => &self.spectrogram,
            FingerprintKind::Mel => &self.mel,
            FingerprintKind::Cepstral => &self.cepstral,
            FingerprintKind::Chroma => &self.chroma,
        }
    }

    /// Fingerprints in storage order
    pub fn iter(&self) -> impl Iterator<Item = (FingerprintKind, &Fingerprint)> {
        FingerprintKind::ALL.into_iter().map(move |kind| (kind, self.get(kind)))
    }

    /// Common bit length of the four fingerprints
    pub fn bit_len(&self) -> Result<usize> {
        let bit_len = self.spectrogram.bit_len();
        match self.iter().find(|(_, fp)| fp.bit_len() != bit_len) {
            Some((kind, fp)) => Err(SpectroHashError::IncompatibleFingerprint(format!(
                "{kind} fingerprint has {} bits, spectrogram fingerprint has {bit_len}",
                fp.bit_len()
            ))),
            None => Ok(bit_len),
        }
    }
}

impl From<&FingerprintSet> for CatalogRecord {
    fn from(set: &FingerprintSet) -> Self {
        CatalogRecord::new(
            set.spectrogram.to_hex(),
            set.mel.to_hex(),
            set.cepstral.to_hex(),
            set.chroma.to_hex(),
        )
    }
}

impl TryFrom<&CatalogRecord> for FingerprintSet {
    type Error = SpectroHashError;

    fn try_from(record: &CatalogRecord) -> Result<Self> {
        if record.features.len() != FEATURE_COUNT {
            return Err(SpectroHashError::invalid(format!(
                "expected {FEATURE_COUNT} feature hashes, found {}",
                record.features.len()
            )));
        }
        Ok(Self {
            spectrogram: record.spectrohash.parse()?,
            mel: record.features[0].parse()?,
            cepstral: record.features[1].parse()?,
            chroma: record.features[2].parse()?,
        })
    }
}

/// Runs the transform engine and the hasher over a clip
pub struct FingerprintGenerator {
    engine: TransformEngine,
    hasher: PerceptualHasher,
}

impl FingerprintGenerator {
    pub fn new(config: &EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            engine: TransformEngine::new(config),
            hasher: PerceptualHasher::from_config(config)?,
        })
    }

    /// Fingerprint set of the first channel of `pcm`
    pub fn generate(&self, pcm: &PcmBuffer) -> Result<FingerprintSet> {
        let spectrogram = self.engine.spectrogram(pcm)?;
        let features = self.engine.features(Some(pcm), Some(&spectrogram))?;

        let set = FingerprintSet {
            spectrogram: self.hasher.hash(&spectrogram.values)?,
            mel: self.hasher.hash(&features.mel)?,
            cepstral: self.hasher.hash(&features.cepstral)?,
            chroma: self.hasher.hash(&features.chroma)?,
        };

        log::debug!(
            "fingerprinted {} frames @ {} Hz: spectrogram={}",
            pcm.frames(),
            pcm.sample_rate(),
            set.spectrogram
        );
        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_is_msb_first() {
        let mut bits = vec![false; 8];
        bits[0] = true;
        bits[7] = true;
        let fp = Fingerprint::from_bits(&bits).unwrap();
        assert_eq!(fp.to_hex(), "81");
        assert!(fp.bit(0));
        assert!(!fp.bit(1));
        assert_eq!(fp.count_ones(), 2);
    }

    #[test]
    fn test_hex_parse() {
        let hex = "f0e1d2c3b4a5968778695a4b3c2d1e0f0123456789abcdeffedcba9876543210";
        let fp: Fingerprint = hex.parse().unwrap();
        assert_eq!(fp.bit_len(), 256);
        assert_eq!(fp.to_string(), hex);
        assert_eq!(Fingerprint::from_hex("ABCD").unwrap().to_hex(), "abcd");
        assert!(Fingerprint::from_hex("").is_err());
        assert!(Fingerprint::from_hex("0g").is_err());
    }

    #[test]
    fn test_hamming_distance() {
        let a = Fingerprint::from_hex("ff00").unwrap();
        let b = Fingerprint::from_hex("0f01").unwrap();
        assert_eq!(a.hamming_distance(&b).unwrap(), 5);
        assert_eq!(b.hamming_distance(&a).unwrap(), 5);
        assert_eq!(a.hamming_distance(&a).unwrap(), 0);
    }

    #[test]
    fn test_hamming_distance_rejects_mismatched_lengths() {
        let long = Fingerprint::from_bits(&[true; 256]).unwrap();
        let short = Fingerprint::from_bits(&[true; 64]).unwrap();
        assert!(matches!(
            long.hamming_distance(&short),
            Err(SpectroHashError::IncompatibleFingerprint(_))
        ));
    }

    #[test]
    fn test_set_record_conversion() {
        let set = FingerprintSet {
            spectrogram: "00ff".parse().unwrap(),
            mel: "0f0f".parse().unwrap(),
            cepstral: "f00f".parse().unwrap(),
            chroma: "ffff".parse().unwrap(),
        };
        let record = CatalogRecord::from(&set);
        assert_eq!(record.spectrohash, "00ff");
        assert_eq!(record.features, vec!["0f0f", "f00f", "ffff"]);
        assert_eq!(FingerprintSet::try_from(&record).unwrap(), set);

        let mut short = record.clone();
        short.features.truncate(2);
        assert!(FingerprintSet::try_from(&short).is_err());
    }

    #[test]
    fn test_set_bit_len_checks_kinds() {
        let mut set = FingerprintSet {
            spectrogram: "00ff".parse().unwrap(),
            mel: "0f0f".parse().unwrap(),
            cepstral: "f00f".parse().unwrap(),
            chroma: "ffff".parse().unwrap(),
        };
        assert_eq!(set.bit_len().unwrap(), 16);
        set.chroma = "ff".parse().unwrap();
        assert!(matches!(
            set.bit_len(),
            Err(SpectroHashError::IncompatibleFingerprint(_))
        ));
    }
}
