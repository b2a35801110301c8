//! Perceptual hash of a real-valued matrix
//!
//! The matrix is treated as a grayscale image: it is resampled to a square of
//! `hash_size * highfreq_factor` pixels with a Lanczos-3 filter, transformed
//! with a 2-D DCT-II, and the `hash_size` x `hash_size` block of lowest
//! frequencies is thresholded against its median. Bits are emitted row by
//! row, vertical frequency first.

use crate::config::{validate_hash_size, EngineConfig};
use crate::error::{Result, SpectroHashError};
use crate::fingerprint::Fingerprint;
use crate::matrix::Matrix;
use std::f64::consts::PI;

/// Lobes of the Lanczos kernel
const LANCZOS_SUPPORT: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PerceptualHasher {
    hash_size: usize,
    highfreq_factor: usize,
}

impl PerceptualHasher {
    pub fn new(hash_size: usize, highfreq_factor: usize) -> Result<Self> {
        validate_hash_size(hash_size)?;
        if highfreq_factor == 0 {
            return Err(SpectroHashError::config("highfreq_factor must be > 0"));
        }
        Ok(Self {
            hash_size,
            highfreq_factor,
        })
    }

    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        Self::new(config.hash_size, config.highfreq_factor)
    }

    pub fn hash_size(&self) -> usize {
        self.hash_size
    }

    /// Bits in every fingerprint this hasher produces
    pub fn bit_len(&self) -> usize {
        self.hash_size * self.hash_size
    }

    pub fn hash(&self, matrix: &Matrix) -> Result<Fingerprint> {
        if matrix.is_empty() {
            return Err(SpectroHashError::invalid("cannot hash an empty matrix"));
        }
        if let Some(((row, col), _)) = matrix.indexed_iter().find(|(_, v)| !v.is_finite()) {
            return Err(SpectroHashError::invalid(format!(
                "matrix value at ({row}, {col}) is not finite"
            )));
        }

        let image_size = self.hash_size * self.highfreq_factor;
        let pixels = resize(matrix, image_size, image_size);
        let low = dct_low_frequencies(&pixels, self.hash_size);

        let coefficients: Vec<f64> = low.iter().copied().collect();
        let threshold = median(&coefficients);
        let bits: Vec<bool> = coefficients.iter().map(|&v| v > threshold).collect();
        Fingerprint::from_bits(&bits)
    }
}

/// Hash with the default oversampling factor of 4
pub fn hash(matrix: &Matrix, hash_size: usize) -> Result<Fingerprint> {
    PerceptualHasher::new(hash_size, 4)?.hash(matrix)
}

fn lanczos(x: f64) -> f64 {
    fn sinc(x: f64) -> f64 {
        if x == 0.0 {
            1.0
        } else {
            let px = PI * x;
            px.sin() / px
        }
    }
    if x.abs() < LANCZOS_SUPPORT {
        sinc(x) * sinc(x / LANCZOS_SUPPORT)
    } else {
        0.0
    }
}

/// Per output pixel: first contributing input pixel and normalised weights
///
/// When shrinking, the kernel is stretched by the scale factor so every
/// input pixel contributes (antialiasing).
fn resample_coefficients(in_size: usize, out_size: usize) -> Vec<(usize, Vec<f64>)> {
    let scale = in_size as f64 / out_size as f64;
    let filter_scale = scale.max(1.0);
    let support = LANCZOS_SUPPORT * filter_scale;

    (0..out_size)
        .map(|out| {
            let center = (out as f64 + 0.5) * scale;
            let start = ((center - support + 0.5) as isize).max(0) as usize;
            let end = ((center + support + 0.5) as isize).clamp(0, in_size as isize) as usize;

            let mut weights: Vec<f64> = (start..end)
                .map(|x| lanczos((x as f64 - center + 0.5) / filter_scale))
                .collect();
            let total: f64 = weights.iter().sum();
            if total != 0.0 {
                weights.iter_mut().for_each(|w| *w /= total);
            }
            (start, weights)
        })
        .collect()
}

/// Separable resize: horizontal pass, then vertical pass
fn resize(input: &Matrix, out_rows: usize, out_cols: usize) -> Matrix {
    let horizontal = resample_coefficients(input.ncols(), out_cols);
    let mut wide = Matrix::zeros((input.nrows(), out_cols));
    for row in 0..input.nrows() {
        let source = input.row(row);
        for (col, (start, weights)) in horizontal.iter().enumerate() {
            let value = weights
                .iter()
                .enumerate()
                .map(|(i, w)| source[start + i] * w)
                .sum();
            wide[[row, col]] = value;
        }
    }

    let vertical = resample_coefficients(input.nrows(), out_rows);
    let mut out = Matrix::zeros((out_rows, out_cols));
    for (row, (start, weights)) in vertical.iter().enumerate() {
        for col in 0..out_cols {
            let value = weights
                .iter()
                .enumerate()
                .map(|(i, w)| wide[[start + i, col]] * w)
                .sum();
            out[[row, col]] = value;
        }
    }
    out
}

/// Unnormalised DCT-II basis, `2·cos(πk(2n+1)/2N)`, first `n_coeffs` rows
fn dct_basis(n: usize, n_coeffs: usize) -> Matrix {
    Matrix::from_shape_fn((n_coeffs, n), |(k, i)| {
        let angle = PI * k as f64 * (2 * i + 1) as f64 / (2 * n) as f64;
        2.0 * angle.cos()
    })
}

/// Top-left `n` x `n` block of the 2-D DCT-II of a square image
///
/// Columns are transformed first, then rows.
fn dct_low_frequencies(pixels: &Matrix, n: usize) -> Matrix {
    let basis = dct_basis(pixels.nrows(), n);
    // n x size: vertical frequencies of every column, then horizontal
    basis.dot(pixels).dot(&basis.t())
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::{clip_x, uniform_noise};
    use crate::transform::TransformEngine;
    use approx::assert_relative_eq;

    fn ripple(rows: usize, cols: usize) -> Matrix {
        Matrix::from_shape_fn((rows, cols), |(r, c)| {
            (r as f64 * 0.37).sin() * 3.0 + (c as f64 * 0.11).cos() * 5.0 + (r * c % 7) as f64
        })
    }

    #[test]
    fn test_hash_length_follows_hash_size() {
        let matrix = ripple(129, 300);
        assert_eq!(hash(&matrix, 16).unwrap().bit_len(), 256);
        assert_eq!(hash(&matrix, 8).unwrap().bit_len(), 64);
        assert_eq!(hash(&matrix, 16).unwrap().to_hex().len(), 64);
    }

    #[test]
    fn test_rejects_bad_input() {
        let hasher = PerceptualHasher::new(16, 4).unwrap();
        assert!(matches!(
            hasher.hash(&Matrix::zeros((0, 0))),
            Err(SpectroHashError::InvalidInput(_))
        ));

        let mut matrix = ripple(20, 20);
        matrix[[3, 4]] = f64::NAN;
        assert!(matches!(hasher.hash(&matrix), Err(SpectroHashError::InvalidInput(_))));
        matrix[[3, 4]] = f64::INFINITY;
        assert!(matches!(hasher.hash(&matrix), Err(SpectroHashError::InvalidInput(_))));

        assert!(matches!(
            PerceptualHasher::new(7, 4),
            Err(SpectroHashError::Configuration(_))
        ));
        assert!(PerceptualHasher::new(16, 0).is_err());
    }

    #[test]
    fn test_hash_is_deterministic_and_scale_invariant() {
        let matrix = ripple(128, 400);
        let first = hash(&matrix, 16).unwrap();
        assert_eq!(hash(&matrix, 16).unwrap(), first);

        // doubling is exact in floating point, so every comparison is unchanged
        let doubled = &matrix * 2.0;
        assert_eq!(hash(&doubled, 16).unwrap(), first);
    }

    #[test]
    fn test_hash_tolerates_small_amplitude_noise() {
        let engine = TransformEngine::new(&EngineConfig::default());
        let spectrogram = engine.spectrogram(&clip_x()).unwrap().values;
        let clean = hash(&spectrogram, 16).unwrap();

        // every cell scaled by a factor in [0.99, 1.01)
        let noise = uniform_noise(spectrogram.len(), 0x9e37_79b9_7f4a_7c15);
        let factors = Matrix::from_shape_vec(spectrogram.dim(), noise)
            .unwrap()
            .mapv(|n| 1.0 + 0.01 * n);
        let noisy = hash(&(&spectrogram * &factors), 16).unwrap();

        let distance = clean.hamming_distance(&noisy).unwrap();
        assert!(distance <= 8, "1% noise flipped {distance} of 256 bits");
    }

    #[test]
    fn test_small_matrices_are_upsampled() {
        // chroma-shaped input: fewer rows than the hash image
        let matrix = ripple(12, 40);
        let fp = hash(&matrix, 16).unwrap();
        assert_eq!(fp.bit_len(), 256);
        assert!(fp.count_ones() > 0);
    }

    #[test]
    fn test_resample_weights_are_normalised() {
        for (in_size, out_size) in [(300, 64), (12, 64), (64, 64), (5, 3)] {
            let coefficients = resample_coefficients(in_size, out_size);
            assert_eq!(coefficients.len(), out_size);
            for (start, weights) in coefficients {
                assert!(start + weights.len() <= in_size);
                assert_relative_eq!(weights.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_resize_keeps_constant_image() {
        let constant = Matrix::from_elem((10, 30), 2.5);
        let resized = resize(&constant, 64, 64);
        for v in resized.iter() {
            assert_relative_eq!(*v, 2.5, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_dct_of_constant_is_dc_only() {
        let pixels = Matrix::from_elem((8, 8), 1.0);
        let low = dct_low_frequencies(&pixels, 4);
        // 2·8 per axis
        assert_relative_eq!(low[[0, 0]], 256.0, epsilon = 1e-9);
        for k in 0..4 {
            for l in 0..4 {
                if (k, l) != (0, 0) {
                    assert!(low[[k, l]].abs() < 1e-9);
                }
            }
        }
    }

    #[test]
    fn test_median() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), 2.5);
    }
}
