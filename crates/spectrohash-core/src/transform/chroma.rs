//! Chroma filter bank: spectral energy folded onto 12 pitch classes

use crate::error::{Result, SpectroHashError};
use crate::matrix::Matrix;
use ndarray::Axis;

pub(crate) const CHROMA_BINS: usize = 12;

/// Centre octave of the octave-weighting Gaussian
const CENTER_OCTAVE: f64 = 5.0;
/// Width of the octave-weighting Gaussian, in octaves
const OCTAVE_WIDTH: f64 = 2.0;

/// Octaves above A0/16, i.e. `log2(hz / 27.5)`, with zero tuning deviation
fn hz_to_octs(hz: f64) -> f64 {
    (hz / (440.0 / 16.0)).log2()
}

/// `CHROMA_BINS` rows (C first) by `n_fft / 2 + 1` columns
///
/// Each FFT bin spreads its energy over neighbouring pitch classes with a
/// Gaussian whose width follows the bin spacing in semitones. Columns are
/// unit L2 norm before the octave weighting is applied.
pub(crate) fn filterbank(sample_rate: u32, n_fft: usize) -> Result<Matrix> {
    if n_fft < 2 {
        return Err(SpectroHashError::invalid(format!(
            "chroma filter bank needs an FFT length >= 2, got {n_fft}"
        )));
    }
    let n_chroma = CHROMA_BINS as f64;

    // bin 0 (DC) has no pitch: place it 1.5 octaves below bin 1
    let mut frqbins: Vec<f64> = (1..n_fft)
        .map(|k| n_chroma * hz_to_octs(k as f64 * sample_rate as f64 / n_fft as f64))
        .collect();
    frqbins.insert(0, frqbins[0] - 1.5 * n_chroma);

    let mut binwidths: Vec<f64> = frqbins
        .windows(2)
        .map(|pair| (pair[1] - pair[0]).max(1.0))
        .collect();
    binwidths.push(1.0);

    let half = (CHROMA_BINS / 2) as f64;
    let mut weights = vec![vec![0.0; n_fft]; CHROMA_BINS];
    for (j, (&bin, &width)) in frqbins.iter().zip(&binwidths).enumerate() {
        for (c, row) in weights.iter_mut().enumerate() {
            let distance = (bin - c as f64 + half + 10.0 * n_chroma).rem_euclid(n_chroma) - half;
            row[j] = (-0.5 * (2.0 * distance / width).powi(2)).exp();
        }

        let norm = weights.iter().map(|row| row[j] * row[j]).sum::<f64>().sqrt();
        let octave_weight = (-0.5 * ((bin / n_chroma - CENTER_OCTAVE) / OCTAVE_WIDTH).powi(2)).exp();
        for row in weights.iter_mut() {
            if norm > f64::MIN_POSITIVE {
                row[j] /= norm;
            }
            row[j] *= octave_weight;
        }
    }

    // rows start at A; rotate so that row 0 is C
    weights.rotate_left(3);

    let num_bins = n_fft / 2 + 1;
    Ok(Matrix::from_shape_fn((CHROMA_BINS, num_bins), |(c, j)| {
        weights[c][j]
    }))
}

/// Scale every frame so its largest pitch class is 1
///
/// Frames whose maximum is below the smallest positive `f64` are left as they are.
pub(crate) fn normalize_frames(chroma: &mut Matrix) {
    for mut frame in chroma.axis_iter_mut(Axis(1)) {
        let peak = frame.fold(0.0f64, |acc, v| acc.max(v.abs()));
        if peak < f64::MIN_POSITIVE {
            continue;
        }
        frame.mapv_inplace(|v| v / peak);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn strongest_class(fb: &Matrix, bin: usize) -> usize {
        (0..fb.nrows())
            .max_by(|&a, &b| fb[[a, bin]].total_cmp(&fb[[b, bin]]))
            .unwrap()
    }

    #[test]
    fn test_filterbank_maps_pitches_to_classes() {
        let fb = filterbank(22050, 4096).unwrap();
        assert_eq!(fb.dim(), (12, 2049));

        let bin_for = |hz: f64| (hz * 4096.0 / 22050.0).round() as usize;
        // A4 = 440 Hz -> class 9, C5 = 523.25 Hz -> class 0, E5 = 659.26 Hz -> class 4
        assert_eq!(strongest_class(&fb, bin_for(440.0)), 9);
        assert_eq!(strongest_class(&fb, bin_for(523.25)), 0);
        assert_eq!(strongest_class(&fb, bin_for(659.26)), 4);
    }

    #[test]
    fn test_normalize_frames() {
        let mut chroma = array![[1.0, 0.0], [4.0, 0.0], [2.0, 0.0]];
        normalize_frames(&mut chroma);
        assert_eq!(chroma, array![[0.25, 0.0], [1.0, 0.0], [0.5, 0.0]]);
    }
}
