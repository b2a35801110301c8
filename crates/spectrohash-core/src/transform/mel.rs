//! Mel filter bank (Slaney scale and area normalisation)

use crate::error::{Result, SpectroHashError};
use crate::matrix::Matrix;

const F_SP: f64 = 200.0 / 3.0;
const MIN_LOG_HZ: f64 = 1000.0;
const MIN_LOG_MEL: f64 = MIN_LOG_HZ / F_SP;

fn log_step() -> f64 {
    6.4f64.ln() / 27.0
}

/// Hz to mel: linear below 1 kHz, logarithmic above
pub(crate) fn hz_to_mel(hz: f64) -> f64 {
    if hz >= MIN_LOG_HZ {
        MIN_LOG_MEL + (hz / MIN_LOG_HZ).ln() / log_step()
    } else {
        hz / F_SP
    }
}

pub(crate) fn mel_to_hz(mel: f64) -> f64 {
    if mel >= MIN_LOG_MEL {
        MIN_LOG_HZ * (log_step() * (mel - MIN_LOG_MEL)).exp()
    } else {
        F_SP * mel
    }
}

/// Centre frequencies of the one-sided FFT bins
pub(crate) fn fft_frequencies(sample_rate: u32, n_fft: usize) -> Vec<f64> {
    (0..n_fft / 2 + 1)
        .map(|k| k as f64 * sample_rate as f64 / n_fft as f64)
        .collect()
}

/// Triangular filters from 0 Hz to Nyquist: `n_mels` rows by `n_fft / 2 + 1` columns
pub(crate) fn filterbank(sample_rate: u32, n_fft: usize, n_mels: usize) -> Result<Matrix> {
    if n_fft < 2 {
        return Err(SpectroHashError::invalid(format!(
            "mel filter bank needs an FFT length >= 2, got {n_fft}"
        )));
    }
    let fft_freqs = fft_frequencies(sample_rate, n_fft);
    let max_mel = hz_to_mel(sample_rate as f64 / 2.0);
    let mel_f: Vec<f64> = (0..n_mels + 2)
        .map(|i| mel_to_hz(max_mel * i as f64 / (n_mels + 1) as f64))
        .collect();

    let mut weights = Matrix::zeros((n_mels, fft_freqs.len()));
    for i in 0..n_mels {
        let lower_width = mel_f[i + 1] - mel_f[i];
        let upper_width = mel_f[i + 2] - mel_f[i + 1];
        let enorm = 2.0 / (mel_f[i + 2] - mel_f[i]);
        for (k, &freq) in fft_freqs.iter().enumerate() {
            let lower = (freq - mel_f[i]) / lower_width;
            let upper = (mel_f[i + 2] - freq) / upper_width;
            let weight = lower.min(upper).max(0.0);
            if weight > 0.0 {
                weights[[i, k]] = weight * enorm;
            }
        }
    }

    Ok(weights)
}
