//! Mel-frequency cepstral coefficients

use super::{mel, plan_forward, power_spectrum};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::matrix::{self, Matrix};
use std::f64::consts::PI;

/// Power floor before log compression
const AMIN: f64 = 1e-10;

/// Cepstral coefficients of a mono waveform: `cepstral_coefficients` rows by frames
///
/// Frames are centred: the signal is zero padded by half an FFT on both
/// sides. Mel power is log compressed to decibels, clipped to `top_db` below
/// the loudest value and decorrelated with an orthonormal DCT-II.
pub(crate) fn coefficients(samples: &[f64], sample_rate: u32, config: &EngineConfig) -> Result<Matrix> {
    let n_fft = config.cepstral_fft_size;
    let hop = config.cepstral_hop;
    let pad = n_fft / 2;

    let mut padded = vec![0.0; pad];
    padded.extend_from_slice(samples);
    padded.resize(padded.len() + pad, 0.0);

    let num_frames = 1 + padded.len().saturating_sub(n_fft) / hop;
    let window = config.window.coefficients(n_fft);
    let fft = plan_forward(n_fft);

    let mut columns = Vec::with_capacity(num_frames);
    for frame_idx in 0..num_frames {
        let start = frame_idx * hop;
        let mut frame = padded[start..(start + n_fft).min(padded.len())].to_vec();
        frame.resize(n_fft, 0.0);
        columns.push(power_spectrum(&frame, &window, fft.as_ref()));
    }
    let power = matrix::from_columns(&columns)?;

    let filterbank = mel::filterbank(sample_rate, n_fft, config.mel_bands)?;
    let mel_power = matrix::checked_dot(&filterbank, &power)?;
    let log_mel = power_to_db(&mel_power, config.cepstral_top_db);

    Ok(dct_ortho_rows(&log_mel, config.cepstral_coefficients))
}

/// `10·log10(max(x, AMIN))`, clipped to `top_db` below the maximum
fn power_to_db(power: &Matrix, top_db: f64) -> Matrix {
    let mut db = power.mapv(|p| 10.0 * p.max(AMIN).log10());
    let floor = db.fold(f64::NEG_INFINITY, |acc, &v| acc.max(v)) - top_db;
    db.mapv_inplace(|v| v.max(floor));
    db
}

/// Orthonormal DCT-II along each column, first `n_coeffs` outputs
fn dct_ortho_rows(input: &Matrix, n_coeffs: usize) -> Matrix {
    let n = input.nrows();
    let basis = Matrix::from_shape_fn((n_coeffs, n), |(k, i)| {
        let scale = if k == 0 {
            (1.0 / n as f64).sqrt()
        } else {
            (2.0 / n as f64).sqrt()
        };
        scale * (PI * k as f64 * (2 * i + 1) as f64 / (2 * n) as f64).cos()
    });
    basis.dot(input)
}
