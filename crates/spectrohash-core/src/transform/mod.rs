//! Time-frequency transforms
//!
//! Produces the power spectrogram of a clip and three matrices derived from
//! it: mel-band energy, cepstral coefficients and chroma energy. Every call
//! returns fresh values; the engine carries no state between clips.

mod cepstral;
mod chroma;
mod mel;
pub mod window;

pub use window::WindowType;

use crate::config::EngineConfig;
use crate::error::{Result, SpectroHashError};
use crate::matrix::{self, Matrix};
use crate::pcm::PcmBuffer;
use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

/// Power spectral density indexed by (frequency bin, time frame)
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrogram {
    /// Bin centre frequencies in Hz, ascending
    pub frequencies: Vec<f64>,
    /// Segment centre times in seconds, ascending
    pub times: Vec<f64>,
    /// `frequencies.len()` rows by `times.len()` columns
    pub values: Matrix,
    pub sample_rate: u32,
    /// FFT length the bins were computed with
    pub n_fft: usize,
}

/// The three feature planes derived from one clip
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrices {
    /// Mel bands by frames
    pub mel: Matrix,
    /// Cepstral order by frames
    pub cepstral: Matrix,
    /// Pitch classes (C first) by frames, each frame scaled to a maximum of 1
    pub chroma: Matrix,
}

/// Transform engine
pub struct TransformEngine {
    config: EngineConfig,
}

impl TransformEngine {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Spectrogram of the first channel of `pcm`
    pub fn spectrogram(&self, pcm: &PcmBuffer) -> Result<Spectrogram> {
        self.spectrogram_from_samples(&pcm.first_channel(), pcm.sample_rate())
    }

    /// Spectrogram of mono samples
    ///
    /// Segments of `segment_length` samples (shortened to the signal when it
    /// is shorter) overlap by `segment_overlap`; each segment has its mean
    /// removed before windowing.
    pub fn spectrogram_from_samples(&self, samples: &[f64], sample_rate: u32) -> Result<Spectrogram> {
        if samples.is_empty() {
            return Err(SpectroHashError::invalid("cannot transform an empty buffer"));
        }
        if sample_rate == 0 {
            return Err(SpectroHashError::invalid("sample rate must be > 0"));
        }

        let n_fft = self.config.segment_length.min(samples.len());
        let overlap = if n_fft < self.config.segment_length {
            n_fft / 8
        } else {
            self.config.overlap()
        };
        let hop = n_fft - overlap;
        let num_frames = (samples.len() - n_fft) / hop + 1;

        let window = self.config.window.coefficients(n_fft);
        let window_power: f64 = window.iter().map(|w| w * w).sum();
        let fs = sample_rate as f64;
        let scale = 1.0 / (fs * window_power);

        let fft = plan_forward(n_fft);
        let num_bins = n_fft / 2 + 1;
        let mut columns = Vec::with_capacity(num_frames);

        for frame_idx in 0..num_frames {
            let start = frame_idx * hop;
            let segment = &samples[start..start + n_fft];
            let mean = segment.iter().sum::<f64>() / n_fft as f64;
            let detrended: Vec<f64> = segment.iter().map(|s| s - mean).collect();

            let mut column: Vec<f64> = power_spectrum(&detrended, &window, fft.as_ref())
                .into_iter()
                .map(|p| p * scale)
                .collect();

            // one-sided density: fold the negative frequencies onto the positive ones
            let last_doubled = if n_fft % 2 == 0 { num_bins - 1 } else { num_bins };
            for value in &mut column[1..last_doubled] {
                *value *= 2.0;
            }
            columns.push(column);
        }

        let frequencies = (0..num_bins).map(|k| k as f64 * fs / n_fft as f64).collect();
        let times = (0..num_frames)
            .map(|j| (n_fft as f64 / 2.0 + (j * hop) as f64) / fs)
            .collect();

        log::trace!(
            "spectrogram: {} bins x {} frames (n_fft={}, hop={})",
            num_bins,
            num_frames,
            n_fft,
            hop
        );

        Ok(Spectrogram {
            frequencies,
            times,
            values: matrix::from_columns(&columns)?,
            sample_rate,
            n_fft,
        })
    }

    /// Mel, cepstral and chroma matrices
    ///
    /// Mel and chroma come from `spectrogram` when given, otherwise from a
    /// spectrogram computed here. Cepstral coefficients are always computed
    /// from the waveform, so `pcm` is required.
    pub fn features(
        &self,
        pcm: Option<&PcmBuffer>,
        spectrogram: Option<&Spectrogram>,
    ) -> Result<FeatureMatrices> {
        let pcm = match (pcm, spectrogram) {
            (None, None) => {
                return Err(SpectroHashError::invalid(
                    "features need a PCM buffer or a spectrogram",
                ))
            }
            (None, Some(_)) => {
                return Err(SpectroHashError::invalid(
                    "cepstral coefficients require the PCM buffer",
                ))
            }
            (Some(pcm), _) => pcm,
        };

        let computed;
        let spectrogram = match spectrogram {
            Some(spectrogram) => {
                if spectrogram.sample_rate != pcm.sample_rate() {
                    return Err(SpectroHashError::invalid(format!(
                        "spectrogram sample rate {} does not match PCM sample rate {}",
                        spectrogram.sample_rate,
                        pcm.sample_rate()
                    )));
                }
                spectrogram
            }
            None => {
                computed = self.spectrogram(pcm)?;
                &computed
            }
        };

        Ok(FeatureMatrices {
            mel: self.mel(spectrogram)?,
            cepstral: self.cepstral(pcm)?,
            chroma: self.chroma(spectrogram)?,
        })
    }

    /// Mel-band energy of a spectrogram
    pub fn mel(&self, spectrogram: &Spectrogram) -> Result<Matrix> {
        let filterbank = mel::filterbank(
            spectrogram.sample_rate,
            spectrogram.n_fft,
            self.config.mel_bands,
        )?;
        matrix::checked_dot(&filterbank, &spectrogram.values)
    }

    /// Cepstral coefficients of the first channel of `pcm`
    pub fn cepstral(&self, pcm: &PcmBuffer) -> Result<Matrix> {
        if pcm.is_empty() {
            return Err(SpectroHashError::invalid("cannot transform an empty buffer"));
        }
        cepstral::coefficients(&pcm.first_channel(), pcm.sample_rate(), &self.config)
    }

    /// Chroma energy of a spectrogram
    pub fn chroma(&self, spectrogram: &Spectrogram) -> Result<Matrix> {
        let filterbank = chroma::filterbank(spectrogram.sample_rate, spectrogram.n_fft)?;
        let mut raw = matrix::checked_dot(&filterbank, &spectrogram.values)?;
        chroma::normalize_frames(&mut raw);
        Ok(raw)
    }
}

fn plan_forward(n_fft: usize) -> Arc<dyn Fft<f64>> {
    let mut planner = FftPlanner::new();
    planner.plan_fft_forward(n_fft)
}

/// `|X[k]|²` for `k` in `0..=n/2` of the windowed frame
fn power_spectrum(frame: &[f64], window: &[f64], fft: &dyn Fft<f64>) -> Vec<f64> {
    let mut buffer: Vec<Complex<f64>> = frame
        .iter()
        .zip(window)
        .map(|(&s, &w)| Complex::new(s * w, 0.0))
        .collect();
    fft.process(&mut buffer);
    buffer[..frame.len() / 2 + 1]
        .iter()
        .map(|c| c.norm_sqr())
        .collect()
}
