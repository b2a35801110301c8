//! PCM sample buffers
//!
//! Samples keep the type they were decoded with so that mixing can cast back
//! to it. Multi-channel buffers are interleaved.

use crate::error::{Result, SpectroHashError};

/// Sample storage in its native type
#[derive(Debug, Clone, PartialEq)]
pub enum Samples {
    I16(Vec<i16>),
    I32(Vec<i32>),
    F32(Vec<f32>),
}

impl Samples {
    pub fn len(&self) -> usize {
        match self {
            Samples::I16(s) => s.len(),
            Samples::I32(s) => s.len(),
            Samples::F32(s) => s.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Name of the sample type
    pub fn type_name(&self) -> &'static str {
        match self {
            Samples::I16(_) => "i16",
            Samples::I32(_) => "i32",
            Samples::F32(_) => "f32",
        }
    }

    fn value(&self, index: usize) -> f64 {
        match self {
            Samples::I16(s) => s[index] as f64,
            Samples::I32(s) => s[index] as f64,
            Samples::F32(s) => s[index] as f64,
        }
    }

    fn truncate(&mut self, len: usize) {
        match self {
            Samples::I16(s) => s.truncate(len),
            Samples::I32(s) => s.truncate(len),
            Samples::F32(s) => s.truncate(len),
        }
    }
}

/// Decoded audio: samples, channel count and sample rate
#[derive(Debug, Clone, PartialEq)]
pub struct PcmBuffer {
    samples: Samples,
    channels: u16,
    sample_rate: u32,
}

impl PcmBuffer {
    /// Create a buffer; `samples.len()` must be a multiple of `channels`
    pub fn new(samples: Samples, channels: u16, sample_rate: u32) -> Result<Self> {
        if channels == 0 {
            return Err(SpectroHashError::invalid("channel count must be > 0"));
        }
        if sample_rate == 0 {
            return Err(SpectroHashError::invalid("sample rate must be > 0"));
        }
        if samples.len() % channels as usize != 0 {
            return Err(SpectroHashError::invalid(format!(
                "{} samples do not divide into {} channels",
                samples.len(),
                channels
            )));
        }
        Ok(Self {
            samples,
            channels,
            sample_rate,
        })
    }

    pub fn mono_i16(samples: Vec<i16>, sample_rate: u32) -> Result<Self> {
        Self::new(Samples::I16(samples), 1, sample_rate)
    }

    pub fn samples(&self) -> &Samples {
        &self.samples
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of frames (samples per channel)
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration_ms(&self) -> u64 {
        self.frames() as u64 * 1000 / self.sample_rate as u64
    }

    /// Channel 0 as `f64`
    ///
    /// This is the only multi-channel to mono reduction in the crate: every
    /// channel except the first is discarded.
    pub fn first_channel(&self) -> Vec<f64> {
        let step = self.channels as usize;
        (0..self.frames())
            .map(|frame| self.samples.value(frame * step))
            .collect()
    }

    /// Keep at most the first `max_duration_ms` of audio
    pub fn truncate_ms(&mut self, max_duration_ms: u64) {
        let frames = (self.sample_rate as u64).saturating_mul(max_duration_ms) / 1000;
        self.truncate_frames(usize::try_from(frames).unwrap_or(usize::MAX));
    }

    /// Keep at most the first `max_frames` frames
    pub fn truncate_frames(&mut self, max_frames: usize) {
        if max_frames < self.frames() {
            self.samples.truncate(max_frames * self.channels as usize);
        }
    }

}
