//! Deterministic synthetic clips for tests

use crate::pcm::{PcmBuffer, Samples};
use std::f64::consts::PI;

pub(crate) const SAMPLE_RATE: u32 = 8000;
/// Ten seconds at [`SAMPLE_RATE`]
pub(crate) const CLIP_LEN: usize = 80_000;

/// Repeating note sequence with exponentially decaying notes
struct Voice<'a> {
    pitches: &'a [f64],
    note_len: usize,
    decay_s: f64,
    amplitude: f64,
    /// Relative level of the second harmonic
    overtone: f64,
}

impl Voice<'_> {
    fn render(&self, out: &mut [f64]) {
        let sr = SAMPLE_RATE as f64;
        for (i, sample) in out.iter_mut().enumerate() {
            let note = i / self.note_len;
            let freq = self.pitches[note % self.pitches.len()];
            let t_note = (i % self.note_len) as f64 / sr;
            let t = i as f64 / sr;
            let envelope = (-t_note / self.decay_s).exp();
            let wave = (2.0 * PI * freq * t).sin() + self.overtone * (4.0 * PI * freq * t).sin();
            *sample += self.amplitude * envelope * wave;
        }
    }
}

const BASS: Voice<'static> = Voice {
    pitches: &[110.0, 146.83, 130.81, 98.0],
    note_len: 4000,
    decay_s: 0.15,
    amplitude: 0.45,
    overtone: 0.5,
};

fn to_pcm(signal: &[f64], scale: f64) -> PcmBuffer {
    let samples = signal.iter().map(|s| (s * scale) as i16).collect();
    PcmBuffer::new(Samples::I16(samples), 1, SAMPLE_RATE).unwrap()
}

/// Melody on A, B, D, E and G over the shared bass line
pub(crate) fn clip_x() -> PcmBuffer {
    let mut signal = vec![0.0; CLIP_LEN];
    BASS.render(&mut signal);
    Voice {
        pitches: &[880.0, 987.77, 1174.66, 1318.51, 1567.98, 1318.51, 1174.66, 987.77],
        note_len: 2000,
        decay_s: 0.1,
        amplitude: 0.4,
        overtone: 0.0,
    }
    .render(&mut signal);
    to_pcm(&signal, 12_000.0)
}

/// Melody on C, D#, F, G# and A# over the shared bass line
pub(crate) fn clip_y() -> PcmBuffer {
    let mut signal = vec![0.0; CLIP_LEN];
    BASS.render(&mut signal);
    Voice {
        pitches: &[523.25, 622.25, 698.46, 415.3, 466.16],
        note_len: 3000,
        decay_s: 0.2,
        amplitude: 0.4,
        overtone: 0.0,
    }
    .render(&mut signal);
    to_pcm(&signal, 12_000.0)
}

/// `len` values uniform in `[-1, 1)` from a linear congruential generator
pub(crate) fn uniform_noise(len: usize, seed: u64) -> Vec<f64> {
    let mut state = seed;
    (0..len)
        .map(|_| {
            state = state
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            (state >> 11) as f64 / (1u64 << 53) as f64 * 2.0 - 1.0
        })
        .collect()
}

/// Uniform white noise
pub(crate) fn clip_z() -> PcmBuffer {
    to_pcm(&uniform_noise(CLIP_LEN, 0x2545_f491_4f6c_dd1d), 8_000.0)
}

/// Interleave `left` with a silent right channel
pub(crate) fn with_silent_right(left: &PcmBuffer) -> PcmBuffer {
    let samples = match left.samples() {
        Samples::I16(s) => s.iter().flat_map(|&v| [v, 0]).collect(),
        other => panic!("expected i16 samples, got {}", other.type_name()),
    };
    PcmBuffer::new(Samples::I16(samples), 2, left.sample_rate()).unwrap()
}
