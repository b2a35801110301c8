//! Weighted blend of two clips

use crate::error::{Result, SpectroHashError};
use crate::pcm::{PcmBuffer, Samples};

/// `weight·a[i] + (1 − weight)·b[i]` for every sample
///
/// Both buffers must agree in length, sample rate, channel count and sample
/// type. Integer results are cast back with `as`, truncating toward zero.
pub fn mix(a: &PcmBuffer, b: &PcmBuffer, weight: f64) -> Result<PcmBuffer> {
    if !(0.0..=1.0).contains(&weight) {
        return Err(SpectroHashError::invalid(format!(
            "mix weight must be in [0, 1], got {weight}"
        )));
    }
    if a.sample_rate() != b.sample_rate() {
        return Err(SpectroHashError::invalid(format!(
            "cannot mix {} Hz with {} Hz",
            a.sample_rate(),
            b.sample_rate()
        )));
    }
    if a.channels() != b.channels() {
        return Err(SpectroHashError::invalid(format!(
            "cannot mix {} channels with {} channels",
            a.channels(),
            b.channels()
        )));
    }
    if a.samples().len() != b.samples().len() {
        return Err(SpectroHashError::invalid(format!(
            "cannot mix buffers of {} and {} samples",
            a.samples().len(),
            b.samples().len()
        )));
    }

    let rest = 1.0 - weight;
    let samples = match (a.samples(), b.samples()) {
        (Samples::I16(x), Samples::I16(y)) => Samples::I16(
            x.iter()
                .zip(y)
                .map(|(&p, &q)| (weight * p as f64 + rest * q as f64) as i16)
                .collect(),
        ),
        (Samples::I32(x), Samples::I32(y)) => Samples::I32(
            x.iter()
                .zip(y)
                .map(|(&p, &q)| (weight * p as f64 + rest * q as f64) as i32)
                .collect(),
        ),
        (Samples::F32(x), Samples::F32(y)) => Samples::F32(
            x.iter()
                .zip(y)
                .map(|(&p, &q)| (weight * p as f64 + rest * q as f64) as f32)
                .collect(),
        ),
        (x, y) => {
            return Err(SpectroHashError::invalid(format!(
                "cannot mix {} samples with {} samples",
                x.type_name(),
                y.type_name()
            )))
        }
    };

    log::debug!(
        "mixed {} frames @ {} Hz with weight {:.2}",
        a.frames(),
        a.sample_rate(),
        weight
    );
    PcmBuffer::new(samples, a.channels(), a.sample_rate())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mono(samples: Vec<i16>) -> PcmBuffer {
        PcmBuffer::mono_i16(samples, 8000).unwrap()
    }

    #[test]
    fn test_mix_blends_and_truncates() {
        let a = mono(vec![100, -100, 7, 0]);
        let b = mono(vec![0, 100, 0, 3]);
        let mixed = mix(&a, &b, 0.5).unwrap();
        // 3.5 -> 3 and 1.5 -> 1: truncation toward zero
        assert_eq!(mixed.samples(), &Samples::I16(vec![50, 0, 3, 1]));
    }

    #[test]
    fn test_mix_endpoints_reproduce_inputs() {
        let a = mono(vec![i16::MAX, i16::MIN, 12345, -1]);
        let b = mono(vec![1, 2, 3, 4]);
        assert_eq!(mix(&a, &b, 1.0).unwrap(), a);
        assert_eq!(mix(&a, &b, 0.0).unwrap(), b);
        assert_eq!(mix(&a, &a, 0.5).unwrap(), a);
    }

    #[test]
    fn test_mix_keeps_sample_type() {
        let a = PcmBuffer::new(Samples::F32(vec![1.0, 0.5]), 2, 44100).unwrap();
        let b = PcmBuffer::new(Samples::F32(vec![0.0, -0.5]), 2, 44100).unwrap();
        let mixed = mix(&a, &b, 0.25).unwrap();
        assert_eq!(mixed.channels(), 2);
        assert_eq!(mixed.samples(), &Samples::F32(vec![0.25, -0.25]));

        let c = PcmBuffer::new(Samples::I32(vec![1 << 20, -(1 << 20)]), 1, 44100).unwrap();
        let d = PcmBuffer::new(Samples::I32(vec![0, 0]), 1, 44100).unwrap();
        assert_eq!(mix(&c, &d, 0.5).unwrap().samples(), &Samples::I32(vec![1 << 19, -(1 << 19)]));
    }

    #[test]
    fn test_mix_rejects_mismatches() {
        let a = mono(vec![1, 2, 3, 4]);
        let short = mono(vec![1, 2, 3]);
        let other_rate = PcmBuffer::mono_i16(vec![1, 2, 3, 4], 16000).unwrap();
        let stereo = PcmBuffer::new(Samples::I16(vec![1, 2, 3, 4]), 2, 8000).unwrap();
        let float = PcmBuffer::new(Samples::F32(vec![1.0, 2.0, 3.0, 4.0]), 1, 8000).unwrap();

        for other in [&short, &other_rate, &stereo, &float] {
            assert!(matches!(mix(&a, other, 0.5), Err(SpectroHashError::InvalidInput(_))));
        }
        for weight in [-0.1, 1.5, f64::NAN] {
            assert!(matches!(mix(&a, &a, weight), Err(SpectroHashError::InvalidInput(_))));
        }
    }
}
