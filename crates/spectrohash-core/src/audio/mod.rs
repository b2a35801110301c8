//! Audio loading
//!
//! Decodes WAV, MP3, FLAC and OGG Vorbis with pure Rust decoders. Samples
//! keep the type they were stored with; nothing is resampled or downmixed.

mod decoder;

use crate::error::{Result, SpectroHashError};
use crate::pcm::PcmBuffer;
use std::path::Path;

/// Supported audio formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Wav,
    Mp3,
    Flac,
    Ogg,
    Unknown,
}

impl AudioFormat {
    /// Detect format from file extension (case-insensitive)
    pub fn from_path(path: &Path) -> Self {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match extension.as_deref() {
            Some("wav") | Some("wave") => AudioFormat::Wav,
            Some("mp3") => AudioFormat::Mp3,
            Some("flac") => AudioFormat::Flac,
            Some("ogg") => AudioFormat::Ogg,
            _ => AudioFormat::Unknown,
        }
    }

    pub fn is_supported(&self) -> bool {
        *self != AudioFormat::Unknown
    }
}

/// Decode `path`, keeping at most the first `max_duration_ms` of audio
pub fn load(path: impl AsRef<Path>, max_duration_ms: Option<u64>) -> Result<PcmBuffer> {
    let path = path.as_ref();
    let mut pcm = decoder::decode(path).map_err(|e| SpectroHashError::Load {
        path: path.to_path_buf(),
        message: format!("{e:#}"),
    })?;

    if let Some(max_duration_ms) = max_duration_ms {
        pcm.truncate_ms(max_duration_ms);
    }

    log::debug!(
        "loaded {}: {} frames, {} channel(s) @ {} Hz ({})",
        path.display(),
        pcm.frames(),
        pcm.channels(),
        pcm.sample_rate(),
        pcm.samples().type_name()
    );
    Ok(pcm)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pcm::Samples;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("spectrohash-audio-{}-{name}", std::process::id()))
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(AudioFormat::from_path(Path::new("a/b.WAV")), AudioFormat::Wav);
        assert_eq!(AudioFormat::from_path(Path::new("x.mp3")), AudioFormat::Mp3);
        assert_eq!(AudioFormat::from_path(Path::new("x.flac")), AudioFormat::Flac);
        assert_eq!(AudioFormat::from_path(Path::new("x.ogg")), AudioFormat::Ogg);
        assert_eq!(AudioFormat::from_path(Path::new("x.mp4")), AudioFormat::Unknown);
        assert!(!AudioFormat::from_path(Path::new("noext")).is_supported());
    }

    #[test]
    fn test_load_wav_keeps_samples_and_truncates() {
        let path = temp_path("stereo.wav");
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 1000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for i in 0..2000i16 {
            writer.write_sample(i).unwrap();
        }
        writer.finalize().unwrap();

        let full = load(&path, None).unwrap();
        assert_eq!(full.channels(), 2);
        assert_eq!(full.sample_rate(), 1000);
        assert_eq!(full.frames(), 1000);
        assert_eq!(full.first_channel()[..3], [0.0, 2.0, 4.0]);

        let short = load(&path, Some(100)).unwrap();
        assert_eq!(short.frames(), 100);
        match short.samples() {
            Samples::I16(samples) => assert_eq!(samples.len(), 200),
            other => panic!("unexpected sample type {}", other.type_name()),
        }
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_load_errors() {
        let missing = load(temp_path("missing.wav"), None).unwrap_err();
        assert!(matches!(missing, SpectroHashError::Load { .. }));

        let unsupported = temp_path("clip.xyz");
        std::fs::write(&unsupported, b"not audio").unwrap();
        assert!(matches!(
            load(&unsupported, None),
            Err(SpectroHashError::Load { .. })
        ));
        std::fs::remove_file(&unsupported).ok();
    }
}
