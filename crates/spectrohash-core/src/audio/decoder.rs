//! Decoders for each supported format

use super::AudioFormat;
use crate::pcm::{PcmBuffer, Samples};
use anyhow::{Context, Result};
use std::path::Path;

/// Decode a file in its native sample type
pub(super) fn decode(path: &Path) -> Result<PcmBuffer> {
    if !path.exists() {
        anyhow::bail!("Audio file not found: {}", path.display());
    }

    match AudioFormat::from_path(path) {
        AudioFormat::Wav => decode_wav(path),
        AudioFormat::Mp3 => decode_mp3(path),
        AudioFormat::Flac => decode_flac(path),
        AudioFormat::Ogg => decode_ogg(path),
        AudioFormat::Unknown => anyhow::bail!("Unsupported audio format: {}", path.display()),
    }
}

/// Decode WAV file: 16-bit and narrower as `I16`, wider integers as `I32`
fn decode_wav(path: &Path) -> Result<PcmBuffer> {
    let mut reader = hound::WavReader::open(path)
        .with_context(|| format!("Failed to open WAV file: {}", path.display()))?;

    let spec = reader.spec();
    let samples = match spec.sample_format {
        hound::SampleFormat::Float => {
            Samples::F32(reader.samples::<f32>().collect::<Result<Vec<_>, _>>()?)
        }
        hound::SampleFormat::Int if spec.bits_per_sample <= 16 => {
            Samples::I16(reader.samples::<i16>().collect::<Result<Vec<_>, _>>()?)
        }
        hound::SampleFormat::Int => {
            Samples::I32(reader.samples::<i32>().collect::<Result<Vec<_>, _>>()?)
        }
    };

    Ok(PcmBuffer::new(samples, spec.channels, spec.sample_rate)?)
}

/// Decode MP3 file
fn decode_mp3(path: &Path) -> Result<PcmBuffer> {
    let data = std::fs::read(path)
        .with_context(|| format!("Failed to read MP3 file: {}", path.display()))?;

    let mut decoder = minimp3::Decoder::new(&data[..]);
    let mut samples = Vec::new();
    let mut sample_rate = 0;
    let mut channels = 0;

    loop {
        match decoder.next_frame() {
            Ok(frame) => {
                if sample_rate == 0 {
                    sample_rate = frame.sample_rate as u32;
                    channels = frame.channels as u16;
                }
                samples.extend_from_slice(&frame.data);
            }
            Err(minimp3::Error::Eof) => break,
            Err(e) => anyhow::bail!("MP3 decode error: {}", e),
        }
    }

    if sample_rate == 0 {
        anyhow::bail!("No MP3 frames in {}", path.display());
    }
    Ok(PcmBuffer::new(Samples::I16(samples), channels, sample_rate)?)
}

/// Decode FLAC file as `I32`
fn decode_flac(path: &Path) -> Result<PcmBuffer> {
    let mut reader = claxon::FlacReader::open(path)
        .with_context(|| format!("Failed to open FLAC file: {}", path.display()))?;

    let info = reader.streaminfo();
    let samples = reader.samples().collect::<Result<Vec<_>, _>>()?;

    Ok(PcmBuffer::new(
        Samples::I32(samples),
        info.channels as u16,
        info.sample_rate,
    )?)
}

/// Decode OGG Vorbis file as interleaved `I16`
fn decode_ogg(path: &Path) -> Result<PcmBuffer> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open OGG file: {}", path.display()))?;

    let mut reader = lewton::inside_ogg::OggStreamReader::new(file)?;

    let sample_rate = reader.ident_hdr.audio_sample_rate;
    let channels = reader.ident_hdr.audio_channels as u16;

    let mut samples = Vec::new();
    while let Some(packet) = reader.read_dec_packet_itl()? {
        samples.extend_from_slice(&packet);
    }

    Ok(PcmBuffer::new(Samples::I16(samples), channels, sample_rate)?)
}
