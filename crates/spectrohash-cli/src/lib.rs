//! Shared output helpers for the spectrohash binaries

pub mod output;
