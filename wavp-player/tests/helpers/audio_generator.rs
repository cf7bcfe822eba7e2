//! WAV test file generation
//!
//! hound writes a plain 44-byte PCM header for 16-bit files with one or two
//! channels, which is exactly the layout the player reads.

use hound::{SampleFormat, WavSpec, WavWriter};
use std::f32::consts::PI;
use std::path::Path;

/// Standard test sample rate (44.1 kHz)
pub const TEST_SAMPLE_RATE: u32 = 44100;

fn spec_16(channels: u16, sample_rate: u32) -> WavSpec {
    WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    }
}

/// Generate a 16-bit sine wave, same value on every channel.
///
/// `amplitude` is 0.0-1.0 of full scale. Returns the number of frames written.
pub fn generate_sine_wav<P: AsRef<Path>>(
    path: P,
    channels: u16,
    duration_ms: u64,
    frequency_hz: f32,
    amplitude: f32,
) -> Result<u64, hound::Error> {
    let mut writer = WavWriter::create(path, spec_16(channels, TEST_SAMPLE_RATE))?;

    let total_frames = (TEST_SAMPLE_RATE as u64 * duration_ms) / 1000;
    let peak = amplitude * i16::MAX as f32;

    for frame_idx in 0..total_frames {
        let t = frame_idx as f32 / TEST_SAMPLE_RATE as f32;
        let sample = ((2.0 * PI * frequency_hz * t).sin() * peak) as i16;
        for _ in 0..channels {
            writer.write_sample(sample)?;
        }
    }

    writer.finalize()?;
    Ok(total_frames)
}

/// Generate a 16-bit file where every sample is `value`.
pub fn generate_constant_wav<P: AsRef<Path>>(
    path: P,
    channels: u16,
    sample_rate: u32,
    frames: u64,
    value: i16,
) -> Result<(), hound::Error> {
    let mut writer = WavWriter::create(path, spec_16(channels, sample_rate))?;
    for _ in 0..frames * channels as u64 {
        writer.write_sample(value)?;
    }
    writer.finalize()
}
