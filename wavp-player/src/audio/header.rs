//! Canonical 44-byte RIFF/WAVE header
//!
//! Only the fixed layout is understood: `RIFF` descriptor, a 16-byte `fmt `
//! chunk, then the `data` chunk header, with PCM data starting at byte 44.
//! Files with extra chunks before `data` (or an extensible `fmt `) are read
//! as if they had this layout.

use crate::error::FormatError;
use serde::Serialize;
use std::io::{ErrorKind, Read};
use std::time::Duration;
use tracing::error;

/// Size of the canonical header in bytes
pub const HEADER_SIZE: usize = 44;

/// Supported sample-rate range (inclusive)
pub const MIN_SAMPLE_RATE: u32 = 8000;
pub const MAX_SAMPLE_RATE: u32 = 48000;

/// Little-endian header field located at a fixed offset
#[derive(Debug, Clone, Copy)]
struct Field {
    name: &'static str,
    offset: usize,
    width: usize,
}

const CHANNELS: Field = Field { name: "channels", offset: 22, width: 2 };
const SAMPLE_RATE: Field = Field { name: "sample_rate", offset: 24, width: 4 };
const BLOCK_ALIGN: Field = Field { name: "block_align", offset: 32, width: 2 };
const BITS_PER_SAMPLE: Field = Field { name: "bits_per_sample", offset: 34, width: 2 };
const DATA_SIZE: Field = Field { name: "data_size", offset: 40, width: 4 };

/// Every field decoded from the header, in layout order
const FIELDS: [Field; 5] = [CHANNELS, SAMPLE_RATE, BLOCK_ALIGN, BITS_PER_SAMPLE, DATA_SIZE];

/// Raw header bytes with typed field accessors
struct RawHeader([u8; HEADER_SIZE]);

impl RawHeader {
    fn u16(&self, field: Field) -> u16 {
        debug_assert_eq!(field.width, 2, "{} is not a 16-bit field", field.name);
        u16::from_le_bytes([self.0[field.offset], self.0[field.offset + 1]])
    }

    fn u32(&self, field: Field) -> u32 {
        debug_assert_eq!(field.width, 4, "{} is not a 32-bit field", field.name);
        let o = field.offset;
        u32::from_le_bytes([self.0[o], self.0[o + 1], self.0[o + 2], self.0[o + 3]])
    }
}

/// Failure to obtain a full header from a reader
#[derive(Debug)]
pub enum HeaderReadError {
    /// EOF before 44 bytes; carries the count actually read
    Truncated(usize),
    /// The reader itself failed
    Io(std::io::Error),
}

/// Audio format described by the header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WavFormat {
    /// Number of channels (1 = mono, 2 = stereo)
    pub channels: u16,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Bits per sample (16 or 24 when supported)
    pub bits_per_sample: u16,
    /// Bytes per frame across all channels
    pub block_align: u16,
    /// Size of the audio data in bytes, as declared by the header
    pub data_size: u32,
}

impl WavFormat {
    /// Read exactly 44 bytes and decode the fixed-offset fields.
    ///
    /// No validation is performed; see [`WavFormat::validate`].
    pub fn parse<R: Read>(reader: &mut R) -> Result<Self, HeaderReadError> {
        let mut bytes = [0u8; HEADER_SIZE];
        let got = read_full(reader, &mut bytes).map_err(HeaderReadError::Io)?;
        if got < HEADER_SIZE {
            return Err(HeaderReadError::Truncated(got));
        }
        Ok(Self::from_header_bytes(&bytes))
    }

    /// Decode the fields from an in-memory header.
    pub fn from_header_bytes(bytes: &[u8; HEADER_SIZE]) -> Self {
        let raw = RawHeader(*bytes);
        Self {
            channels: raw.u16(CHANNELS),
            sample_rate: raw.u32(SAMPLE_RATE),
            bits_per_sample: raw.u16(BITS_PER_SAMPLE),
            block_align: raw.u16(BLOCK_ALIGN),
            data_size: raw.u32(DATA_SIZE),
        }
    }

    /// Check the format is one the player can stream.
    ///
    /// Checks run in order: channels, bit depth, sample rate, block align.
    /// The first failing check is logged and returned.
    pub fn validate(&self) -> Result<(), FormatError> {
        let result = self.check();
        if let Err(reason) = &result {
            error!("{}", reason);
        }
        result
    }

    /// `true` if [`validate`](Self::validate) would accept this format (no logging)
    pub fn is_supported(&self) -> bool {
        self.check().is_ok()
    }

    fn check(&self) -> Result<(), FormatError> {
        if !(1..=2).contains(&self.channels) {
            return Err(FormatError::UnsupportedChannels(self.channels));
        }

        if self.bits_per_sample != 16 && self.bits_per_sample != 24 {
            return Err(FormatError::UnsupportedBitDepth(self.bits_per_sample));
        }

        if !(MIN_SAMPLE_RATE..=MAX_SAMPLE_RATE).contains(&self.sample_rate) {
            return Err(FormatError::SampleRateOutOfRange(self.sample_rate));
        }

        let expected = self.channels * (self.bits_per_sample / 8);
        if self.block_align != expected {
            return Err(FormatError::BlockAlignMismatch {
                found: self.block_align,
                expected,
            });
        }

        Ok(())
    }

    /// Bytes in one sample of one channel
    pub fn bytes_per_sample(&self) -> usize {
        (self.bits_per_sample / 8) as usize
    }

    /// Whole frames in the declared data size
    pub fn frame_count(&self) -> u64 {
        if self.block_align == 0 {
            return 0;
        }
        self.data_size as u64 / self.block_align as u64
    }

    /// Playback length of the declared data size
    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.frame_count() as f64 / self.sample_rate as f64)
    }

    /// Names of the decoded header fields with their offsets
    pub fn field_layout() -> impl Iterator<Item = (&'static str, usize, usize)> {
        FIELDS.iter().map(|f| (f.name, f.offset, f.width))
    }
}

/// Read until `buf` is full or EOF, retrying interrupted and short reads.
///
/// Returns the number of bytes placed in `buf`.
pub(crate) fn read_full<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Canonical header with the given fmt fields
    fn header(channels: u16, rate: u32, bits: u16, block_align: u16, data_size: u32) -> [u8; 44] {
        let mut h = [0u8; 44];
        h[0..4].copy_from_slice(b"RIFF");
        h[4..8].copy_from_slice(&(36 + data_size).to_le_bytes());
        h[8..12].copy_from_slice(b"WAVE");
        h[12..16].copy_from_slice(b"fmt ");
        h[16..20].copy_from_slice(&16u32.to_le_bytes());
        h[20..22].copy_from_slice(&1u16.to_le_bytes());
        h[22..24].copy_from_slice(&channels.to_le_bytes());
        h[24..28].copy_from_slice(&rate.to_le_bytes());
        h[28..32].copy_from_slice(&(rate * block_align as u32).to_le_bytes());
        h[32..34].copy_from_slice(&block_align.to_le_bytes());
        h[34..36].copy_from_slice(&bits.to_le_bytes());
        h[36..40].copy_from_slice(b"data");
        h[40..44].copy_from_slice(&data_size.to_le_bytes());
        h
    }

    fn format(channels: u16, rate: u32, bits: u16, block_align: u16) -> WavFormat {
        WavFormat {
            channels,
            sample_rate: rate,
            bits_per_sample: bits,
            block_align,
            data_size: 0,
        }
    }

    #[test]
    fn test_parse_fixed_offsets() {
        let bytes = header(2, 44100, 24, 6, 123_456);
        let fmt = WavFormat::parse(&mut &bytes[..]).unwrap();
        assert_eq!(
            fmt,
            WavFormat {
                channels: 2,
                sample_rate: 44100,
                bits_per_sample: 24,
                block_align: 6,
                data_size: 123_456,
            }
        );
    }

    #[test]
    fn test_parse_does_not_validate() {
        let bytes = header(6, 96000, 8, 1, 0);
        let fmt = WavFormat::parse(&mut &bytes[..]).unwrap();
        assert_eq!(fmt.channels, 6);
        assert!(!fmt.is_supported());
    }

    #[test]
    fn test_parse_truncated() {
        let bytes = header(1, 8000, 16, 2, 0);
        match WavFormat::parse(&mut &bytes[..43]) {
            Err(HeaderReadError::Truncated(n)) => assert_eq!(n, 43),
            other => panic!("Expected Truncated, got {:?}", other),
        }
        let mut empty: &[u8] = &[];
        assert!(matches!(
            WavFormat::parse(&mut empty),
            Err(HeaderReadError::Truncated(0))
        ));
    }

    #[test]
    fn test_parse_consumes_only_header() {
        let mut file = header(1, 8000, 16, 2, 4).to_vec();
        file.extend_from_slice(&[1, 2, 3, 4]);
        let mut reader = &file[..];
        WavFormat::parse(&mut reader).unwrap();
        assert_eq!(reader, &[1u8, 2, 3, 4][..]);
    }

    /// Reader that hands out at most 5 bytes per call
    struct Trickle<'a>(&'a [u8]);

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            let n = buf.len().min(5).min(self.0.len());
            buf[..n].copy_from_slice(&self.0[..n]);
            self.0 = &self.0[n..];
            Ok(n)
        }
    }

    #[test]
    fn test_parse_survives_short_reads() {
        let bytes = header(1, 22050, 16, 2, 10);
        let fmt = WavFormat::parse(&mut Trickle(&bytes)).unwrap();
        assert_eq!(fmt.sample_rate, 22050);
        assert_eq!(fmt.data_size, 10);
    }

    #[test]
    fn test_validate_accepts_all_supported_combinations() {
        for channels in [1u16, 2] {
            for bits in [16u16, 24] {
                for rate in [8000u32, 11025, 22050, 44100, 48000] {
                    let fmt = format(channels, rate, bits, channels * bits / 8);
                    assert_eq!(fmt.validate(), Ok(()), "{:?}", fmt);
                }
            }
        }
    }

    #[test]
    fn test_validate_rejects_channels() {
        for channels in [0u16, 3, 8] {
            let fmt = format(channels, 44100, 16, 2);
            assert_eq!(fmt.validate(), Err(FormatError::UnsupportedChannels(channels)));
        }
    }

    #[test]
    fn test_validate_rejects_bit_depth() {
        for bits in [8u16, 12, 20, 32] {
            let fmt = format(1, 44100, bits, bits / 8);
            assert_eq!(fmt.validate(), Err(FormatError::UnsupportedBitDepth(bits)));
        }
    }

    #[test]
    fn test_validate_rejects_sample_rate() {
        for rate in [0u32, 7999, 48001, 96000] {
            let fmt = format(2, rate, 16, 4);
            assert_eq!(fmt.validate(), Err(FormatError::SampleRateOutOfRange(rate)));
        }
    }

    #[test]
    fn test_validate_rejects_block_align() {
        let fmt = format(2, 44100, 24, 4);
        assert_eq!(
            fmt.validate(),
            Err(FormatError::BlockAlignMismatch { found: 4, expected: 6 })
        );

        let fmt = format(1, 44100, 16, 4);
        assert_eq!(
            fmt.validate(),
            Err(FormatError::BlockAlignMismatch { found: 4, expected: 2 })
        );
    }

    #[test]
    fn test_derived_values() {
        let mut fmt = format(2, 44100, 16, 4);
        fmt.data_size = 44100 * 4 * 2;
        assert_eq!(fmt.bytes_per_sample(), 2);
        assert_eq!(fmt.frame_count(), 88200);
        assert_eq!(fmt.duration(), Duration::from_secs(2));

        let zero = format(0, 0, 0, 0);
        assert_eq!(zero.frame_count(), 0);
        assert_eq!(zero.duration(), Duration::ZERO);
    }

    #[test]
    fn test_field_layout_matches_offsets() {
        let layout: Vec<_> = WavFormat::field_layout().collect();
        assert_eq!(
            layout,
            vec![
                ("channels", 22, 2),
                ("sample_rate", 24, 4),
                ("block_align", 32, 2),
                ("bits_per_sample", 34, 2),
                ("data_size", 40, 4),
            ]
        );
    }
}
