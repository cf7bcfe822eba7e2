//! Sample conversion and volume scaling
//!
//! All audio passes through a 16-bit working representation: 24-bit samples
//! are truncated to 16 bits before scaling, so there is one volume code path
//! regardless of source depth.

use crate::OutputWidth;

/// Sample depth of a validated source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceDepth {
    Bits16,
    Bits24,
}

impl SourceDepth {
    /// Depth for a bits-per-sample value, `None` if unsupported
    pub fn from_bits(bits: u16) -> Option<Self> {
        match bits {
            16 => Some(SourceDepth::Bits16),
            24 => Some(SourceDepth::Bits24),
            _ => None,
        }
    }

    /// Bytes per sample in the source data
    pub fn bytes(self) -> usize {
        match self {
            SourceDepth::Bits16 => 2,
            SourceDepth::Bits24 => 3,
        }
    }

    /// Bytes per sample handed to the sink
    pub fn output_bytes(self, width: OutputWidth) -> usize {
        match (self, width) {
            (SourceDepth::Bits24, OutputWidth::Native) => 3,
            _ => 2,
        }
    }
}

/// Reassemble a little-endian 24-bit two's-complement sample and keep its top
/// 16 bits. The low byte is discarded (truncation, not rounding).
#[inline]
pub fn convert_24_to_16(bytes: [u8; 3]) -> i16 {
    let mut sample = ((bytes[2] as i32) << 16) | ((bytes[1] as i32) << 8) | bytes[0] as i32;
    if sample & 0x80_0000 != 0 {
        sample |= !0xFF_FFFF;
    }
    (sample >> 8) as i16
}

/// Re-widen a 16-bit working sample to 24-bit little-endian bytes.
#[inline]
pub fn widen_16_to_24(sample: i16) -> [u8; 3] {
    let wide = ((sample as i32) << 8).to_le_bytes();
    [wide[0], wide[1], wide[2]]
}

/// Scale a sample by `level`/100, truncating toward zero.
///
/// Levels above 100 are never produced by the volume controller; if one is
/// passed anyway the float-to-int conversion saturates at `i16::MIN`/`i16::MAX`
/// instead of wrapping.
#[inline]
pub fn apply_volume(sample: i16, level: u8) -> i16 {
    let multiplier = level as f32 / 100.0;
    (sample as f32 * multiplier) as i16
}

/// Convert and scale one chunk of raw PCM into `output`.
///
/// `output` is cleared first. Trailing bytes that do not form a whole sample
/// are dropped. Returns the number of bytes written to `output`.
pub fn process_chunk(
    depth: SourceDepth,
    width: OutputWidth,
    level: u8,
    input: &[u8],
    output: &mut Vec<u8>,
) -> usize {
    output.clear();

    match depth {
        SourceDepth::Bits16 => {
            for raw in input.chunks_exact(2) {
                let sample = i16::from_le_bytes([raw[0], raw[1]]);
                output.extend_from_slice(&apply_volume(sample, level).to_le_bytes());
            }
        }
        SourceDepth::Bits24 => {
            for raw in input.chunks_exact(3) {
                let sample = apply_volume(convert_24_to_16([raw[0], raw[1], raw[2]]), level);
                match width {
                    OutputWidth::Native => output.extend_from_slice(&widen_16_to_24(sample)),
                    OutputWidth::Pcm16 => output.extend_from_slice(&sample.to_le_bytes()),
                }
            }
        }
    }

    output.len()
}
