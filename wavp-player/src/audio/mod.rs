//! WAV header decoding and PCM sample transforms

pub mod header;
pub mod sample;

pub use header::{WavFormat, HEADER_SIZE};
pub use sample::{apply_volume, convert_24_to_16, process_chunk, widen_16_to_24};
