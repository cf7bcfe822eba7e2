//! Malformed and hand-built WAV files
//!
//! Files live in a per-builder temporary directory that is removed on drop.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub type InjectionResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Canonical 44-byte header with every field settable, including
/// inconsistent combinations hound refuses to write.
#[derive(Debug, Clone, Copy)]
pub struct RawHeader {
    pub channels: u16,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
    pub block_align: u16,
    pub data_size: u32,
}

impl RawHeader {
    /// Consistent header for the given format; `data_size` starts at zero.
    pub fn new(channels: u16, sample_rate: u32, bits_per_sample: u16) -> Self {
        Self {
            channels,
            sample_rate,
            bits_per_sample,
            block_align: channels * bits_per_sample / 8,
            data_size: 0,
        }
    }

    pub fn block_align(mut self, block_align: u16) -> Self {
        self.block_align = block_align;
        self
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let byte_rate = self.sample_rate * self.block_align as u32;
        let mut out = Vec::with_capacity(44);
        out.extend_from_slice(b"RIFF");
        out.extend_from_slice(&(36 + self.data_size).to_le_bytes());
        out.extend_from_slice(b"WAVE");
        out.extend_from_slice(b"fmt ");
        out.extend_from_slice(&16u32.to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&self.channels.to_le_bytes());
        out.extend_from_slice(&self.sample_rate.to_le_bytes());
        out.extend_from_slice(&byte_rate.to_le_bytes());
        out.extend_from_slice(&self.block_align.to_le_bytes());
        out.extend_from_slice(&self.bits_per_sample.to_le_bytes());
        out.extend_from_slice(b"data");
        out.extend_from_slice(&self.data_size.to_le_bytes());
        out
    }
}

/// Test file generator for failure scenarios
pub struct ErrorInjectionBuilder {
    temp_dir: TempDir,
}

impl ErrorInjectionBuilder {
    pub fn new() -> InjectionResult<Self> {
        Ok(Self {
            temp_dir: TempDir::new()?,
        })
    }

    pub fn temp_path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn file_path(&self, filename: &str) -> PathBuf {
        self.temp_dir.path().join(filename)
    }

    /// Path that is never created
    pub fn nonexistent_file(&self) -> PathBuf {
        self.file_path("does_not_exist.wav")
    }

    /// File shorter than a full header
    pub fn truncated_header(&self, len: usize) -> InjectionResult<PathBuf> {
        let bytes = RawHeader::new(2, 44100, 16).to_bytes();
        let path = self.file_path("truncated.wav");
        fs::write(&path, &bytes[..len.min(bytes.len())])?;
        Ok(path)
    }

    /// Header followed by `data`; `data_size` is set to `data.len()`.
    pub fn raw_wav(&self, name: &str, mut header: RawHeader, data: &[u8]) -> InjectionResult<PathBuf> {
        header.data_size = data.len() as u32;
        let mut bytes = header.to_bytes();
        bytes.extend_from_slice(data);
        let path = self.file_path(name);
        fs::write(&path, bytes)?;
        Ok(path)
    }

    /// Header only, with an arbitrary (possibly unsupported) format
    pub fn header_only(&self, name: &str, header: RawHeader) -> InjectionResult<PathBuf> {
        let path = self.file_path(name);
        fs::write(&path, header.to_bytes())?;
        Ok(path)
    }

    /// A path that opens but cannot be read as a file (a directory),
    /// independent of the user's privileges
    pub fn unreadable_path(&self) -> InjectionResult<PathBuf> {
        let path = self.file_path("not_a_file.wav");
        fs::create_dir(&path)?;
        Ok(path)
    }
}
