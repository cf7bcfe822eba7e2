//! Output sinks
//!
//! A sink receives each processed chunk synchronously. The player blocks until
//! `consume` returns, so a slow sink throttles the read rate. The slice is only
//! valid for the duration of the call; the player reuses the buffer for the
//! next chunk.

use std::io::Write;
use thiserror::Error;
use tracing::debug;

#[cfg(feature = "device")]
pub mod device;

/// Failure reported by a sink. Returning one stops playback.
#[derive(Error, Debug)]
pub enum SinkError {
    /// Underlying writer failed
    #[error("Sink I/O error")]
    Io(#[from] std::io::Error),

    /// Consumer refused the chunk
    #[error("Chunk rejected: {0}")]
    Rejected(String),

    /// Output device went away
    #[error("Output disconnected: {0}")]
    Disconnected(String),

    /// Output could not be opened or configured
    #[error("Output unavailable: {0}")]
    Unavailable(String),
}

/// Consumer of processed audio bytes
pub trait AudioSink {
    /// Consume one processed chunk.
    fn consume(&mut self, bytes: &[u8]) -> Result<(), SinkError>;
}

/// Any `FnMut(&[u8]) -> Result<(), SinkError>` closure is a sink; its captures
/// play the role of the caller's context.
impl<F> AudioSink for F
where
    F: FnMut(&[u8]) -> Result<(), SinkError>,
{
    fn consume(&mut self, bytes: &[u8]) -> Result<(), SinkError> {
        self(bytes)
    }
}

/// Writes raw processed PCM to any `Write` (stdout, a file, a pipe).
pub struct WriterSink<W: Write> {
    writer: W,
    bytes_written: u64,
}

impl<W: Write> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            bytes_written: 0,
        }
    }

    /// Total bytes accepted so far
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Flush and hand back the inner writer.
    pub fn finish(mut self) -> Result<W, SinkError> {
        self.writer.flush()?;
        debug!("Writer sink finished after {} bytes", self.bytes_written);
        Ok(self.writer)
    }
}

impl<W: Write> AudioSink for WriterSink<W> {
    fn consume(&mut self, bytes: &[u8]) -> Result<(), SinkError> {
        self.writer.write_all(bytes)?;
        self.bytes_written += bytes.len() as u64;
        Ok(())
    }
}

/// Discards audio; keeps counts. Used for dry runs.
#[derive(Debug, Default)]
pub struct NullSink {
    pub chunks: u64,
    pub bytes: u64,
}

impl AudioSink for NullSink {
    fn consume(&mut self, bytes: &[u8]) -> Result<(), SinkError> {
        self.chunks += 1;
        self.bytes += bytes.len() as u64;
        Ok(())
    }
}
