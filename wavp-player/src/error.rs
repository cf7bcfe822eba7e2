//! Error types for wavp-player
//!
//! Every failure of `play`/`get_info` is one of these variants. `kind()` maps a
//! variant onto the caller-facing status classes.

use crate::sink::SinkError;
use std::path::PathBuf;
use thiserror::Error;

/// Caller-facing status class of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller misuse (e.g. no sink supplied)
    InvalidArgument,
    /// File could not be opened or read, or the header is truncated
    IoFailure,
    /// Header is readable but describes an unsupported format
    FormatError,
    /// Working buffers could not be allocated
    ResourceError,
    /// The sink rejected a chunk
    SinkFailure,
}

/// Reasons a well-formed header is rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("Unsupported number of channels: {0}")]
    UnsupportedChannels(u16),

    #[error("Unsupported bits per sample: {0}")]
    UnsupportedBitDepth(u16),

    #[error("Invalid sample rate: {0} Hz")]
    SampleRateOutOfRange(u32),

    #[error("Invalid block align: {found} (expected {expected})")]
    BlockAlignMismatch { found: u16, expected: u16 },
}

/// Main error type for wavp-player
#[derive(Error, Debug)]
pub enum Error {
    /// Required argument missing or unusable
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// File could not be opened
    #[error("Failed to open file {path:?}")]
    FileOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Read failed while fetching header or audio data
    #[error("Failed to read file {path:?}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Fewer than 44 bytes available for the header
    #[error("Truncated WAV header in {path:?}: got {got} of 44 bytes")]
    TruncatedHeader { path: PathBuf, got: usize },

    /// Header parsed but the format is not supported
    #[error("Unsupported WAV format in {path:?}")]
    Format {
        path: PathBuf,
        #[source]
        reason: FormatError,
    },

    /// Working buffer reservation failed
    #[error("Failed to allocate {bytes} byte working buffer")]
    Resource {
        bytes: usize,
        #[source]
        source: std::collections::TryReserveError,
    },

    /// Sink rejected a chunk; playback stopped
    #[error("Sink failed on chunk {chunk}")]
    Sink {
        chunk: u64,
        #[source]
        source: SinkError,
    },
}

impl Error {
    /// Status class of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Error::FileOpen { .. } | Error::FileRead { .. } | Error::TruncatedHeader { .. } => {
                ErrorKind::IoFailure
            }
            Error::Format { .. } => ErrorKind::FormatError,
            Error::Resource { .. } => ErrorKind::ResourceError,
            Error::Sink { .. } => ErrorKind::SinkFailure,
        }
    }

    /// The sink's own failure, when playback was stopped by the sink
    pub fn sink_error(&self) -> Option<&SinkError> {
        match self {
            Error::Sink { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Convenience Result type using wavp-player Error
pub type Result<T> = std::result::Result<T, Error>;
