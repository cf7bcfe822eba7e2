//! Streaming player
//!
//! Owns the read → convert → scale → emit loop for one file at a time.
//!
//! **States:** `Idle → HeaderRead → Validated → Streaming → Completed | Failed`
//!
//! The file handle and both working buffers are owned by a single `play` call
//! and dropped on every exit path, including early failures.

use crate::audio::header::{read_full, HeaderReadError, WavFormat};
use crate::audio::sample::{process_chunk, SourceDepth};
use crate::error::{Error, FormatError, Result};
use crate::sink::AudioSink;
use crate::volume::VolumeControl;
use crate::OutputWidth;
use serde::Serialize;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, trace, warn};
use wavp_common::config::{PlayerSection, DEFAULT_CHUNK_SIZE};

/// Player lifecycle state for one `play` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    Idle,
    HeaderRead,
    Validated,
    Streaming,
    Completed,
    Failed,
}

impl fmt::Display for PlayerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlayerState::Idle => "idle",
            PlayerState::HeaderRead => "header-read",
            PlayerState::Validated => "validated",
            PlayerState::Streaming => "streaming",
            PlayerState::Completed => "completed",
            PlayerState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Tunables for the streaming loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerOptions {
    /// Requested bytes per read; aligned down to whole frames (minimum one frame)
    pub chunk_size: usize,
    /// Emitted sample width for 24-bit sources
    pub output_width: OutputWidth,
}

impl Default for PlayerOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            output_width: OutputWidth::Native,
        }
    }
}

impl From<&PlayerSection> for PlayerOptions {
    fn from(section: &PlayerSection) -> Self {
        Self {
            chunk_size: section.chunk_size,
            output_width: section.output_width,
        }
    }
}

/// Outcome of a playback that streamed to end of file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaybackSummary {
    /// Format that was played
    pub format: WavFormat,
    /// Number of sink invocations
    pub chunks: u64,
    /// Audio bytes read after the header
    pub bytes_read: u64,
    /// Bytes handed to the sink
    pub bytes_emitted: u64,
}

/// Streams WAV files through a sink, scaling by a shared volume level.
#[derive(Debug, Clone)]
pub struct Player {
    volume: Arc<VolumeControl>,
    options: PlayerOptions,
}

impl Player {
    pub fn new(volume: Arc<VolumeControl>, options: PlayerOptions) -> Self {
        Self { volume, options }
    }

    /// Shared volume controller read on every chunk
    pub fn volume(&self) -> &Arc<VolumeControl> {
        &self.volume
    }

    pub fn options(&self) -> &PlayerOptions {
        &self.options
    }

    pub fn set_volume(&self, level: i32) {
        self.volume.set(level);
    }

    pub fn increase_volume(&self, amount: i32) -> u8 {
        self.volume.increase(amount)
    }

    pub fn decrease_volume(&self, amount: i32) -> u8 {
        self.volume.decrease(amount)
    }

    pub fn get_volume(&self) -> u8 {
        self.volume.get()
    }

    /// Play `path` to end of file through `sink`.
    ///
    /// Blocks the calling thread for the whole stream; each chunk is handed to
    /// the sink synchronously.
    ///
    /// # Errors
    /// - `InvalidArgument` if `sink` is `None` (the file is not opened)
    /// - `FileOpen` / `FileRead` / `TruncatedHeader` for I/O failures
    /// - `Format` if the header describes an unsupported format
    /// - `Resource` if the working buffers cannot be allocated
    /// - `Sink` if the sink rejects a chunk; no further reads happen
    pub fn play(
        &self,
        path: impl AsRef<Path>,
        sink: Option<&mut dyn AudioSink>,
    ) -> Result<PlaybackSummary> {
        let path = path.as_ref();
        let Some(sink) = sink else {
            warn!("play called without an output sink for {}", path.display());
            return Err(Error::InvalidArgument("write sink is required".to_string()));
        };

        let mut tracker = StateTracker::new(path);
        let result = File::open(path)
            .map_err(|source| {
                error!("Failed to open file {}: {}", path.display(), source);
                Error::FileOpen {
                    path: path.to_path_buf(),
                    source,
                }
            })
            .and_then(|file| self.stream(file, path, sink, &mut tracker));

        tracker.finish(&result);
        result
    }

    /// Run the state machine over an already-opened source.
    fn stream<R: Read>(
        &self,
        mut reader: R,
        path: &Path,
        sink: &mut dyn AudioSink,
        tracker: &mut StateTracker,
    ) -> Result<PlaybackSummary> {
        tracker.advance(PlayerState::HeaderRead);

        let format = WavFormat::parse(&mut reader).map_err(|e| header_error(path, e))?;
        let depth = supported_depth(&format).map_err(|reason| {
            error!("Invalid WAV header in {}", path.display());
            Error::Format {
                path: path.to_path_buf(),
                reason,
            }
        })?;
        tracker.advance(PlayerState::Validated);

        let frame_bytes = format.block_align as usize;
        let chunk_len = aligned_chunk_size(self.options.chunk_size, frame_bytes);
        let mut input = allocate(chunk_len)?;
        input.resize(chunk_len, 0);
        let mut output = allocate(chunk_len)?;
        tracker.advance(PlayerState::Streaming);

        info!(
            file = %path.display(),
            channels = format.channels,
            sample_rate = format.sample_rate,
            bits = format.bits_per_sample,
            data_size = format.data_size,
            chunk_len,
            "Streaming WAV data"
        );

        let mut summary = PlaybackSummary {
            format,
            chunks: 0,
            bytes_read: 0,
            bytes_emitted: 0,
        };

        loop {
            let n = read_full(&mut reader, &mut input).map_err(|source| {
                error!("Read failed in {}: {}", path.display(), source);
                Error::FileRead {
                    path: path.to_path_buf(),
                    source,
                }
            })?;
            if n == 0 {
                break;
            }
            summary.bytes_read += n as u64;

            let level = self.volume.get();
            let emitted = process_chunk(
                depth,
                self.options.output_width,
                level,
                &input[..n],
                &mut output,
            );

            let trailing = n % depth.bytes();
            if trailing != 0 {
                debug!("Dropping {} trailing byte(s) of a partial sample", trailing);
            }
            if emitted == 0 {
                continue;
            }

            trace!(chunk = summary.chunks + 1, bytes = emitted, level, "Emitting chunk");
            if let Err(source) = sink.consume(&output) {
                error!("Write sink failed on chunk {}: {}", summary.chunks + 1, source);
                return Err(Error::Sink {
                    chunk: summary.chunks + 1,
                    source,
                });
            }
            summary.chunks += 1;
            summary.bytes_emitted += emitted as u64;
        }

        Ok(summary)
    }
}

/// Open `path` and decode its header without validating or streaming.
///
/// # Errors
/// - `FileOpen` if the file cannot be opened
/// - `FileRead` / `TruncatedHeader` if 44 header bytes cannot be read
pub fn get_info(path: impl AsRef<Path>) -> Result<WavFormat> {
    let path = path.as_ref();
    let mut file = File::open(path).map_err(|source| {
        error!("Failed to open file {}: {}", path.display(), source);
        Error::FileOpen {
            path: path.to_path_buf(),
            source,
        }
    })?;

    let format = WavFormat::parse(&mut file).map_err(|e| header_error(path, e))?;
    debug!("Read header of {}: {:?}", path.display(), format);
    Ok(format)
}

/// Validate and pick the sample path for a parsed format
fn supported_depth(format: &WavFormat) -> std::result::Result<SourceDepth, FormatError> {
    format.validate()?;
    SourceDepth::from_bits(format.bits_per_sample)
        .ok_or(FormatError::UnsupportedBitDepth(format.bits_per_sample))
}

fn header_error(path: &Path, err: HeaderReadError) -> Error {
    match err {
        HeaderReadError::Truncated(got) => {
            error!("Failed to read WAV header of {}: only {} bytes", path.display(), got);
            Error::TruncatedHeader {
                path: path.to_path_buf(),
                got,
            }
        }
        HeaderReadError::Io(source) => {
            error!("Failed to read WAV header of {}: {}", path.display(), source);
            Error::FileRead {
                path: path.to_path_buf(),
                source,
            }
        }
    }
}

/// Largest multiple of `frame_bytes` not above `requested`, at least one frame
fn aligned_chunk_size(requested: usize, frame_bytes: usize) -> usize {
    let frame_bytes = frame_bytes.max(1);
    (requested / frame_bytes).max(1) * frame_bytes
}

fn allocate(bytes: usize) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    buffer.try_reserve_exact(bytes).map_err(|source| {
        error!("Failed to allocate {} byte buffer", bytes);
        Error::Resource { bytes, source }
    })?;
    Ok(buffer)
}

/// Logs state transitions for one play call
struct StateTracker {
    path: PathBuf,
    state: PlayerState,
    #[cfg(test)]
    history: Vec<PlayerState>,
}

impl StateTracker {
    fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            state: PlayerState::Idle,
            #[cfg(test)]
            history: vec![PlayerState::Idle],
        }
    }

    fn advance(&mut self, next: PlayerState) {
        debug!("{}: {} -> {}", self.path.display(), self.state, next);
        self.state = next;
        #[cfg(test)]
        self.history.push(next);
    }

    fn finish(&mut self, result: &Result<PlaybackSummary>) {
        match result {
            Ok(summary) => {
                self.advance(PlayerState::Completed);
                info!(
                    "Finished {}: {} chunks, {} bytes emitted",
                    self.path.display(),
                    summary.chunks,
                    summary.bytes_emitted
                );
            }
            Err(e) => {
                self.advance(PlayerState::Failed);
                debug!("Playback of {} failed: {}", self.path.display(), e);
            }
        }
    }
}
