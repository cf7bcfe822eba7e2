//! # wavp Player Library (wavp-player)
//!
//! Streams linear-PCM WAV files through a caller-supplied sink, applying a
//! live volume level to every chunk.
//!
//! **Pipeline:** open file → parse 44-byte header → validate → read fixed-size
//! chunks → normalize samples to 16-bit → scale by volume → hand bytes to sink.
//!
//! ```no_run
//! use std::sync::Arc;
//! use wavp_player::{AudioSink, Player, PlayerOptions, SinkError, VolumeControl};
//!
//! let volume = Arc::new(VolumeControl::new());
//! let player = Player::new(Arc::clone(&volume), PlayerOptions::default());
//!
//! let mut written = 0usize;
//! let mut sink = |bytes: &[u8]| -> Result<(), SinkError> {
//!     written += bytes.len();
//!     Ok(())
//! };
//! let summary = player.play("tone.wav", Some(&mut sink as &mut dyn AudioSink))?;
//! println!("{} chunks", summary.chunks);
//! # Ok::<(), wavp_player::Error>(())
//! ```

pub mod audio;
pub mod error;
pub mod player;
pub mod sink;
pub mod volume;

pub use audio::header::WavFormat;
pub use error::{Error, ErrorKind, FormatError, Result};
pub use player::{get_info, PlaybackSummary, Player, PlayerOptions, PlayerState};
pub use sink::{AudioSink, NullSink, SinkError, WriterSink};
pub use volume::VolumeControl;
pub use wavp_common::config::OutputWidth;
