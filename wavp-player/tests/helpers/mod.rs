//! Shared fixtures for wavp-player integration tests
//!
//! - audio_generator: hound-written 16-bit WAV files with known content
//! - error_injection: raw headers, truncated and malformed files, unreadable paths
//! - sinks: recording and failing sinks

#![allow(dead_code)]

pub mod audio_generator;
pub mod error_injection;
pub mod sinks;

// Each test binary uses a different subset
#[allow(unused_imports)]
pub use audio_generator::{generate_constant_wav, generate_sine_wav, TEST_SAMPLE_RATE};
#[allow(unused_imports)]
pub use error_injection::{ErrorInjectionBuilder, RawHeader};
#[allow(unused_imports)]
pub use sinks::{FailingSink, RecordingSink};
