//! Audio device sink using cpal
//!
//! Bridges the player's blocking `consume` calls to cpal's real-time output
//! callback through a lock-free ring buffer. `consume` waits while the ring is
//! full, so the device clock paces the read loop.
//!
//! The stream runs at the file's sample rate and channel count; no resampling
//! is done, so the device must support that configuration.

use super::{AudioSink, SinkError};
use crate::audio::WavFormat;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{BufferSize, SampleRate, Stream, StreamConfig};
use ringbuf::{traits::*, HeapProd, HeapRb};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Ring capacity in seconds of audio
const RING_SECONDS: f32 = 0.5;

/// Sleep between checks while the ring is full or draining
const POLL_INTERVAL: Duration = Duration::from_millis(2);

/// Plays processed PCM on an output device.
pub struct DeviceSink {
    producer: HeapProd<f32>,
    stream: Stream,
    /// Samples pushed but not yet pulled by the callback
    pending: Arc<AtomicUsize>,
    /// Set by the stream error callback
    error_flag: Arc<AtomicBool>,
    bytes_per_sample: usize,
}

impl DeviceSink {
    /// List available output device names.
    pub fn list_devices() -> Result<Vec<String>, SinkError> {
        let host = cpal::default_host();
        let devices: Vec<String> = host
            .output_devices()
            .map_err(|e| SinkError::Unavailable(format!("Failed to enumerate devices: {}", e)))?
            .filter_map(|device| device.name().ok())
            .collect();
        debug!("Found {} output devices", devices.len());
        Ok(devices)
    }

    /// Open a device for the given format.
    ///
    /// `bytes_per_sample` is the width of the samples the player will emit
    /// (2, or 3 for 24-bit sources with native output width).
    ///
    /// Falls back to the default device when `device_name` is not found.
    pub fn open(
        device_name: Option<&str>,
        format: &WavFormat,
        bytes_per_sample: usize,
    ) -> Result<Self, SinkError> {
        if bytes_per_sample != 2 && bytes_per_sample != 3 {
            return Err(SinkError::Unavailable(format!(
                "unsupported sample width: {} bytes",
                bytes_per_sample
            )));
        }

        let host = cpal::default_host();
        let named = match device_name {
            Some(name) => {
                let mut devices = host.output_devices().map_err(|e| {
                    SinkError::Unavailable(format!("Failed to enumerate devices: {}", e))
                })?;
                let found = devices.find(|d| d.name().ok().as_deref() == Some(name));
                if found.is_none() {
                    warn!("Requested device '{}' not found, falling back to default device", name);
                }
                found
            }
            None => None,
        };
        let device = match named {
            Some(device) => device,
            None => host
                .default_output_device()
                .ok_or_else(|| SinkError::Unavailable("No default output device found".to_string()))?,
        };
        info!(
            "Using audio device: {}",
            device.name().unwrap_or_else(|_| "Unknown".to_string())
        );

        let config = StreamConfig {
            channels: format.channels,
            sample_rate: SampleRate(format.sample_rate),
            buffer_size: BufferSize::Default,
        };

        let capacity = ((format.sample_rate as f32 * RING_SECONDS) as usize).max(1)
            * format.channels.max(1) as usize;
        let (producer, mut consumer) = HeapRb::<f32>::new(capacity).split();

        let pending = Arc::new(AtomicUsize::new(0));
        let error_flag = Arc::new(AtomicBool::new(false));
        let cb_pending = Arc::clone(&pending);
        let cb_error = Arc::clone(&error_flag);

        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    let mut pulled = 0;
                    for slot in data.iter_mut() {
                        *slot = match consumer.try_pop() {
                            Some(sample) => {
                                pulled += 1;
                                sample
                            }
                            None => 0.0,
                        };
                    }
                    cb_pending.fetch_sub(pulled, Ordering::AcqRel);
                },
                move |err| {
                    error!("Audio stream error: {}", err);
                    cb_error.store(true, Ordering::SeqCst);
                },
                None,
            )
            .map_err(|e| SinkError::Unavailable(format!("Failed to build stream: {}", e)))?;

        stream
            .play()
            .map_err(|e| SinkError::Unavailable(format!("Failed to start stream: {}", e)))?;

        debug!(
            "Device stream started: {} Hz, {} channels, ring {} samples",
            format.sample_rate, format.channels, capacity
        );

        Ok(Self {
            producer,
            stream,
            pending,
            error_flag,
            bytes_per_sample,
        })
    }

    /// Block until everything pushed so far has been played.
    pub fn drain(&mut self) -> Result<(), SinkError> {
        while self.pending.load(Ordering::Acquire) > 0 {
            self.check_stream()?;
            thread::sleep(POLL_INTERVAL);
        }
        Ok(())
    }

    /// Stop the stream.
    pub fn stop(self) -> Result<(), SinkError> {
        self.stream
            .pause()
            .map_err(|e| SinkError::Disconnected(format!("Failed to pause stream: {}", e)))
    }

    fn check_stream(&self) -> Result<(), SinkError> {
        if self.error_flag.load(Ordering::SeqCst) {
            return Err(SinkError::Disconnected("audio stream reported an error".to_string()));
        }
        Ok(())
    }

    fn push_blocking(&mut self, sample: f32) -> Result<(), SinkError> {
        // Count before pushing so the callback can never decrement below zero
        self.pending.fetch_add(1, Ordering::AcqRel);
        let mut value = sample;
        loop {
            match self.producer.try_push(value) {
                Ok(()) => return Ok(()),
                Err(rejected) => {
                    if let Err(e) = self.check_stream() {
                        self.pending.fetch_sub(1, Ordering::AcqRel);
                        return Err(e);
                    }
                    value = rejected;
                    thread::sleep(POLL_INTERVAL);
                }
            }
        }
    }
}

impl AudioSink for DeviceSink {
    fn consume(&mut self, bytes: &[u8]) -> Result<(), SinkError> {
        self.check_stream()?;
        for raw in bytes.chunks_exact(self.bytes_per_sample) {
            self.push_blocking(decode_sample(raw))?;
        }
        Ok(())
    }
}

/// One little-endian sample of 2 or 3 bytes as f32 in [-1.0, 1.0)
fn decode_sample(raw: &[u8]) -> f32 {
    match *raw {
        [lo, hi] => i16::from_le_bytes([lo, hi]) as f32 / 32768.0,
        [b0, b1, b2] => i24_to_f32([b0, b1, b2]),
        _ => 0.0,
    }
}

fn i24_to_f32(bytes: [u8; 3]) -> f32 {
    // Place the 24 bits at the top of an i32, then shift back with sign
    let value = i32::from_le_bytes([0, bytes[0], bytes[1], bytes[2]]) >> 8;
    value as f32 / 8_388_608.0
}
