//! Volume controller
//!
//! Holds the live volume level (0-100). The player reads it once per chunk, so
//! changes made from another thread take effect on the next chunk. The cell is
//! atomic and the adjusters are a single read-modify-write, so concurrent
//! callers never lose an update or observe an out-of-range level.

use std::sync::atomic::{AtomicU8, Ordering};
use tracing::{debug, info};

/// Lowest volume level (mute)
pub const MIN_VOLUME: u8 = 0;

/// Highest volume level (unity gain)
pub const MAX_VOLUME: u8 = 100;

/// Level a new controller starts at
pub const DEFAULT_VOLUME: u8 = 30;

/// Shared volume level, typically held as `Arc<VolumeControl>`.
#[derive(Debug)]
pub struct VolumeControl {
    level: AtomicU8,
}

impl VolumeControl {
    /// Controller at the default level (30)
    pub fn new() -> Self {
        Self::with_level(DEFAULT_VOLUME as i32)
    }

    /// Controller at `level`, clamped to 0-100
    pub fn with_level(level: i32) -> Self {
        Self {
            level: AtomicU8::new(clamp_level(level)),
        }
    }

    /// Set the level, clamping to 0-100.
    pub fn set(&self, level: i32) {
        let clamped = clamp_level(level);
        self.level.store(clamped, Ordering::Relaxed);
        info!("Volume set to {}%", clamped);
    }

    /// Raise the level by `amount` (negative lowers it); result is clamped.
    pub fn increase(&self, amount: i32) -> u8 {
        self.adjust(amount)
    }

    /// Lower the level by `amount` (negative raises it); result is clamped.
    pub fn decrease(&self, amount: i32) -> u8 {
        self.adjust(amount.saturating_neg())
    }

    /// Current level
    pub fn get(&self) -> u8 {
        self.level.load(Ordering::Relaxed)
    }

    /// Current level as a gain multiplier in [0.0, 1.0]
    pub fn scale(&self) -> f32 {
        self.get() as f32 / MAX_VOLUME as f32
    }

    fn adjust(&self, delta: i32) -> u8 {
        let update = |current: u8| Some(clamp_level((current as i32).saturating_add(delta)));
        // The closure always returns Some, so fetch_update cannot fail
        let previous = match self
            .level
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, update)
        {
            Ok(prev) | Err(prev) => prev,
        };
        let new_level = clamp_level((previous as i32).saturating_add(delta));
        debug!("Volume adjusted by {:+}: {}% -> {}%", delta, previous, new_level);
        new_level
    }
}

impl Default for VolumeControl {
    fn default() -> Self {
        Self::new()
    }
}

fn clamp_level(level: i32) -> u8 {
    level.clamp(MIN_VOLUME as i32, MAX_VOLUME as i32) as u8
}
