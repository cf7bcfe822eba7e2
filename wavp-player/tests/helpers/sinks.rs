//! Sinks that record or fail on demand

use wavp_player::{AudioSink, SinkError};

/// Keeps a copy of every chunk it is given
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub chunks: Vec<Vec<u8>>,
}

impl RecordingSink {
    pub fn sizes(&self) -> Vec<usize> {
        self.chunks.iter().map(Vec::len).collect()
    }

    pub fn total_bytes(&self) -> usize {
        self.chunks.iter().map(Vec::len).sum()
    }

    pub fn bytes(&self) -> Vec<u8> {
        self.chunks.concat()
    }

    /// Interpret the recorded stream as little-endian i16 samples
    pub fn samples_i16(&self) -> Vec<i16> {
        self.bytes()
            .chunks_exact(2)
            .map(|b| i16::from_le_bytes([b[0], b[1]]))
            .collect()
    }
}

impl AudioSink for RecordingSink {
    fn consume(&mut self, bytes: &[u8]) -> Result<(), SinkError> {
        self.chunks.push(bytes.to_vec());
        Ok(())
    }
}

/// Accepts chunks until call number `fail_on` (1-based), which it rejects
#[derive(Debug)]
pub struct FailingSink {
    pub fail_on: usize,
    pub calls: usize,
}

impl FailingSink {
    pub fn new(fail_on: usize) -> Self {
        Self { fail_on, calls: 0 }
    }
}

impl AudioSink for FailingSink {
    fn consume(&mut self, _bytes: &[u8]) -> Result<(), SinkError> {
        self.calls += 1;
        if self.calls == self.fail_on {
            return Err(SinkError::Rejected(format!("refused chunk {}", self.calls)));
        }
        Ok(())
    }
}
