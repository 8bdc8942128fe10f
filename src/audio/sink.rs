//! The discard sink.

use tracing::trace;

use crate::core::error::AudioError;
use crate::core::traits::AudioSink;

/// Sink that drops every sample block.
///
/// Stands in for real playback when the `playback` feature is off or
/// `--no-audio` is given; the rest of the pipeline runs unchanged.
#[derive(Debug, Default)]
pub struct DiscardSink {
    blocks: u64,
}

impl DiscardSink {
    /// Create a discard sink.
    pub fn new() -> Self {
        DiscardSink::default()
    }

    /// Number of sample blocks dropped so far.
    pub fn blocks_discarded(&self) -> u64 {
        self.blocks
    }
}

impl AudioSink for DiscardSink {
    fn write(&mut self, samples: &[i16]) -> Result<(), AudioError> {
        self.blocks += 1;
        trace!(samples = samples.len(), "sample block discarded");
        Ok(())
    }
}
