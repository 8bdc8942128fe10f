//! Collaborator boundaries: vocoder, audio sink, observer.
//!
//! The protocol engine never depends on a concrete codec, audio device, or
//! display. It talks to these three traits; the binary picks implementations
//! at startup.

use super::error::AudioError;
use super::fields::Field;

/// Decodes compressed voice sub-frames into PCM sample blocks.
///
/// # Requirements
///
/// - `decode` MUST accept exactly [`VOICE_SUBFRAME_SIZE`] bytes and fail
///   with [`AudioError::SubframeSize`] on any other length
/// - every successful decode MUST return exactly `samples_per_subframe()`
///   samples
/// - sub-frames are decoded independently; the decoder may keep internal
///   filter state between calls
///
/// [`VOICE_SUBFRAME_SIZE`]: super::constants::VOICE_SUBFRAME_SIZE
pub trait Vocoder: Send + Sync {
    /// Number of PCM samples produced per decoded sub-frame.
    fn samples_per_subframe(&self) -> usize;

    /// Decode one 8-byte voice sub-frame into PCM samples.
    fn decode(&mut self, subframe: &[u8]) -> Result<Vec<i16>, AudioError>;
}

/// Accepts decoded PCM sample blocks for playback.
///
/// Sample blocks are 8 kHz mono signed 16-bit, two decoded sub-frames per
/// block. A write failure is reported and the block dropped; the session
/// keeps receiving.
pub trait AudioSink: Send + Sync {
    /// Queue one sample block for playback.
    fn write(&mut self, samples: &[i16]) -> Result<(), AudioError>;
}

/// Renders session field updates.
///
/// Implementations receive every update the session publishes, in order,
/// on a dedicated render task. They must not assume updates arrive for
/// every frame: a lagging observer loses old updates rather than stalling
/// the receive loop.
pub trait Observer: Send {
    /// Apply one field update.
    fn update(&mut self, field: Field, value: &str);
}
