//! Protocol constants fixed by the M17 reflector wire format.
//!
//! These values are dictated by the protocol and MUST NOT be changed.

use std::time::Duration;

// =============================================================================
// CALLSIGN ENCODING
// =============================================================================

/// Encoded callsign (wire address) size in bytes: a 48-bit base-40 number.
pub const ENCODED_CALLSIGN_SIZE: usize = 6;

/// Maximum callsign length that fits in the 48-bit encoding.
pub const CALLSIGN_MAX_CHARS: usize = 9;

// =============================================================================
// CONTROL PACKETS
// =============================================================================

/// Magic tag size; every reflector packet starts with one.
pub const MAGIC_SIZE: usize = 4;

/// Minimum datagram size worth classifying; anything shorter is noise.
pub const MIN_PACKET_SIZE: usize = MAGIC_SIZE;

// =============================================================================
// STREAM FRAME LAYOUT
// =============================================================================

/// Minimum size of a voice stream frame datagram.
pub const MIN_STREAM_FRAME_SIZE: usize = 54;

/// Link information channel (LICH) size: dst + src + type + metadata.
pub const LICH_SIZE: usize = 28;

/// Metadata size within the LICH.
pub const META_SIZE: usize = 14;

/// Voice payload size per stream frame.
pub const PAYLOAD_SIZE: usize = 16;

/// Vocoder sub-frame size; each payload carries exactly two.
pub const VOICE_SUBFRAME_SIZE: usize = 8;

// =============================================================================
// TIMING
// =============================================================================

/// Bounded wait for the reflector's disconnect acknowledgment.
pub const DISCONNECT_WAIT: Duration = Duration::from_secs(5);

// =============================================================================
// TRANSPORT
// =============================================================================

/// Receive buffer size. Comfortably above the largest frame a reflector
/// sends; the minimum valid stream frame is 54 bytes but no upper bound
/// is documented.
pub const RECV_BUFFER_SIZE: usize = 2048;

// =============================================================================
// AUDIO
// =============================================================================

/// Decoded audio sample rate in Hz.
pub const SAMPLE_RATE: u32 = 8000;

/// Decoded audio channel count (mono).
pub const CHANNELS: u16 = 1;

// =============================================================================
// OBSERVER
// =============================================================================

/// Capacity of the field-update fan-out channel. Updates beyond this are
/// dropped for lagging observers rather than stalling the receive loop.
pub const FIELD_EVENT_CAPACITY: usize = 256;
