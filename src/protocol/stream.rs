//! Voice stream frame parsing.
//!
//! A stream frame rides in a single UDP datagram of at least 54 bytes:
//!
//! ```text
//!  0                   4         6                                34
//! +-------------------+---------+--------------------------------+
//! | magic "M17 " (4B) | SID (2) | LICH (28)                      |
//! +-------------------+---------+--------------------------------+
//! | FN (2) | payload (16)                           | rsvd (2)   |
//! +--------+-------------------------------------------+--------+
//! 34       36                                          52       54
//!
//! LICH: DST (6) | SRC (6) | TYPE (2) | META (14)
//! ```
//!
//! All multi-byte integers are big-endian. Bytes past offset 54 are
//! ignored; the two reserved bytes carry CRC material this listen-only
//! client does not verify.

use crate::core::constants::{META_SIZE, MIN_STREAM_FRAME_SIZE, PAYLOAD_SIZE};
use crate::core::error::FrameError;

use super::callsign::decode_callsign;

/// Byte offsets within a stream frame datagram.
pub mod offsets {
    /// Stream ID, 2 bytes big-endian.
    pub const STREAM_ID: usize = 4;
    /// Link information channel start.
    pub const LICH: usize = 6;
    /// Destination address within the LICH.
    pub const DST: usize = 6;
    /// Source address within the LICH.
    pub const SRC: usize = 12;
    /// Type field within the LICH, 2 bytes big-endian.
    pub const TYPE: usize = 18;
    /// Metadata within the LICH.
    pub const META: usize = 20;
    /// Frame number, 2 bytes big-endian.
    pub const FRAME_NUMBER: usize = 34;
    /// Voice payload.
    pub const PAYLOAD: usize = 36;
    /// Reserved trailer.
    pub const RESERVED: usize = 52;
}

/// Data-type indicator value for voice frames.
pub const DATA_TYPE_VOICE: u16 = 2;

/// Data-type indicator value for voice + data frames.
pub const DATA_TYPE_VOICE_AND_DATA: u16 = 3;

/// Unpacked view of the 16-bit LICH type field.
///
/// Bit layout, least significant first: 1 stream indicator, 2 data type,
/// 2 encryption type, 2 encryption subtype, 4 channel access number,
/// remaining bits reserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeField {
    /// Stream (1) versus packet (0) mode.
    pub stream_indicator: u16,
    /// Data type indicator: 2 = voice, 3 = voice + data.
    pub data_type: u16,
    /// Encryption type; 0 means unencrypted.
    pub encryption_type: u16,
    /// Encryption subtype.
    pub encryption_subtype: u16,
    /// Channel access number.
    pub channel_access_number: u16,
}

impl TypeField {
    /// Unpack a raw 16-bit type field.
    pub fn unpack(raw: u16) -> Self {
        TypeField {
            stream_indicator: raw & 0x0001,
            data_type: (raw >> 1) & 0x0003,
            encryption_type: (raw >> 3) & 0x0003,
            encryption_subtype: (raw >> 5) & 0x0003,
            channel_access_number: (raw >> 7) & 0x000F,
        }
    }

    /// Whether the frame is stream-mode.
    pub fn is_stream(&self) -> bool {
        self.stream_indicator == 1
    }

    /// Whether the frame is encrypted in any way.
    pub fn is_encrypted(&self) -> bool {
        self.encryption_type != 0
    }

    /// Whether the payload carries vocoder data (voice or voice + data).
    pub fn carries_voice(&self) -> bool {
        self.data_type == DATA_TYPE_VOICE || self.data_type == DATA_TYPE_VOICE_AND_DATA
    }
}

/// Link information channel of one stream frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lich {
    /// Decoded destination callsign.
    pub destination: String,
    /// Decoded source callsign.
    pub source: String,
    /// Raw 16-bit type field.
    pub type_code: u16,
    /// Metadata bytes.
    pub meta: [u8; META_SIZE],
}

impl Lich {
    /// Unpacked view of the type field.
    pub fn type_field(&self) -> TypeField {
        TypeField::unpack(self.type_code)
    }
}

/// One parsed voice stream frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamFrame {
    /// Stream identifier.
    pub stream_id: u16,
    /// Link information channel.
    pub lich: Lich,
    /// Frame counter within the stream.
    pub frame_number: u16,
    /// Voice payload: two 8-byte vocoder sub-frames.
    pub payload: [u8; PAYLOAD_SIZE],
}

impl StreamFrame {
    /// Parse a stream frame from a full datagram, magic included.
    ///
    /// The caller has already matched the stream magic; this checks only
    /// the length. Datagrams longer than 54 bytes parse fine, the extra
    /// bytes are ignored.
    pub fn from_bytes(data: &[u8]) -> Result<Self, FrameError> {
        if data.len() < MIN_STREAM_FRAME_SIZE {
            return Err(FrameError::TooShort {
                expected: MIN_STREAM_FRAME_SIZE,
                actual: data.len(),
            });
        }

        let stream_id = u16::from_be_bytes([data[offsets::STREAM_ID], data[offsets::STREAM_ID + 1]]);

        let mut dst = [0u8; 6];
        dst.copy_from_slice(&data[offsets::DST..offsets::SRC]);
        let mut src = [0u8; 6];
        src.copy_from_slice(&data[offsets::SRC..offsets::TYPE]);

        let type_code = u16::from_be_bytes([data[offsets::TYPE], data[offsets::TYPE + 1]]);

        let mut meta = [0u8; META_SIZE];
        meta.copy_from_slice(&data[offsets::META..offsets::FRAME_NUMBER]);

        let frame_number = u16::from_be_bytes([
            data[offsets::FRAME_NUMBER],
            data[offsets::FRAME_NUMBER + 1],
        ]);

        let mut payload = [0u8; PAYLOAD_SIZE];
        payload.copy_from_slice(&data[offsets::PAYLOAD..offsets::RESERVED]);

        Ok(StreamFrame {
            stream_id,
            lich: Lich {
                destination: decode_callsign(&dst),
                source: decode_callsign(&src),
                type_code,
                meta,
            },
            frame_number,
            payload,
        })
    }

    /// Unpacked view of the LICH type field.
    pub fn type_field(&self) -> TypeField {
        self.lich.type_field()
    }

    /// The two 8-byte vocoder sub-frames of the payload, in order.
    pub fn subframes(&self) -> [&[u8]; 2] {
        let (first, second) = self.payload.split_at(PAYLOAD_SIZE / 2);
        [first, second]
    }
}
