//! Control packet codec.
//!
//! Every reflector datagram opens with a 4-byte magic tag. The client sends
//! three packet kinds and classifies five:
//!
//! ```text
//! client -> reflector    LSTN    listen request, address + optional module
//!                        PONG    keepalive reply, address
//!                        DISC    disconnect, address
//!
//! reflector -> client    ACKN    listen request accepted
//!                        NACK    listen request rejected
//!                        PING    keepalive probe
//!                        DISC    link closed (or ack of our disconnect)
//!                        M17     voice stream frame
//! ```
//!
//! Incoming control packets carry the reflector's 6-byte address after the
//! tag; a listen-only client has no use for it and does not extract it.
//! Datagrams shorter than a tag, or tagged with anything else (including
//! the send-only `LSTN` and `PONG`), classify as noise.

use crate::core::constants::{ENCODED_CALLSIGN_SIZE, MAGIC_SIZE, MIN_PACKET_SIZE};
use crate::core::error::FrameError;

use super::callsign::WireAddress;
use super::stream::StreamFrame;

/// The 4-byte magic tags.
pub mod magic {
    /// Listen request.
    pub const LSTN: [u8; 4] = *b"LSTN";
    /// Listen request accepted.
    pub const ACKN: [u8; 4] = *b"ACKN";
    /// Listen request rejected.
    pub const NACK: [u8; 4] = *b"NACK";
    /// Keepalive probe.
    pub const PING: [u8; 4] = *b"PING";
    /// Keepalive reply.
    pub const PONG: [u8; 4] = *b"PONG";
    /// Disconnect.
    pub const DISC: [u8; 4] = *b"DISC";
    /// Voice stream frame.
    pub const STREAM: [u8; 4] = *b"M17 ";
}

/// One classified incoming datagram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Packet {
    /// The reflector accepted our listen request.
    Accept,
    /// The reflector rejected our listen request.
    Reject,
    /// Keepalive probe, answered with a pong.
    Ping,
    /// The reflector closed the link, or acknowledged our disconnect.
    Disconnect,
    /// One voice stream frame.
    Stream(StreamFrame),
}

/// Build a listen request: tag, encoded callsign, and the module selector
/// byte when one is given. Without a selector the reflector applies its
/// own default.
pub fn listen_request(address: &WireAddress, module: Option<u8>) -> Vec<u8> {
    let mut packet = Vec::with_capacity(MAGIC_SIZE + ENCODED_CALLSIGN_SIZE + 1);
    packet.extend_from_slice(&magic::LSTN);
    packet.extend_from_slice(address);
    if let Some(selector) = module {
        packet.push(selector);
    }
    packet
}

/// Build a keepalive reply carrying the local encoded callsign.
pub fn pong(address: &WireAddress) -> Vec<u8> {
    tagged(magic::PONG, address)
}

/// Build a disconnect packet carrying the local encoded callsign.
pub fn disconnect(address: &WireAddress) -> Vec<u8> {
    tagged(magic::DISC, address)
}

fn tagged(tag: [u8; MAGIC_SIZE], address: &WireAddress) -> Vec<u8> {
    let mut packet = Vec::with_capacity(MAGIC_SIZE + ENCODED_CALLSIGN_SIZE);
    packet.extend_from_slice(&tag);
    packet.extend_from_slice(address);
    packet
}

/// Classify one incoming datagram.
///
/// `Ok(None)` means noise: too short to carry a tag, or an unrecognized
/// tag. The only parse failure is a stream-tagged datagram shorter than a
/// full frame.
pub fn classify(data: &[u8]) -> Result<Option<Packet>, FrameError> {
    if data.len() < MIN_PACKET_SIZE {
        return Ok(None);
    }

    let mut tag = [0u8; MAGIC_SIZE];
    tag.copy_from_slice(&data[..MAGIC_SIZE]);

    match tag {
        magic::ACKN => Ok(Some(Packet::Accept)),
        magic::NACK => Ok(Some(Packet::Reject)),
        magic::PING => Ok(Some(Packet::Ping)),
        magic::DISC => Ok(Some(Packet::Disconnect)),
        magic::STREAM => Ok(Some(Packet::Stream(StreamFrame::from_bytes(data)?))),
        _ => Ok(None),
    }
}
