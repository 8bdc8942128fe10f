//! Error types for the M17 listen client.

use thiserror::Error;

/// Errors from encoding a callsign into its 6-byte wire address.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CallsignError {
    /// Character outside the 40-symbol base-40 alphabet.
    #[error("invalid character {ch:?} in callsign")]
    InvalidCharacter {
        /// The offending character.
        ch: char,
    },

    /// Callsign longer than the 48-bit encoding can hold.
    #[error("callsign too long: {len} characters, maximum is 9")]
    TooLong {
        /// Length of the rejected callsign.
        len: usize,
    },
}

/// Errors from parsing a stream-tagged datagram.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// Datagram carries the stream magic but is shorter than a full frame.
    #[error("stream frame too short: expected at least {expected} bytes, got {actual}")]
    TooShort {
        /// Minimum valid frame size.
        expected: usize,
        /// Size of the received datagram.
        actual: usize,
    },
}

/// Errors from the vocoder and audio-sink boundaries.
#[derive(Debug, Error)]
pub enum AudioError {
    /// Sub-frame handed to the vocoder had the wrong size.
    #[error("bad vocoder sub-frame size: expected {expected} bytes, got {actual}")]
    SubframeSize {
        /// Sub-frame size the vocoder expects.
        expected: usize,
        /// Size actually supplied.
        actual: usize,
    },

    /// Vocoder failed to decode a sub-frame.
    #[error("vocoder decode failed: {0}")]
    Decode(String),

    /// Audio sink refused a sample block.
    #[error("audio sink write failed: {0}")]
    Sink(String),

    /// Audio backend could not be opened.
    #[error("audio backend unavailable: {0}")]
    Backend(String),
}

/// Top-level session errors. Only resolution, socket setup, the initial
/// listen request, and peer rejection surface here; everything else is
/// absorbed by the receive loop and reported through the observer channel.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Reflector address did not resolve to a usable socket address.
    #[error("cannot resolve reflector address {addr:?}")]
    Resolve {
        /// The address string as given.
        addr: String,
    },

    /// Reflector answered the listen request with a rejection.
    #[error("connection rejected by reflector")]
    Rejected,

    /// Callsign error.
    #[error("callsign error: {0}")]
    Callsign(#[from] CallsignError),

    /// Audio error.
    #[error("audio error: {0}")]
    Audio(#[from] AudioError),

    /// I/O error.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
