//! Base-40 callsign encoding.
//!
//! M17 packs a station identifier of up to 9 characters into a 48-bit
//! big-endian integer. Each character is a base-40 digit:
//!
//! ```text
//! ' '        -> 0
//! 'A'..='Z'  -> 1..=26
//! '0'..='9'  -> 27..=36
//! '-'        -> 37
//! '/'        -> 38
//! '.'        -> 39
//! ```
//!
//! The identifier is scanned right to left, so the last character becomes
//! the most significant digit. Decoding peels digits off with `% 40` and
//! stops when the value reaches zero, which means trailing spaces (high
//! zero digits) are not reproduced.

use rand::Rng;
use std::fmt;
use std::str::FromStr;

use crate::core::constants::{CALLSIGN_MAX_CHARS, ENCODED_CALLSIGN_SIZE};
use crate::core::error::CallsignError;

/// The 40-symbol callsign alphabet, in digit-value order.
pub const CALLSIGN_ALPHABET: &[u8; 40] = b" ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789-/.";

/// Prefix of generated listen-only callsigns.
const LISTEN_PREFIX: &str = "LSTN";

/// Character pool for the random suffix of generated callsigns.
const SUFFIX_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Number of random suffix characters in a generated callsign.
const SUFFIX_LEN: usize = 5;

/// A 6-byte encoded callsign as it appears on the wire.
pub type WireAddress = [u8; ENCODED_CALLSIGN_SIZE];

/// Digit value of one callsign character, if it is in the alphabet.
fn symbol_value(ch: char) -> Option<u64> {
    let b = u8::try_from(ch).ok()?;
    CALLSIGN_ALPHABET
        .iter()
        .position(|&a| a == b)
        .map(|i| i as u64)
}

/// Encode a callsign into its 6-byte wire address.
///
/// Fails on any character outside the 40-symbol alphabet and on
/// identifiers longer than 9 characters.
pub fn encode_callsign(callsign: &str) -> Result<WireAddress, CallsignError> {
    let len = callsign.chars().count();
    if len > CALLSIGN_MAX_CHARS {
        return Err(CallsignError::TooLong { len });
    }

    let mut value: u64 = 0;
    for ch in callsign.chars().rev() {
        let digit = symbol_value(ch).ok_or(CallsignError::InvalidCharacter { ch })?;
        value = value * 40 + digit;
    }

    let mut encoded = [0u8; ENCODED_CALLSIGN_SIZE];
    for slot in encoded.iter_mut().rev() {
        *slot = (value & 0xFF) as u8;
        value >>= 8;
    }
    Ok(encoded)
}

/// Decode a 6-byte wire address into a callsign.
///
/// Never fails: every base-40 digit produced by `% 40` maps to an
/// alphabet character. An all-zero address decodes to the empty string.
pub fn decode_callsign(encoded: &WireAddress) -> String {
    let mut value: u64 = 0;
    for &b in encoded {
        value = (value << 8) | u64::from(b);
    }

    let mut callsign = String::new();
    while value > 0 {
        callsign.push(CALLSIGN_ALPHABET[(value % 40) as usize] as char);
        value /= 40;
    }
    callsign
}

/// A station identifier.
///
/// Construction does not validate; [`encode`](Callsign::encode) is where an
/// out-of-alphabet character fails, matching the point where the identifier
/// first has to go on the wire. [`FromStr`] validates eagerly for callers
/// that want early feedback (the CLI uses it).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Callsign(String);

impl Callsign {
    /// Wrap a callsign string.
    pub fn new(callsign: impl Into<String>) -> Self {
        Callsign(callsign.into())
    }

    /// Generate a listen-only callsign: `LSTN` plus five random
    /// characters from `A-Z0-9`. Always alphabet-valid.
    pub fn random() -> Self {
        let mut rng = rand::thread_rng();
        let mut text = String::with_capacity(LISTEN_PREFIX.len() + SUFFIX_LEN);
        text.push_str(LISTEN_PREFIX);
        for _ in 0..SUFFIX_LEN {
            let idx = rng.gen_range(0..SUFFIX_CHARSET.len());
            text.push(SUFFIX_CHARSET[idx] as char);
        }
        Callsign(text)
    }

    /// The identifier as text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Encode into the 6-byte wire address.
    pub fn encode(&self) -> Result<WireAddress, CallsignError> {
        encode_callsign(&self.0)
    }
}

impl fmt::Display for Callsign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Callsign {
    type Err = CallsignError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        encode_callsign(s)?;
        Ok(Callsign(s.to_string()))
    }
}
