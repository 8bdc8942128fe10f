//! Codec 2 voice decoding.

use codec2::{Codec2, Codec2Mode};

use crate::core::constants::VOICE_SUBFRAME_SIZE;
use crate::core::error::AudioError;
use crate::core::traits::Vocoder;

/// Codec 2 decoder in 3200 bit/s mode.
///
/// Each 8-byte sub-frame decodes to 160 samples: 20 ms of 8 kHz mono
/// speech. The decoder keeps filter state between calls, so one instance
/// must see a stream's sub-frames in order.
pub struct Codec2Vocoder {
    codec: Codec2,
    samples: usize,
}

impl Codec2Vocoder {
    /// Create a decoder in 3200 bit/s mode.
    pub fn new() -> Self {
        let codec = Codec2::new(Codec2Mode::MODE_3200);
        let samples = codec.samples_per_frame();
        Codec2Vocoder { codec, samples }
    }
}

impl Default for Codec2Vocoder {
    fn default() -> Self {
        Codec2Vocoder::new()
    }
}

impl Vocoder for Codec2Vocoder {
    fn samples_per_subframe(&self) -> usize {
        self.samples
    }

    fn decode(&mut self, subframe: &[u8]) -> Result<Vec<i16>, AudioError> {
        if subframe.len() != VOICE_SUBFRAME_SIZE {
            return Err(AudioError::SubframeSize {
                expected: VOICE_SUBFRAME_SIZE,
                actual: subframe.len(),
            });
        }
        let mut samples = vec![0i16; self.samples];
        self.codec.decode(&mut samples, subframe);
        Ok(samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subframe_decodes_to_fixed_block() {
        let mut vocoder = Codec2Vocoder::new();
        assert_eq!(vocoder.samples_per_subframe(), 160);
        let samples = vocoder.decode(&[0u8; 8]).unwrap();
        assert_eq!(samples.len(), 160);
    }

    #[test]
    fn test_wrong_subframe_size_rejected() {
        let mut vocoder = Codec2Vocoder::new();
        let err = vocoder.decode(&[0u8; 7]).unwrap_err();
        assert!(matches!(
            err,
            AudioError::SubframeSize {
                expected: 8,
                actual: 7
            }
        ));
        assert!(vocoder.decode(&[0u8; 9]).is_err());
    }
}
