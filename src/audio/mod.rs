//! Voice decoding and audio output.
//!
//! Concrete implementations behind the [`Vocoder`](crate::core::Vocoder)
//! and [`AudioSink`](crate::core::AudioSink) traits:
//!
//! - [`Codec2Vocoder`]: Codec 2 decoder at 3200 bit/s (`codec2` feature,
//!   on by default)
//! - [`CpalSink`]: local playback on the default output device
//!   (`playback` feature, off by default)
//! - [`DiscardSink`]: drops decoded audio, always available
//!
//! Without `playback` the client still runs end to end; decoded audio
//! goes to the [`DiscardSink`].

pub mod sink;

#[cfg(feature = "playback")]
#[cfg_attr(docsrs, doc(cfg(feature = "playback")))]
pub mod playback;

#[cfg(feature = "codec2")]
#[cfg_attr(docsrs, doc(cfg(feature = "codec2")))]
pub mod vocoder;

pub use sink::DiscardSink;

#[cfg(feature = "playback")]
pub use playback::CpalSink;

#[cfg(feature = "codec2")]
pub use vocoder::Codec2Vocoder;
