//! # m17-listen
//!
//! Listen-only client for [M17](https://m17project.org) voice reflectors.
//!
//! The client registers with a reflector over UDP, answers its keepalive
//! probes, and decodes the voice streams the reflector relays:
//!
//! - **Handshake**: a listen request (`LSTN`) answered by `ACKN` or `NACK`
//! - **Keepalive**: every `PING` answered with a `PONG` carrying the local
//!   station identifier
//! - **Streams**: `M17 ` frames are parsed, filtered down to unencrypted
//!   voice, decoded with Codec 2, and handed to an audio sink
//! - **Shutdown**: `DISC` exchange with a bounded wait for the reflector's
//!   acknowledgment
//!
//! ## Feature Flags
//!
//! - `codec2` (default): Codec 2 voice decoding and the `m17-listen` binary
//! - `playback`: local playback through the system's default output device
//!
//! ## Modules
//!
//! - [`core`]: constants, error taxonomy, session fields, collaborator traits
//! - [`protocol`]: callsign encoding and wire-format parsing
//! - [`transport`]: connected UDP socket to the reflector
//! - [`client`]: session state machine and voice-frame dispatch
//! - [`observer`]: field-update fan-out and display front ends
//! - [`audio`]: vocoder and audio sinks
//!
//! ## Example Usage
//!
//! ```no_run
//! use m17_listen::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), SessionError> {
//!     let (publisher, updates) = m17_listen::observer::channel();
//!     let render = m17_listen::observer::spawn_render_task(updates, Box::new(TextObserver));
//!
//!     let dispatcher = FrameDispatcher::new(
//!         Box::new(Codec2Vocoder::new()),
//!         Box::new(DiscardSink::new()),
//!         publisher.clone(),
//!     );
//!     let config = SessionConfig::new("m17-xyz.example.org:17000", Callsign::random());
//!     let (mut session, _rejected) = Session::connect(config, dispatcher, publisher).await?;
//!
//!     tokio::signal::ctrl_c().await?;
//!     session.shutdown().await;
//!     drop(session);
//!     let _ = render.await;
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod audio;
pub mod client;
pub mod core;
pub mod observer;
pub mod protocol;
pub mod transport;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::core::*;

    #[cfg(feature = "codec2")]
    pub use crate::audio::Codec2Vocoder;
    #[cfg(feature = "playback")]
    pub use crate::audio::CpalSink;
    pub use crate::audio::DiscardSink;

    pub use crate::client::{FrameDispatcher, LinkState, Session, SessionConfig, ShutdownOutcome};
    pub use crate::observer::{FieldPublisher, NullObserver, TextObserver};
    pub use crate::protocol::{Callsign, StreamFrame, TypeField, WireAddress};
}

// Re-export commonly used items at crate root
pub use crate::client::{LinkState, Session, SessionConfig, ShutdownOutcome};
pub use crate::core::{AudioError, CallsignError, FrameError, SessionError};
pub use crate::observer::FieldPublisher;
pub use crate::protocol::Callsign;
