//! Core types shared by every layer: protocol constants, the error
//! taxonomy, session fields, and the collaborator traits.

pub mod constants;
pub mod error;
pub mod fields;
pub mod traits;

pub use error::{AudioError, CallsignError, FrameError, SessionError};
pub use fields::{Field, FieldUpdate, render_value};
pub use traits::{AudioSink, Observer, Vocoder};
