//! Session state machine and voice-frame dispatch.

pub mod dispatch;
pub mod session;

pub use dispatch::FrameDispatcher;
pub use session::{LinkState, Session, SessionConfig, ShutdownOutcome};
