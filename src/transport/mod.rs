//! Connected-UDP transport to the reflector.

pub mod socket;

pub use socket::ReflectorSocket;
