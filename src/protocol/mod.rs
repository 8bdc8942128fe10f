//! Wire protocol: base-40 callsigns, control packets, stream frames.

pub mod callsign;
pub mod packet;
pub mod stream;

pub use callsign::{Callsign, WireAddress, decode_callsign, encode_callsign};
pub use packet::Packet;
pub use stream::{Lich, StreamFrame, TypeField};
