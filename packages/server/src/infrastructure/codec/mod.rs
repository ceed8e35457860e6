//! Wire codecs for inbound datagrams.

pub mod osc;

pub use osc::{OscArg, OscBundle, OscDecodeError, OscMessage, OscPacket, OscTimeTag};
