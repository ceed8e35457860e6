//! Transport-facing layer: the UDP receive loop, the WebSocket acceptor and
//! the runner that supervises both.

mod handler;
mod inbound;
mod runner;
mod signal;
pub mod state;

pub use inbound::InboundListener;
pub use runner::{Relay, create_app, run};
pub use signal::shutdown_signal;
