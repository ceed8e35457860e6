//! OSC to WebSocket relay library.
//!
//! Receives datagrams on a UDP socket and broadcasts each one, unmodified, as
//! a binary frame to every connected WebSocket client.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;
pub mod error;

// Re-export entry points
pub use config::ServerConfig;
pub use error::ServerError;
pub use ui::{Relay, run as run_server};
