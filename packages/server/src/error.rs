//! Server error definitions.

use std::{io, net::SocketAddr};

use thiserror::Error;

/// Errors that stop the relay
#[derive(Debug, Error)]
pub enum ServerError {
    /// The UDP socket could not be bound
    #[error("failed to bind UDP socket on {addr}: {source}")]
    InboundBind { addr: String, source: io::Error },

    /// The WebSocket listener could not be bound
    #[error("failed to bind WebSocket listener on {addr}: {source}")]
    OutboundBind { addr: String, source: io::Error },

    /// Reading from the UDP socket failed
    #[error("UDP receive on {addr} failed: {source}")]
    InboundReceive { addr: SocketAddr, source: io::Error },

    /// The HTTP/WebSocket server stopped with an error
    #[error("WebSocket server on {addr} failed: {source}")]
    OutboundServe { addr: SocketAddr, source: io::Error },

    /// One of the server loops ended without being asked to
    #[error("{0} server stopped unexpectedly")]
    UnexpectedStop(&'static str),

    /// One of the server tasks panicked or was cancelled
    #[error("{name} server task failed: {source}")]
    Task {
        name: &'static str,
        source: tokio::task::JoinError,
    },
}
