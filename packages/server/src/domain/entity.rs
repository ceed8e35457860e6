//! Core domain models for the relay.

use std::net::SocketAddr;

use tokio::sync::mpsc::UnboundedSender;

use super::{
    error::SendError,
    value_object::{ConnectionId, Payload, Timestamp},
};

/// Frame handed to a connection's writer task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// Relay one payload as a single binary frame
    Payload(Payload),
    /// Ask the writer to close the socket
    Close,
}

/// Liveness of a registered connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    Open,
    Closed,
}

/// One accepted consumer link.
///
/// The connection never touches the socket itself. Frames are queued on an
/// unbounded channel drained by the writer task owned by the acceptor, so a
/// send never waits on the network.
#[derive(Debug, Clone)]
pub struct Connection {
    /// Connection identifier
    pub id: ConnectionId,
    /// Remote address of the consumer
    pub peer: SocketAddr,
    /// Timestamp when the handshake completed
    pub connected_at: Timestamp,
    sender: UnboundedSender<Outbound>,
}

impl Connection {
    /// Create a connection around the writer channel of an upgraded socket
    pub fn new(
        id: ConnectionId,
        peer: SocketAddr,
        connected_at: Timestamp,
        sender: UnboundedSender<Outbound>,
    ) -> Self {
        Self {
            id,
            peer,
            connected_at,
            sender,
        }
    }

    /// Current liveness, derived from whether the writer is still draining
    pub fn liveness(&self) -> Liveness {
        if self.sender.is_closed() {
            Liveness::Closed
        } else {
            Liveness::Open
        }
    }

    pub fn is_open(&self) -> bool {
        self.liveness() == Liveness::Open
    }

    /// Queue a payload for delivery
    ///
    /// # Errors
    ///
    /// Returns `SendError::Closed` if the writer has already stopped
    pub fn send(&self, payload: Payload) -> Result<(), SendError> {
        self.sender
            .send(Outbound::Payload(payload))
            .map_err(|_| SendError::Closed(self.id))
    }

    /// Ask the writer to close the socket
    ///
    /// # Errors
    ///
    /// Returns `SendError::Closed` if the writer has already stopped
    pub fn close(&self) -> Result<(), SendError> {
        self.sender
            .send(Outbound::Close)
            .map_err(|_| SendError::Closed(self.id))
    }
}
