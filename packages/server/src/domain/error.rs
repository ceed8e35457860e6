//! Domain layer error definitions.

use thiserror::Error;

use super::value_object::ConnectionId;

/// Errors raised when handing a frame to a connection's writer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SendError {
    /// The writer side of the connection has already gone away
    #[error("connection {0} is closed")]
    Closed(ConnectionId),
}
