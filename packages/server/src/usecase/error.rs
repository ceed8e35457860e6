//! UseCase layer error definitions.

use thiserror::Error;

use crate::domain::ConnectionId;

/// Errors returned when registering a connection
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConnectError {
    #[error("connection {0} is already registered")]
    DuplicateConnection(ConnectionId),
}
