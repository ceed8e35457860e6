//! Domain layer for the relay.
//!
//! This module contains the connection model and the registry contract,
//! independent of the transports that feed and drain them.

pub mod entity;
pub mod error;
pub mod factory;
pub mod repository;
pub mod value_object;

pub use entity::{Connection, Liveness, Outbound};
pub use error::SendError;
pub use factory::ConnectionIdFactory;
pub use repository::ConnectionRepository;
#[cfg(test)]
pub use repository::MockConnectionRepository;
pub use value_object::{ConnectionId, MAX_PAYLOAD_SIZE, Payload, Timestamp};
