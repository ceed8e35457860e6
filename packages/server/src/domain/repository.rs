//! Registry contract for accepted connections.

use async_trait::async_trait;

use super::{entity::Connection, value_object::ConnectionId};

/// Concurrency-safe set of registered connections, keyed by identity.
///
/// Implementations are shared between the acceptor and the broadcaster, so
/// every method must be safe to call concurrently. All operations are total.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConnectionRepository: Send + Sync {
    /// Register a connection. Returns `false` if the identity is already
    /// present, in which case the registry is left untouched.
    async fn add(&self, connection: Connection) -> bool;

    /// Remove a connection if present. Removing an absent id is a no-op.
    async fn remove(&self, id: &ConnectionId) -> Option<Connection>;

    /// Remove every listed connection in one pass. Returns how many were
    /// actually present.
    async fn remove_many(&self, ids: &[ConnectionId]) -> usize;

    /// Number of registered connections.
    async fn count(&self) -> usize;

    /// Copy of the current members, safe to iterate while the registry is
    /// being mutated.
    async fn snapshot(&self) -> Vec<Connection>;

    /// Remove and return every member.
    async fn drain(&self) -> Vec<Connection>;
}
