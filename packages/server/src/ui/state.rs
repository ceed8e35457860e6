//! Server state shared by the HTTP and WebSocket handlers.

use std::sync::Arc;

use tokio::sync::watch;

use crate::domain::ConnectionRepository;

/// Shared application state
pub struct AppState {
    /// Registry of connected WebSocket clients (shared with the broadcaster)
    pub repository: Arc<dyn ConnectionRepository>,
    /// Flips to `true` once the relay starts shutting down
    shutdown: watch::Receiver<bool>,
}

impl AppState {
    pub fn new(repository: Arc<dyn ConnectionRepository>, shutdown: watch::Receiver<bool>) -> Self {
        Self {
            repository,
            shutdown,
        }
    }

    pub fn is_shutting_down(&self) -> bool {
        *self.shutdown.borrow()
    }
}
