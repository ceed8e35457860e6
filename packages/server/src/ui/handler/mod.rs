//! Handler modules for HTTP and WebSocket endpoints.

pub mod http;
pub mod websocket;

// Re-export WebSocket handlers
pub use websocket::websocket_handler;
