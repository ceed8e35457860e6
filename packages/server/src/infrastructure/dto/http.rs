//! HTTP API response DTOs for the status endpoints.

use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthDto {
    pub status: String,
    pub clients: usize,
}

/// Registered client for the client list endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientSummaryDto {
    pub id: String,
    pub peer: String,
    pub connected_at: String, // RFC 3339
}
