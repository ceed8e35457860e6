//! HTTP status endpoint handlers.

use axum::Json;
use osc_relay_shared::time::timestamp_to_rfc3339;

use crate::{
    infrastructure::dto::http::{ClientSummaryDto, HealthDto},
    ui::state::AppState,
};

/// Health check endpoint
pub async fn health_check(state: &AppState) -> Json<HealthDto> {
    Json(HealthDto {
        status: "ok".to_string(),
        clients: state.repository.count().await,
    })
}

/// List connected WebSocket clients, oldest first
pub async fn list_clients(state: &AppState) -> Json<Vec<ClientSummaryDto>> {
    let mut connections = state.repository.snapshot().await;
    connections.sort_by_key(|connection| connection.connected_at);

    let clients = connections
        .into_iter()
        .map(|connection| ClientSummaryDto {
            id: connection.id.to_string(),
            peer: connection.peer.to_string(),
            connected_at: timestamp_to_rfc3339(connection.connected_at.value()),
        })
        .collect();

    Json(clients)
}
