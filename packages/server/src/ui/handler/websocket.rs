//! WebSocket connection handlers.

use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{
        ConnectInfo, State,
        ws::{Message, WebSocket, WebSocketUpgrade, rejection::WebSocketUpgradeRejection},
    },
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use osc_relay_shared::time::get_timestamp_millis;
use tokio::sync::mpsc;

use crate::{
    domain::{Connection, ConnectionIdFactory, Outbound, Timestamp},
    ui::{
        handler::http::{health_check, list_clients},
        state::AppState,
    },
    usecase::{ConnectClientUseCase, ConnectError, DisconnectClientUseCase, DisconnectReason},
};

/// Upgrade any request on any path to a WebSocket.
///
/// Plain `GET /api/health` and `GET /api/clients` are answered with JSON;
/// every other non-upgrade request gets `400 Bad Request`.
pub async fn websocket_handler(
    upgrade: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
    method: Method,
    uri: Uri,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let ws = match upgrade {
        Ok(ws) => ws,
        Err(rejection) => {
            let is_get = method == Method::GET;
            return match uri.path() {
                "/api/health" if is_get => health_check(&state).await.into_response(),
                "/api/clients" if is_get => list_clients(&state).await.into_response(),
                _ => {
                    tracing::warn!("Rejecting non-upgrade request from {}: {}", peer, rejection);
                    (StatusCode::BAD_REQUEST, "Expected a WebSocket upgrade request")
                        .into_response()
                }
            };
        }
    };

    ws.on_failed_upgrade(move |e| {
        tracing::error!("WebSocket handshake with {} failed: {}", peer, e);
    })
    .on_upgrade(move |socket| handle_socket(socket, state, peer))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, peer: SocketAddr) {
    // Create a channel for the broadcaster to reach this client
    let (tx, mut rx) = mpsc::unbounded_channel();
    let connection = Connection::new(
        ConnectionIdFactory::generate(),
        peer,
        Timestamp::new(get_timestamp_millis()),
        tx,
    );
    let id = connection.id;

    match register_connection(&state, connection).await {
        Ok(count) => {
            tracing::debug!(
                "Client {} connected from {}, {} client(s) connected",
                id,
                peer,
                count
            );
        }
        Err(e) => {
            tracing::warn!("Rejecting client from {}: {}", peer, e);
            return;
        }
    }

    let (mut sender, mut receiver) = socket.split();

    // Spawn a task to write relayed payloads to this client
    let mut send_task = tokio::spawn(async move {
        while let Some(outbound) = rx.recv().await {
            match outbound {
                Outbound::Payload(payload) => {
                    sender
                        .send(Message::Binary(payload.into_bytes()))
                        .await
                        .map_err(|e| DisconnectReason::Error(e.to_string()))?;
                }
                Outbound::Close => {
                    let _ = sender.send(Message::Close(None)).await;
                    break;
                }
            }
        }
        Ok::<_, DisconnectReason>(())
    });

    // Spawn a task to watch for close frames and transport errors.
    // After a close frame the stream is polled until it ends so the close reply
    // gets flushed.
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Close(_)) => tracing::trace!("Client {} sent a close frame", id),
                Ok(Message::Ping(_)) => tracing::trace!("Received ping from {}", id),
                Ok(_) => tracing::trace!("Ignoring frame from client {}", id),
                Err(e) => return DisconnectReason::Error(e.to_string()),
            }
        }
        DisconnectReason::Closed
    });

    // If any one of the tasks completes, abort the other
    let reason = tokio::select! {
        result = &mut recv_task => {
            send_task.abort();
            result.unwrap_or_else(|e| DisconnectReason::Error(e.to_string()))
        }
        result = &mut send_task => {
            recv_task.abort();
            match result {
                Ok(Ok(())) => DisconnectReason::Closed,
                Ok(Err(reason)) => reason,
                Err(e) => DisconnectReason::Error(e.to_string()),
            }
        }
    };

    let disconnect_usecase = DisconnectClientUseCase::new(state.repository.clone());
    if disconnect_usecase.execute(&id, &reason).await.is_none() {
        tracing::debug!("Client {} was already removed ({})", id, reason);
    }
}

/// Add the connection to the registry.
///
/// A connection registered after shutdown began may have missed the drain, so
/// it is told to close right away.
async fn register_connection(
    state: &AppState,
    connection: Connection,
) -> Result<usize, ConnectError> {
    let closer = connection.clone();
    let connect_usecase = ConnectClientUseCase::new(state.repository.clone());
    let count = connect_usecase.execute(connection).await?;

    if state.is_shutting_down() {
        tracing::debug!("Client {} connected during shutdown, closing", closer.id);
        let _ = closer.close();
    }

    Ok(count)
}
