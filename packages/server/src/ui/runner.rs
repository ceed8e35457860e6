//! Relay startup and supervision.

use std::{future::Future, net::SocketAddr, sync::Arc, time::Duration};

use axum::Router;
use tokio::{net::TcpListener, sync::watch, task::JoinError};
use tower_http::trace::TraceLayer;

use crate::{
    config::ServerConfig,
    domain::ConnectionRepository,
    error::ServerError,
    infrastructure::repository::InMemoryConnectionRepository,
    ui::{
        handler::websocket_handler,
        inbound::InboundListener,
        signal::shutdown_signal,
        state::AppState,
    },
    usecase::{BroadcastPayloadUseCase, CloseAllClientsUseCase},
};

/// Time given to writer tasks to flush close frames before returning.
const CLOSE_FLUSH_GRACE: Duration = Duration::from_millis(100);

/// Build the HTTP router. Every path and method goes to the WebSocket handler,
/// which also answers the status endpoints.
pub fn create_app(state: Arc<AppState>) -> Router {
    Router::new()
        .fallback(websocket_handler)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Both endpoints bound and ready to serve.
pub struct Relay {
    repository: Arc<dyn ConnectionRepository>,
    inbound: InboundListener,
    outbound: TcpListener,
    ws_addr: SocketAddr,
}

impl Relay {
    /// Bind the UDP socket and the WebSocket listener.
    ///
    /// # Errors
    ///
    /// Fails if either endpoint cannot be bound.
    pub async fn bind(config: ServerConfig) -> Result<Self, ServerError> {
        let repository: Arc<dyn ConnectionRepository> =
            Arc::new(InMemoryConnectionRepository::new());

        let inbound = InboundListener::bind(
            &config.udp_host,
            config.udp_port,
            BroadcastPayloadUseCase::new(repository.clone()),
        )
        .await?;

        let outbound_error = |source| ServerError::OutboundBind {
            addr: config.ws_endpoint(),
            source,
        };
        let outbound = TcpListener::bind((config.ws_host.as_str(), config.ws_port))
            .await
            .map_err(outbound_error)?;
        let ws_addr = outbound.local_addr().map_err(outbound_error)?;

        tracing::info!("Receiving OSC over UDP on {}", inbound.local_addr());
        tracing::info!("Accepting WebSocket clients on ws://{}", ws_addr);

        Ok(Self {
            repository,
            inbound,
            outbound,
            ws_addr,
        })
    }

    /// Address the UDP socket is bound to
    pub fn udp_addr(&self) -> SocketAddr {
        self.inbound.local_addr()
    }

    /// Address the WebSocket listener is bound to
    pub fn ws_addr(&self) -> SocketAddr {
        self.ws_addr
    }

    /// Registry shared by the acceptor and the broadcaster
    pub fn repository(&self) -> Arc<dyn ConnectionRepository> {
        self.repository.clone()
    }

    /// Run both servers until `shutdown` resolves or either server stops.
    ///
    /// New connections stop being accepted, then all registered clients are
    /// closed and the registry drained before this returns. Returns `Ok` only
    /// when `shutdown` fired.
    pub async fn serve<F>(self, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send,
    {
        let Relay {
            repository,
            inbound,
            outbound,
            ws_addr,
        } = self;

        let (stopping_tx, stopping_rx) = watch::channel(false);
        let app = create_app(Arc::new(AppState::new(
            repository.clone(),
            stopping_rx.clone(),
        )));

        let mut inbound_task = tokio::spawn(inbound.run());
        let mut outbound_task = tokio::spawn(async move {
            let mut stopping = stopping_rx;
            axum::serve(
                outbound,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .with_graceful_shutdown(async move {
                let _ = stopping.wait_for(|stop| *stop).await;
            })
            .await
            .map_err(|source| ServerError::OutboundServe {
                addr: ws_addr,
                source,
            })
        });

        let result = tokio::select! {
            result = &mut inbound_task => task_outcome("UDP", result),
            result = &mut outbound_task => task_outcome("WebSocket", result),
            _ = shutdown => {
                tracing::info!("Shutdown requested");
                Ok(())
            }
        };

        // Handshakes finishing after this point close themselves
        stopping_tx.send_replace(true);
        inbound_task.abort();

        let close_usecase = CloseAllClientsUseCase::new(repository);
        let closed = close_usecase.execute().await;
        if closed > 0 {
            tracing::info!("Closed {} client connection(s)", closed);
            tokio::time::sleep(CLOSE_FLUSH_GRACE).await;
        }
        outbound_task.abort();

        result
    }
}

/// Map a finished server task to the error that stops the relay.
fn task_outcome(
    name: &'static str,
    result: Result<Result<(), ServerError>, JoinError>,
) -> Result<(), ServerError> {
    match result {
        Ok(Ok(())) => Err(ServerError::UnexpectedStop(name)),
        Ok(Err(e)) => Err(e),
        Err(source) => Err(ServerError::Task { name, source }),
    }
}

/// Bind both endpoints and serve until a termination signal arrives.
pub async fn run(config: ServerConfig) -> Result<(), ServerError> {
    Relay::bind(config).await?.serve(shutdown_signal()).await
}
