//! Shared fixtures for relay integration tests.
#![allow(dead_code)]

use std::{net::SocketAddr, sync::Arc, time::Duration};

use futures_util::StreamExt;
use osc_relay_server::{Relay, ServerConfig, ServerError, domain::ConnectionRepository};
use tokio::{
    net::{TcpStream, UdpSocket},
    sync::oneshot,
    task::JoinHandle,
};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, tungstenite::Message};

pub type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub const WAIT_TIMEOUT: Duration = Duration::from_secs(5);

/// In-process relay bound to ephemeral ports on loopback
pub struct TestServer {
    pub udp_addr: SocketAddr,
    pub ws_addr: SocketAddr,
    repository: Arc<dyn ConnectionRepository>,
    producer: UdpSocket,
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<Result<(), ServerError>>,
}

impl TestServer {
    pub fn config() -> ServerConfig {
        ServerConfig {
            udp_host: "127.0.0.1".to_string(),
            udp_port: 0,
            ws_host: "127.0.0.1".to_string(),
            ws_port: 0,
            verbose: true,
        }
    }

    pub async fn start() -> Self {
        let relay = Relay::bind(Self::config())
            .await
            .expect("Failed to bind relay");
        let udp_addr = relay.udp_addr();
        let ws_addr = relay.ws_addr();
        let repository = relay.repository();

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(relay.serve(async {
            let _ = shutdown_rx.await;
        }));

        let producer = UdpSocket::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind producer socket");

        Self {
            udp_addr,
            ws_addr,
            repository,
            producer,
            shutdown: Some(shutdown_tx),
            handle,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.ws_addr)
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}/", self.ws_addr)
    }

    pub async fn client_count(&self) -> usize {
        self.repository.count().await
    }

    /// Connect a consumer and wait until the relay has registered it
    pub async fn connect(&self) -> WsClient {
        self.connect_path("/").await
    }

    /// Same as [`TestServer::connect`], upgrading on the given request path
    pub async fn connect_path(&self, path: &str) -> WsClient {
        let before = self.client_count().await;
        let url = format!("ws://{}{}", self.ws_addr, path);
        let (client, _response) = tokio_tungstenite::connect_async(url)
            .await
            .expect("Failed to connect WebSocket client");
        self.wait_for_clients(before + 1).await;
        client
    }

    /// Send one datagram as a producer would
    pub async fn send_datagram(&self, data: &[u8]) {
        self.producer
            .send_to(data, self.udp_addr)
            .await
            .expect("Failed to send datagram");
    }

    /// Poll the registry until it holds exactly `expected` clients
    pub async fn wait_for_clients(&self, expected: usize) {
        tokio::time::timeout(WAIT_TIMEOUT, async {
            while self.client_count().await != expected {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap_or_else(|_| panic!("registry never reached {expected} client(s)"));
    }

    /// Trigger shutdown and return what `Relay::serve` returned
    pub async fn shutdown(mut self) -> Result<(), ServerError> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        (&mut self.handle).await.expect("Relay task panicked")
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Next binary frame from the relay, skipping control frames
pub async fn next_binary(client: &mut WsClient) -> Vec<u8> {
    tokio::time::timeout(WAIT_TIMEOUT, async {
        loop {
            let msg = client
                .next()
                .await
                .expect("Stream ended")
                .expect("WebSocket error");
            match msg {
                Message::Binary(data) => return data.to_vec(),
                Message::Ping(_) | Message::Pong(_) => continue,
                other => panic!("Unexpected frame: {other:?}"),
            }
        }
    })
    .await
    .expect("Timed out waiting for a binary frame")
}

/// Assert nothing arrives for a short while
pub async fn assert_no_frame(client: &mut WsClient) {
    let result = tokio::time::timeout(Duration::from_millis(200), client.next()).await;
    assert!(result.is_err(), "Unexpected frame: {result:?}");
}
