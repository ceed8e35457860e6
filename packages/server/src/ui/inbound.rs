//! UDP receive loop.

use std::net::SocketAddr;

use tokio::net::UdpSocket;

use crate::{
    domain::{MAX_PAYLOAD_SIZE, Payload},
    error::ServerError,
    infrastructure::codec::osc,
    usecase::BroadcastPayloadUseCase,
};

/// Receives datagrams and hands each one to the broadcaster.
///
/// The loop is the only reader of the socket, so payloads are broadcast in
/// the order they were received.
pub struct InboundListener {
    socket: UdpSocket,
    local_addr: SocketAddr,
    broadcast: BroadcastPayloadUseCase,
}

impl InboundListener {
    /// Bind the UDP socket.
    ///
    /// # Errors
    ///
    /// Returns `ServerError::InboundBind` if the address cannot be resolved
    /// or bound.
    pub async fn bind(
        host: &str,
        port: u16,
        broadcast: BroadcastPayloadUseCase,
    ) -> Result<Self, ServerError> {
        let bind_error = |source| ServerError::InboundBind {
            addr: format!("{host}:{port}"),
            source,
        };
        let socket = UdpSocket::bind((host, port)).await.map_err(bind_error)?;
        let local_addr = socket.local_addr().map_err(bind_error)?;

        Ok(Self {
            socket,
            local_addr,
            broadcast,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Receive until the socket fails.
    ///
    /// Every datagram is forwarded unmodified, whether or not it decodes as
    /// OSC. Decoding only feeds the debug log.
    pub async fn run(self) -> Result<(), ServerError> {
        let mut buf = vec![0u8; MAX_PAYLOAD_SIZE];
        loop {
            let (len, peer) = self
                .socket
                .recv_from(&mut buf)
                .await
                .map_err(|source| ServerError::InboundReceive {
                    addr: self.local_addr,
                    source,
                })?;
            let datagram = &buf[..len];

            log_datagram(datagram, peer);
            self.broadcast
                .execute(Payload::copy_from_slice(datagram))
                .await;
        }
    }
}

fn log_datagram(datagram: &[u8], peer: SocketAddr) {
    if !tracing::enabled!(tracing::Level::DEBUG) {
        return;
    }
    match osc::decode(datagram) {
        Ok(packet) => tracing::debug!("Received OSC packet from {}: {}", peer, packet),
        Err(e) => tracing::debug!(
            "Received {} bytes from {} that are not valid OSC ({}), forwarding anyway",
            datagram.len(),
            peer,
            e
        ),
    }
}
