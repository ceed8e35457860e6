//! Relay configuration and its command-line surface.

use clap::Parser;

pub const DEFAULT_UDP_HOST: &str = "127.0.0.1";
pub const DEFAULT_UDP_PORT: u16 = 57121;
pub const DEFAULT_WS_HOST: &str = "localhost";
pub const DEFAULT_WS_PORT: u16 = 8080;

/// Immutable server configuration, built once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Host the UDP socket binds to
    pub udp_host: String,
    /// Port the UDP socket binds to
    pub udp_port: u16,
    /// Host the WebSocket listener binds to
    pub ws_host: String,
    /// Port the WebSocket listener binds to
    pub ws_port: u16,
    /// Emit debug-level events
    pub verbose: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            udp_host: DEFAULT_UDP_HOST.to_string(),
            udp_port: DEFAULT_UDP_PORT,
            ws_host: DEFAULT_WS_HOST.to_string(),
            ws_port: DEFAULT_WS_PORT,
            verbose: false,
        }
    }
}

impl ServerConfig {
    /// `host:port` of the inbound socket, for log and error messages
    pub fn udp_endpoint(&self) -> String {
        format!("{}:{}", self.udp_host, self.udp_port)
    }

    /// `host:port` of the WebSocket listener, for log and error messages
    pub fn ws_endpoint(&self) -> String {
        format!("{}:{}", self.ws_host, self.ws_port)
    }
}

/// Relay OSC messages received over UDP to every connected WebSocket client.
#[derive(Debug, Parser)]
#[command(name = "osc-relay", version)]
pub struct Cli {
    /// Host to receive UDP datagrams on
    #[arg(long, default_value = DEFAULT_UDP_HOST)]
    pub udp_host: String,

    /// Port to receive UDP datagrams on
    #[arg(long, default_value_t = DEFAULT_UDP_PORT)]
    pub udp_port: u16,

    /// Host to accept WebSocket clients on
    #[arg(long, default_value = DEFAULT_WS_HOST)]
    pub ws_host: String,

    /// Port to accept WebSocket clients on
    #[arg(long, default_value_t = DEFAULT_WS_PORT)]
    pub ws_port: u16,

    /// Log every datagram, connection and broadcast
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn into_config(self) -> ServerConfig {
        ServerConfig {
            udp_host: self.udp_host,
            udp_port: self.udp_port,
            ws_host: self.ws_host,
            ws_port: self.ws_port,
            verbose: self.verbose,
        }
    }
}
