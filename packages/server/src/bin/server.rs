//! OSC relay server.
//!
//! Receives OSC datagrams over UDP and broadcasts them to all connected
//! WebSocket clients.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin osc-relay -- --verbose
//! ```

use clap::Parser;
use osc_relay_server::config::Cli;
use osc_relay_shared::logger::setup_logger;

#[tokio::main]
async fn main() {
    let config = Cli::parse().into_config();

    // Initialize tracing
    let level = if config.verbose { "debug" } else { "info" };
    setup_logger(env!("CARGO_BIN_NAME"), level);

    // Run the server
    if let Err(e) = osc_relay_server::run_server(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
