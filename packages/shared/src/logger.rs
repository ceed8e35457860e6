//! Logger setup shared by the osc-relay binaries.

use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber.
///
/// `default_level` applies to the binary's own crates when `RUST_LOG` is not
/// set. Every line carries a timestamp, the level and the target. Calling
/// this more than once is a no-op.
pub fn setup_logger(bin_name: &str, default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(bin_name, default_level)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}

/// Build the filter directives used when `RUST_LOG` is absent.
///
/// Our crates log at `default_level`; noisy dependencies stay at `info`.
fn default_directives(bin_name: &str, default_level: &str) -> String {
    let bin_target = bin_name.replace('-', "_");
    format!(
        "info,{bin_target}={default_level},osc_relay_server={default_level},osc_relay_shared={default_level},tower_http={default_level}"
    )
}
