//! Client Hub Gateway entry point
//!
//! Run with:
//! ```bash
//! cargo run -p hub-gateway
//! ```
//!
//! Configuration is loaded from environment variables.

use hub_common::{try_init_tracing_with_config, AppConfig, TracingConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Configuration decides the log format, so load it first
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = try_init_tracing_with_config(TracingConfig::for_environment(config.app.env)) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    info!(
        name = %config.app.name,
        env = ?config.app.env,
        address = %config.gateway.address(),
        max_connections = config.session.max_connections,
        "Starting Client Hub Gateway..."
    );

    if let Err(e) = hub_gateway::run(config).await {
        error!(error = %e, code = e.error_code(), "Gateway failed");
        std::process::exit(1);
    }
}
