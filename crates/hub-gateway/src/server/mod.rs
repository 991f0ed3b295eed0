//! Gateway server setup
//!
//! Provides the main WebSocket server configuration and routes.

mod handler;
mod state;

pub use handler::gateway_handler;
pub use state::GatewayState;

use axum::{routing::get, Router};
use hub_common::{AppConfig, AppError};
use hub_session::{SessionConfig, SessionRegistry};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Create the gateway router
pub fn create_router() -> Router<GatewayState> {
    Router::new()
        .route("/gateway/:client_id", get(gateway_handler))
        .route("/health", get(health_check))
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Build the complete application
pub fn create_app(state: GatewayState) -> Router {
    create_router()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Create `GatewayState` from configuration
pub fn create_gateway_state(config: AppConfig) -> GatewayState {
    let registry = SessionRegistry::new_shared(SessionConfig {
        max_connections: config.session.max_connections,
    });

    GatewayState::new(registry, config)
}

/// Serve the application on an already bound listener
pub async fn serve(listener: TcpListener, app: Router) -> Result<(), AppError> {
    axum::serve(listener, app)
        .await
        .map_err(AppError::server)
}

/// Run the gateway server
pub async fn run_server(app: Router, addr: &str) -> Result<(), AppError> {
    tracing::info!("Starting Gateway server on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {addr}: {e}")))?;

    tracing::info!("Gateway listening on ws://{}/gateway/{{client_id}}", addr);

    serve(listener, app).await
}

/// Run the complete gateway server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr = config.gateway.address();

    // Create gateway state
    let state = create_gateway_state(config);

    // Build application
    let app = create_app(state);

    // Run server
    run_server(app, &addr).await
}
