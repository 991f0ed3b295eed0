//! Gateway state
//!
//! Application state for the gateway server.

use crate::connection::GatewayConnection;
use hub_common::AppConfig;
use hub_session::SessionRegistry;
use std::sync::Arc;

/// Gateway application state
///
/// Holds all shared dependencies for the gateway server.
#[derive(Clone)]
pub struct GatewayState {
    /// Client sessions by client ID
    registry: Arc<SessionRegistry<GatewayConnection>>,
    /// Application configuration
    config: Arc<AppConfig>,
}

impl GatewayState {
    /// Create a new gateway state
    pub fn new(registry: Arc<SessionRegistry<GatewayConnection>>, config: AppConfig) -> Self {
        Self {
            registry,
            config: Arc::new(config),
        }
    }

    /// Get the session registry
    pub fn registry(&self) -> &SessionRegistry<GatewayConnection> {
        &self.registry
    }

    /// Get the application configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

impl std::fmt::Debug for GatewayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayState")
            .field("registry", &self.registry)
            .field("config", &"AppConfig")
            .finish()
    }
}
