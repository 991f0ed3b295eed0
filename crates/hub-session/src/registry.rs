//! Session registry
//!
//! Owns every [`ClientSession`] by client ID and routes transport connects and
//! disconnects to them. Uses `DashMap` for concurrent access; each session is
//! guarded by its own mutex.

use crate::connection::{Connection, ConnectionId};
use crate::session::{ClientSession, DEFAULT_MAX_CONNECTIONS};
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;
use thiserror::Error;

/// A session shared between the tasks serving its connections
pub type SharedSession<C> = Arc<Mutex<ClientSession<C>>>;

/// Settings applied to sessions created by the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub max_connections: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

/// Reasons a connection is refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The connection is already attached to this client
    #[error("Connection {0} is already attached")]
    AlreadyAttached(ConnectionId),

    /// The client already has as many connections as it may hold
    #[error("Client already has the maximum of {max} connections")]
    CapacityReached { max: usize },
}

/// Registry of client sessions
pub struct SessionRegistry<C> {
    /// Sessions by client ID
    sessions: DashMap<String, SharedSession<C>>,

    config: SessionConfig,
}

impl<C: Connection> SessionRegistry<C> {
    /// Create a new registry
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        Self {
            sessions: DashMap::new(),
            config,
        }
    }

    /// Create a new registry wrapped in Arc
    #[must_use]
    pub fn new_shared(config: SessionConfig) -> Arc<Self> {
        Arc::new(Self::new(config))
    }

    /// Get the session for a client, creating it on first use
    pub fn session(&self, client_id: &str) -> SharedSession<C> {
        if let Some(existing) = self.sessions.get(client_id) {
            return existing.clone();
        }

        self.sessions
            .entry(client_id.to_string())
            .or_insert_with(|| {
                tracing::debug!(
                    client_id = %client_id,
                    max_connections = self.config.max_connections,
                    "Session created"
                );
                Arc::new(Mutex::new(ClientSession::with_max_connections(
                    self.config.max_connections,
                )))
            })
            .clone()
    }

    /// Get an existing session
    pub fn get(&self, client_id: &str) -> Option<SharedSession<C>> {
        self.sessions.get(client_id).map(|r| r.clone())
    }

    /// Attach a connection to a client's session if it has room
    ///
    /// The capacity check and the attach happen under one lock.
    pub fn connect(&self, client_id: &str, connection: C) -> Result<SharedSession<C>, RegistryError> {
        let session = self.session(client_id);

        {
            let mut guard = session.lock();
            let connection_id = connection.id();

            if !guard.can_attach(&connection) {
                let err = if guard.contains(&connection_id) {
                    RegistryError::AlreadyAttached(connection_id)
                } else {
                    RegistryError::CapacityReached {
                        max: guard.max_connections(),
                    }
                };

                tracing::debug!(
                    client_id = %client_id,
                    connection_id = %connection_id,
                    error = %err,
                    "Connection refused"
                );

                return Err(err);
            }

            guard.attach(connection);

            tracing::info!(
                client_id = %client_id,
                connection_id = %connection_id,
                main = guard.is_main(&connection_id),
                "Client connection attached"
            );
        }

        Ok(session)
    }

    /// Detach a connection from a client's session
    ///
    /// Returns whether the connection was attached. The session itself is kept
    /// so its state survives until the client comes back.
    pub fn disconnect(&self, client_id: &str, connection_id: &ConnectionId) -> bool {
        let Some(session) = self.get(client_id) else {
            return false;
        };

        let detached = session.lock().detach(connection_id).is_some();

        if detached {
            tracing::info!(
                client_id = %client_id,
                connection_id = %connection_id,
                "Client connection detached"
            );
        }

        detached
    }

    /// Drop a client's session entirely
    pub fn remove(&self, client_id: &str) -> Option<SharedSession<C>> {
        let removed = self.sessions.remove(client_id).map(|(_, s)| s);

        if removed.is_some() {
            tracing::debug!(client_id = %client_id, "Session removed");
        }

        removed
    }

    /// Get the number of known sessions
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Get all client IDs
    pub fn client_ids(&self) -> Vec<String> {
        self.sessions.iter().map(|r| r.key().clone()).collect()
    }

    /// Get the total number of attached connections across all sessions
    pub fn connection_count(&self) -> usize {
        self.sessions
            .iter()
            .map(|r| r.value().lock().connection_count())
            .sum()
    }

    pub fn config(&self) -> SessionConfig {
        self.config
    }
}

impl<C> std::fmt::Debug for SessionRegistry<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRegistry")
            .field("sessions", &self.sessions.len())
            .field("config", &self.config)
            .finish()
    }
}
