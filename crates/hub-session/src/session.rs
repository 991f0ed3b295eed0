//! Client session
//!
//! One logical client reachable through zero or more transport connections.

use crate::connection::{Connection, ConnectionId};
use crate::merge::deep_merge;
use crate::message::{ClientMessage, SessionState};

/// Capacity of a session unless configured otherwise
pub const DEFAULT_MAX_CONNECTIONS: usize = 1;

/// Authoritative state and fan-out for one logical client
///
/// While detached, outbound messages are buffered and replayed to the next
/// connection that attaches. While attached, every message goes to every
/// connection. Exactly one attached connection is the main connection.
///
/// All methods take `&mut self` and complete synchronously; wrap the session
/// in a single mutex when it is shared between threads.
pub struct ClientSession<C> {
    /// Attached connections, oldest first
    connections: Vec<C>,

    /// `Some` iff `connections` is non-empty
    main_connection: Option<ConnectionId>,

    /// Deep merge of every update since construction or the last reset
    state: SessionState,

    /// Only non-empty while detached
    pending_messages: Vec<ClientMessage>,

    max_connections: usize,
}

impl<C: Connection> ClientSession<C> {
    /// Create a session accepting a single connection
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_connections(DEFAULT_MAX_CONNECTIONS)
    }

    /// Create a session accepting up to `max_connections` simultaneous connections
    #[must_use]
    pub fn with_max_connections(max_connections: usize) -> Self {
        Self {
            connections: Vec::new(),
            main_connection: None,
            state: SessionState::new(),
            pending_messages: Vec::new(),
            max_connections,
        }
    }

    /// Whether `connection` may be attached right now.
    ///
    /// Callers must check this before [`attach`](Self::attach).
    pub fn can_attach(&self, connection: &C) -> bool {
        self.connections.len() < self.max_connections && !self.contains(&connection.id())
    }

    /// Attach a connection, sync it to the current state and replay the buffer.
    ///
    /// Capacity is not re-checked here.
    pub fn attach(&mut self, connection: C) {
        let connection_id = connection.id();

        if !self.contains(&connection_id) {
            self.connections.push(connection);
        }

        if self.connections.len() == 1 {
            self.main_connection = Some(connection_id);
        }

        tracing::debug!(
            connection_id = %connection_id,
            connections = self.connections.len(),
            pending = self.pending_messages.len(),
            "Connection attached"
        );

        let snapshot = ClientMessage::set_state(&self.state);
        self.send(snapshot);

        for message in std::mem::take(&mut self.pending_messages) {
            self.send(message);
        }
    }

    /// Detach a connection, electing a new main connection if needed.
    ///
    /// Returns the removed connection, or `None` if it was not attached.
    pub fn detach(&mut self, connection_id: &ConnectionId) -> Option<C> {
        let index = self
            .connections
            .iter()
            .position(|c| c.id() == *connection_id)?;
        let removed = self.connections.remove(index);

        if self.is_main(connection_id) {
            // Oldest remaining connection takes over
            self.main_connection = self.connections.first().map(Connection::id);

            if let Some(main) = self.main_connection {
                tracing::debug!(
                    previous = %connection_id,
                    main_connection = %main,
                    "Main connection re-elected"
                );
            }
        }

        tracing::debug!(
            connection_id = %connection_id,
            connections = self.connections.len(),
            "Connection detached"
        );

        Some(removed)
    }

    /// Whether `connection_id` is the main connection
    pub fn is_main(&self, connection_id: &ConnectionId) -> bool {
        self.main_connection.as_ref() == Some(connection_id)
    }

    /// Merge a partial update into the state and broadcast the full result.
    ///
    /// While detached the update is absorbed silently: nothing is sent or
    /// buffered, the next attach receives it as part of the snapshot.
    pub fn set_state(&mut self, patch: SessionState) {
        deep_merge(&mut self.state, patch);

        if self.is_detached() {
            tracing::trace!("State updated while detached");
            return;
        }

        let snapshot = ClientMessage::set_state(&self.state);
        self.send(snapshot);
    }

    /// Reset the state and the buffer, then announce a new session.
    ///
    /// If detached, the `newSession` message becomes the first thing replayed
    /// to the next connection.
    pub fn dispatch_new_session(&mut self) {
        self.pending_messages.clear();
        self.state.clear();

        tracing::debug!(connections = self.connections.len(), "New session dispatched");

        self.send(ClientMessage::new_session());
    }

    /// Deliver a message to every attached connection, or buffer it while detached.
    pub fn send(&mut self, message: ClientMessage) {
        if self.is_detached() {
            tracing::trace!(message = %message, "Buffering message while detached");
            self.pending_messages.push(message);
            return;
        }

        let text = match message.to_json() {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(message = %message, error = %e, "Failed to serialize message");
                return;
            }
        };

        for connection in &self.connections {
            connection.send(&text);
        }

        tracing::trace!(
            message = %message,
            sent = self.connections.len(),
            "Message sent to session connections"
        );
    }

    // === Accessors ===

    /// Current merged state
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// The main connection, if any connection is attached
    pub fn main_connection(&self) -> Option<ConnectionId> {
        self.main_connection
    }

    /// Messages waiting for the next attach
    pub fn pending_messages(&self) -> &[ClientMessage] {
        &self.pending_messages
    }

    pub fn max_connections(&self) -> usize {
        self.max_connections
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Check whether no connection is attached
    pub fn is_detached(&self) -> bool {
        self.connections.is_empty()
    }

    pub fn contains(&self, connection_id: &ConnectionId) -> bool {
        self.connections.iter().any(|c| c.id() == *connection_id)
    }

    /// IDs of attached connections, oldest first
    pub fn connection_ids(&self) -> Vec<ConnectionId> {
        self.connections.iter().map(Connection::id).collect()
    }
}

impl<C: Connection> Default for ClientSession<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> std::fmt::Debug for ClientSession<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientSession")
            .field("connections", &self.connections.len())
            .field("main_connection", &self.main_connection)
            .field("pending_messages", &self.pending_messages.len())
            .field("max_connections", &self.max_connections)
            .finish_non_exhaustive()
    }
}
