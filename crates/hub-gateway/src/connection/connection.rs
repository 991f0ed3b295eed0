//! Individual WebSocket connection
//!
//! The session-facing half of a socket: an identity plus a channel into the
//! socket's writer loop.

use hub_session::{Connection, ConnectionId};
use tokio::sync::mpsc;

/// A single WebSocket connection as seen by a client session
#[derive(Clone)]
pub struct GatewayConnection {
    id: ConnectionId,

    /// Serialized messages waiting to be written to the socket
    sender: mpsc::UnboundedSender<String>,
}

impl GatewayConnection {
    /// Create a connection writing into `sender`
    pub fn new(sender: mpsc::UnboundedSender<String>) -> Self {
        Self {
            id: ConnectionId::new(),
            sender,
        }
    }

    /// Create a connection together with the receiving end of its channel
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    /// Check if the writer side has gone away
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

impl Connection for GatewayConnection {
    fn id(&self) -> ConnectionId {
        self.id
    }

    fn send(&self, text: &str) {
        if self.sender.send(text.to_owned()).is_err() {
            tracing::trace!(connection_id = %self.id, "Dropped message for closed connection");
        }
    }
}

impl std::fmt::Debug for GatewayConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConnection")
            .field("id", &self.id)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}
