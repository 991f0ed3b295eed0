//! Transport handles
//!
//! A session never owns a transport. It only needs a stable identity for
//! membership checks and a way to push already-serialized text.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Stable identity of a single transport connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    /// Generate a fresh random ID
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for ConnectionId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A transport a session can deliver to
///
/// `send` is fire-and-forget: it must not block and it reports nothing back.
/// Delivery failures belong to the transport layer.
pub trait Connection {
    /// Identity used for set membership and main-connection tracking
    fn id(&self) -> ConnectionId;

    /// Best-effort delivery of one serialized message
    fn send(&self, text: &str);
}
