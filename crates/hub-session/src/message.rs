//! Client message envelope
//!
//! Every message pushed to a client connection, and every command a client
//! sends back, uses the same `{ "type": ..., "data": ... }` shape.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Session state: a nested JSON object
pub type SessionState = Map<String, Value>;

/// Message discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MessageType {
    /// Full session state snapshot (server → client) or partial update (client → server)
    SetState,
    /// The session was reset
    NewSession,
}

impl MessageType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SetState => "setState",
            Self::NewSession => "newSession",
        }
    }
}

impl std::fmt::Display for MessageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client message format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientMessage {
    #[serde(rename = "type")]
    pub kind: MessageType,

    /// Payload; `null` when the message carries none
    #[serde(default)]
    pub data: Value,
}

impl ClientMessage {
    /// Create a `setState` message carrying a state snapshot
    #[must_use]
    pub fn set_state(state: &SessionState) -> Self {
        Self {
            kind: MessageType::SetState,
            data: Value::Object(state.clone()),
        }
    }

    /// Create a `newSession` message
    #[must_use]
    pub fn new_session() -> Self {
        Self {
            kind: MessageType::NewSession,
            data: Value::Null,
        }
    }

    /// Borrow the payload as a state object, if it is one
    pub fn as_state(&self) -> Option<&SessionState> {
        match (&self.kind, &self.data) {
            (MessageType::SetState, Value::Object(map)) => Some(map),
            _ => None,
        }
    }

    /// Take the payload as a state object, if it is one
    pub fn into_state(self) -> Option<SessionState> {
        match (self.kind, self.data) {
            (MessageType::SetState, Value::Object(map)) => Some(map),
            _ => None,
        }
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl std::fmt::Display for ClientMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ClientMessage(type={})", self.kind)
    }
}
