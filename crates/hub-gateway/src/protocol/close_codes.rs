//! WebSocket close codes
//!
//! Gateway-specific close codes sent when the server ends a connection.

use hub_session::RegistryError;
use serde::{Deserialize, Serialize};

/// Gateway WebSocket close codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum CloseCode {
    /// Unknown error occurred
    UnknownError = 4000,
    /// Payload was not a valid client message
    DecodeError = 4002,
    /// The client already has its maximum number of connections
    TooManyConnections = 4005,
    /// This connection is already attached to the client
    AlreadyConnected = 4006,
}

impl CloseCode {
    /// Create a `CloseCode` from a raw u16 value
    #[must_use]
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            4000 => Some(Self::UnknownError),
            4002 => Some(Self::DecodeError),
            4005 => Some(Self::TooManyConnections),
            4006 => Some(Self::AlreadyConnected),
            _ => None,
        }
    }

    /// Get the raw u16 value
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Check if the client should attempt to reconnect after this close code
    #[must_use]
    pub const fn should_reconnect(self) -> bool {
        matches!(self, Self::UnknownError | Self::AlreadyConnected)
    }

    /// Get the description for this close code
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::UnknownError => "Unknown error occurred",
            Self::DecodeError => "Invalid payload encoding",
            Self::TooManyConnections => "Too many connections for this client",
            Self::AlreadyConnected => "Connection already attached",
        }
    }
}

impl From<&RegistryError> for CloseCode {
    fn from(err: &RegistryError) -> Self {
        match err {
            RegistryError::AlreadyAttached(_) => Self::AlreadyConnected,
            RegistryError::CapacityReached { .. } => Self::TooManyConnections,
        }
    }
}

impl std::fmt::Display for CloseCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.as_u16(), self.description())
    }
}
