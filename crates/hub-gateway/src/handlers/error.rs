//! Handler error types

use crate::protocol::CloseCode;
use thiserror::Error;

/// Handler error type
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Invalid payload received
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// A privileged command arrived from a secondary connection
    #[error("Only the main connection may do this")]
    NotMainConnection,
}

impl HandlerError {
    /// Convert to a close code; `None` keeps the connection open
    pub fn to_close_code(&self) -> Option<CloseCode> {
        match self {
            Self::InvalidPayload(_) => Some(CloseCode::DecodeError),
            Self::NotMainConnection => None,
        }
    }
}

/// Handler result type
pub type HandlerResult<T> = Result<T, HandlerError>;
