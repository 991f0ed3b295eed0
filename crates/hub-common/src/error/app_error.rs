//! Application error types
//!
//! Errors surfaced while configuring and running the hub services.

use crate::config::ConfigError;
use std::fmt;

/// Application-wide error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Listener / serve loop errors
    #[error("Server error: {0}")]
    Server(String),

    // Internal errors
    #[error("Internal server error")]
    Internal(#[source] anyhow::Error),
}

impl AppError {
    /// Get a stable error code for logs
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG_ERROR",
            Self::Server(_) => "SERVER_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Create a server error
    #[must_use]
    pub fn server(msg: impl fmt::Display) -> Self {
        Self::Server(msg.to_string())
    }

    /// Create an internal error from any error
    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self::Internal(err.into())
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
