//! Integration test utilities for the client hub
//!
//! Spawns a gateway on an ephemeral port and drives it with real WebSocket
//! clients.

pub mod helpers;

pub use helpers::*;
