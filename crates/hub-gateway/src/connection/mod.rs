//! Connection management
//!
//! The websocket side of a session connection.

mod connection;

pub use connection::GatewayConnection;
