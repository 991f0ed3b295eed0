//! # hub-gateway
//!
//! WebSocket gateway: every socket on `/gateway/:client_id` becomes one
//! connection of that client's session.

pub mod connection;
pub mod handlers;
pub mod protocol;
pub mod server;

pub use server::{create_app, create_gateway_state, run, run_server, serve, GatewayState};
