//! Client message handlers
//!
//! Handles incoming WebSocket messages based on their type.

mod error;
mod new_session;
mod state;

pub use error::{HandlerError, HandlerResult};
pub use new_session::NewSessionHandler;
pub use state::StateHandler;

use crate::connection::GatewayConnection;
use crate::protocol::{ClientMessage, MessageType};
use hub_session::{ConnectionId, SharedSession};

/// Dispatch incoming client messages to appropriate handlers
pub struct MessageDispatcher;

impl MessageDispatcher {
    /// Handle an incoming client message
    pub fn dispatch(
        session: &SharedSession<GatewayConnection>,
        connection_id: ConnectionId,
        message: ClientMessage,
    ) -> HandlerResult<()> {
        match message.kind {
            MessageType::SetState => {
                let patch = message.into_state().ok_or_else(|| {
                    HandlerError::InvalidPayload("setState data must be an object".to_string())
                })?;

                StateHandler::handle(session, connection_id, patch)
            }
            MessageType::NewSession => NewSessionHandler::handle(session, connection_id),
        }
    }
}
