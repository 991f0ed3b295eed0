//! `newSession` handler

use super::{HandlerError, HandlerResult};
use crate::connection::GatewayConnection;
use hub_session::{ConnectionId, SharedSession};

/// Resets the session on request of the main connection
pub struct NewSessionHandler;

impl NewSessionHandler {
    pub fn handle(
        session: &SharedSession<GatewayConnection>,
        connection_id: ConnectionId,
    ) -> HandlerResult<()> {
        let mut guard = session.lock();

        if !guard.is_main(&connection_id) {
            return Err(HandlerError::NotMainConnection);
        }

        guard.dispatch_new_session();

        tracing::info!(connection_id = %connection_id, "Session reset by main connection");

        Ok(())
    }
}
