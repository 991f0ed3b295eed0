//! `setState` handler

use super::HandlerResult;
use crate::connection::GatewayConnection;
use hub_session::{ConnectionId, SessionState, SharedSession};

/// Applies partial state updates sent by any attached connection
pub struct StateHandler;

impl StateHandler {
    /// Merge the update and broadcast the result to every connection
    pub fn handle(
        session: &SharedSession<GatewayConnection>,
        connection_id: ConnectionId,
        patch: SessionState,
    ) -> HandlerResult<()> {
        tracing::trace!(
            connection_id = %connection_id,
            keys = patch.len(),
            "Applying state update"
        );

        session.lock().set_state(patch);

        Ok(())
    }
}
