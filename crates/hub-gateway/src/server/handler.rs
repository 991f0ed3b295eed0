//! WebSocket handler
//!
//! Attaches each socket to its client's session and pumps messages both ways.

use crate::connection::GatewayConnection;
use crate::handlers::MessageDispatcher;
use crate::protocol::{ClientMessage, CloseCode};
use crate::server::GatewayState;
use axum::{
    extract::{
        ws::{CloseFrame, Message, WebSocket},
        Path, State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use hub_session::{Connection, ConnectionId, SharedSession};

/// WebSocket gateway handler
pub async fn gateway_handler(
    State(state): State<GatewayState>,
    Path(client_id): Path<String>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(state, client_id, socket))
}

/// Handle an upgraded WebSocket connection
async fn handle_socket(state: GatewayState, client_id: String, socket: WebSocket) {
    let (connection, mut rx) = GatewayConnection::channel();
    let connection_id = connection.id();

    let (mut ws_sink, mut ws_stream) = socket.split();

    // Attaching queues the state snapshot and any buffered messages into `rx`
    let session = match state.registry().connect(&client_id, connection) {
        Ok(session) => session,
        Err(e) => {
            let close_code = CloseCode::from(&e);
            tracing::warn!(
                client_id = %client_id,
                connection_id = %connection_id,
                error = %e,
                max_connections = state.config().session.max_connections,
                "Rejecting connection"
            );
            let _ = ws_sink.send(close_message(close_code)).await;
            return;
        }
    };

    tracing::info!(
        client_id = %client_id,
        connection_id = %connection_id,
        "WebSocket connection established"
    );

    let close_code = loop {
        tokio::select! {
            outbound = rx.recv() => {
                let Some(text) = outbound else {
                    break None;
                };
                if ws_sink.send(Message::Text(text)).await.is_err() {
                    tracing::warn!(
                        connection_id = %connection_id,
                        "Failed to send message to WebSocket"
                    );
                    break None;
                }
            }
            inbound = ws_stream.next() => {
                match inbound {
                    Some(Ok(Message::Text(text))) => {
                        if let Err(close_code) = handle_text_message(&session, connection_id, &text) {
                            break Some(close_code);
                        }
                    }
                    Some(Ok(Message::Binary(_))) => {
                        tracing::debug!(connection_id = %connection_id, "Binary messages not supported");
                        break Some(CloseCode::DecodeError);
                    }
                    Some(Ok(Message::Ping(_) | Message::Pong(_))) => {
                        // Pong is handled automatically by axum
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        tracing::info!(connection_id = %connection_id, "Client closed connection");
                        break None;
                    }
                    Some(Err(e)) => {
                        tracing::warn!(connection_id = %connection_id, error = %e, "WebSocket error");
                        break Some(CloseCode::UnknownError);
                    }
                }
            }
        }
    };

    state.registry().disconnect(&client_id, &connection_id);

    if let Some(close_code) = close_code {
        tracing::debug!(
            connection_id = %connection_id,
            close_code = %close_code,
            "Closing connection due to error"
        );
        let _ = ws_sink.send(close_message(close_code)).await;
    } else {
        let _ = ws_sink.close().await;
    }
}

/// Handle a text message from the client
fn handle_text_message(
    session: &SharedSession<GatewayConnection>,
    connection_id: ConnectionId,
    text: &str,
) -> Result<(), CloseCode> {
    let message = match ClientMessage::from_json(text) {
        Ok(m) => m,
        Err(e) => {
            tracing::debug!(
                connection_id = %connection_id,
                error = %e,
                "Failed to parse message"
            );
            return Err(CloseCode::DecodeError);
        }
    };

    tracing::trace!(connection_id = %connection_id, message = %message, "Received message");

    match MessageDispatcher::dispatch(session, connection_id, message) {
        Ok(()) => Ok(()),
        Err(e) => match e.to_close_code() {
            Some(close_code) => Err(close_code),
            None => {
                tracing::warn!(connection_id = %connection_id, error = %e, "Ignoring client message");
                Ok(())
            }
        },
    }
}

fn close_message(code: CloseCode) -> Message {
    Message::Close(Some(CloseFrame {
        code: code.as_u16(),
        reason: code.description().into(),
    }))
}
