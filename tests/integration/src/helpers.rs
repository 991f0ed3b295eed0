//! Test helpers for integration tests
//!
//! Provides a spawned gateway server and a small WebSocket client.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{anyhow, bail, Result};
use futures_util::{SinkExt, StreamExt};
use hub_common::AppConfig;
use hub_gateway::{create_app, create_gateway_state, serve, GatewayState};
use hub_session::ClientMessage;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

/// How long to wait for an expected message
pub const RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// How long silence must last to count as "nothing was sent"
pub const QUIET_PERIOD: Duration = Duration::from_millis(200);

/// Build a configuration without touching the process environment
pub fn test_config(max_connections: usize) -> Result<AppConfig> {
    let max = max_connections.to_string();
    let config = AppConfig::from_vars(|key| match key {
        "GATEWAY_PORT" => Some("0".to_string()),
        "SESSION_MAX_CONNECTIONS" => Some(max.clone()),
        _ => None,
    })?;
    Ok(config)
}

/// Test server instance that manages lifecycle
pub struct TestServer {
    pub addr: SocketAddr,
    pub state: GatewayState,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a gateway allowing `max_connections` connections per client
    pub async fn start(max_connections: usize) -> Result<Self> {
        let state = create_gateway_state(test_config(max_connections)?);
        let app = create_app(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            serve(listener, app).await.ok();
        });

        Ok(Self {
            addr,
            state,
            handle,
        })
    }

    /// WebSocket URL for a client
    pub fn ws_url(&self, client_id: &str) -> String {
        format!("ws://{}/gateway/{}", self.addr, client_id)
    }

    /// Number of connections currently attached to a client
    pub fn connection_count(&self, client_id: &str) -> usize {
        self.state
            .registry()
            .get(client_id)
            .map_or(0, |session| session.lock().connection_count())
    }

    /// Wait until a client has exactly `expected` attached connections
    pub async fn wait_for_connections(&self, client_id: &str, expected: usize) -> Result<()> {
        let deadline = tokio::time::Instant::now() + RECV_TIMEOUT;
        while self.connection_count(client_id) != expected {
            if tokio::time::Instant::now() > deadline {
                bail!(
                    "client {client_id} has {} connections, expected {expected}",
                    self.connection_count(client_id)
                );
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        Ok(())
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// A WebSocket client speaking the hub protocol
pub struct TestClient {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl TestClient {
    /// Connect to the gateway as `client_id`
    pub async fn connect(server: &TestServer, client_id: &str) -> Result<Self> {
        let (stream, _response) = connect_async(server.ws_url(client_id)).await?;
        Ok(Self { stream })
    }

    /// Connect and consume the initial state snapshot
    pub async fn connect_synced(server: &TestServer, client_id: &str) -> Result<(Self, ClientMessage)> {
        let mut client = Self::connect(server, client_id).await?;
        let snapshot = client.recv().await?;
        Ok((client, snapshot))
    }

    /// Send a raw JSON value
    pub async fn send_json(&mut self, value: &serde_json::Value) -> Result<()> {
        self.send_text(value.to_string()).await
    }

    /// Send a raw text frame
    pub async fn send_text(&mut self, text: String) -> Result<()> {
        self.stream.send(Message::Text(text)).await?;
        Ok(())
    }

    /// Receive the next hub message
    pub async fn recv(&mut self) -> Result<ClientMessage> {
        loop {
            match self.next_frame(RECV_TIMEOUT).await? {
                Some(Message::Text(text)) => return Ok(ClientMessage::from_json(&text)?),
                Some(Message::Close(frame)) => bail!("connection closed: {frame:?}"),
                Some(_) => {}
                None => bail!("timed out waiting for a message"),
            }
        }
    }

    /// Expect the server to close the connection; returns the close code
    pub async fn recv_close(&mut self) -> Result<u16> {
        loop {
            match self.next_frame(RECV_TIMEOUT).await? {
                Some(Message::Close(Some(frame))) => return Ok(u16::from(frame.code)),
                Some(Message::Close(None)) => bail!("closed without a close frame"),
                Some(Message::Text(text)) => bail!("expected close, got message {text}"),
                Some(_) => {}
                None => bail!("timed out waiting for close"),
            }
        }
    }

    /// Assert nothing arrives for a short while
    pub async fn expect_silence(&mut self) -> Result<()> {
        match self.next_frame(QUIET_PERIOD).await? {
            Some(Message::Text(text)) => Err(anyhow!("unexpected message {text}")),
            Some(Message::Close(frame)) => Err(anyhow!("unexpected close {frame:?}")),
            _ => Ok(()),
        }
    }

    /// Close the connection from the client side
    pub async fn close(mut self) -> Result<()> {
        self.stream.close(None).await?;
        Ok(())
    }

    async fn next_frame(&mut self, wait: Duration) -> Result<Option<Message>> {
        match tokio::time::timeout(wait, self.stream.next()).await {
            Ok(Some(frame)) => Ok(Some(frame?)),
            Ok(None) => bail!("stream ended"),
            Err(_) => Ok(None),
        }
    }
}

/// Build a `setState` command
pub fn set_state(data: serde_json::Value) -> serde_json::Value {
    serde_json::json!({ "type": "setState", "data": data })
}

/// Build a `newSession` command
pub fn new_session() -> serde_json::Value {
    serde_json::json!({ "type": "newSession", "data": null })
}
