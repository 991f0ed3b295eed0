//! Gateway Integration Tests
//!
//! Each test spawns its own gateway on an ephemeral port; no external
//! services are required.
//!
//! Run with: cargo test -p integration-tests --test gateway_tests

use hub_session::{ClientMessage, MessageType};
use integration_tests::{new_session, set_state, TestClient, TestServer};
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

fn state_message(data: serde_json::Value) -> ClientMessage {
    ClientMessage {
        kind: MessageType::SetState,
        data,
    }
}

// ============================================================================
// Health Check
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    let server = TestServer::start(1).await.expect("Failed to start server");

    let mut stream = TcpStream::connect(server.addr).await.unwrap();
    stream
        .write_all(b"GET /health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();

    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();

    assert!(response.starts_with("HTTP/1.1 200"));
    assert!(response.ends_with("OK"));
}

// ============================================================================
// Attach / Snapshot
// ============================================================================

#[tokio::test]
async fn test_first_message_is_state_snapshot() {
    let server = TestServer::start(1).await.expect("Failed to start server");

    let (_client, snapshot) = TestClient::connect_synced(&server, "alice").await.unwrap();

    assert_eq!(snapshot, state_message(json!({})));
    server.wait_for_connections("alice", 1).await.unwrap();
}

#[tokio::test]
async fn test_reconnect_receives_merged_state() {
    let server = TestServer::start(1).await.expect("Failed to start server");

    let (mut first, _) = TestClient::connect_synced(&server, "alice").await.unwrap();
    first.send_json(&set_state(json!({"cart": {"items": 1}}))).await.unwrap();
    assert_eq!(
        first.recv().await.unwrap(),
        state_message(json!({"cart": {"items": 1}}))
    );
    first.send_json(&set_state(json!({"cart": {"total": 9}}))).await.unwrap();
    first.recv().await.unwrap();

    first.close().await.unwrap();
    server.wait_for_connections("alice", 0).await.unwrap();

    let (mut second, snapshot) = TestClient::connect_synced(&server, "alice").await.unwrap();
    assert_eq!(
        snapshot,
        state_message(json!({"cart": {"items": 1, "total": 9}}))
    );
    second.expect_silence().await.unwrap();
}

// ============================================================================
// Capacity
// ============================================================================

#[tokio::test]
async fn test_capacity_rejects_extra_connection() {
    let server = TestServer::start(1).await.expect("Failed to start server");

    let (first, _) = TestClient::connect_synced(&server, "alice").await.unwrap();

    let mut second = TestClient::connect(&server, "alice").await.unwrap();
    assert_eq!(second.recv_close().await.unwrap(), 4005);
    assert_eq!(server.connection_count("alice"), 1);

    first.close().await.unwrap();
    server.wait_for_connections("alice", 0).await.unwrap();

    let (_third, snapshot) = TestClient::connect_synced(&server, "alice").await.unwrap();
    assert_eq!(snapshot, state_message(json!({})));
}

#[tokio::test]
async fn test_clients_do_not_share_capacity() {
    let server = TestServer::start(1).await.expect("Failed to start server");

    let (_alice, _) = TestClient::connect_synced(&server, "alice").await.unwrap();
    let (_bob, snapshot) = TestClient::connect_synced(&server, "bob").await.unwrap();

    assert_eq!(snapshot, state_message(json!({})));
}

// ============================================================================
// Broadcast
// ============================================================================

#[tokio::test]
async fn test_state_broadcast_across_tabs() {
    let server = TestServer::start(2).await.expect("Failed to start server");

    let (mut tab1, _) = TestClient::connect_synced(&server, "alice").await.unwrap();
    let (mut tab2, _) = TestClient::connect_synced(&server, "alice").await.unwrap();
    // Attaching tab2 re-sent the snapshot to every tab
    assert_eq!(tab1.recv().await.unwrap(), state_message(json!({})));

    tab2.send_json(&set_state(json!({"page": "checkout"}))).await.unwrap();

    let expected = state_message(json!({"page": "checkout"}));
    assert_eq!(tab1.recv().await.unwrap(), expected);
    assert_eq!(tab2.recv().await.unwrap(), expected);
}

#[tokio::test]
async fn test_new_session_only_from_main() {
    let server = TestServer::start(2).await.expect("Failed to start server");

    let (mut main, _) = TestClient::connect_synced(&server, "alice").await.unwrap();
    let (mut other, _) = TestClient::connect_synced(&server, "alice").await.unwrap();
    main.recv().await.unwrap();

    // Secondary tab is ignored but stays connected
    other.send_json(&new_session()).await.unwrap();
    main.expect_silence().await.unwrap();
    other.expect_silence().await.unwrap();
    assert_eq!(server.connection_count("alice"), 2);

    main.send_json(&new_session()).await.unwrap();
    assert_eq!(main.recv().await.unwrap(), ClientMessage::new_session());
    assert_eq!(other.recv().await.unwrap(), ClientMessage::new_session());
}

#[tokio::test]
async fn test_main_failover_allows_new_session() {
    let server = TestServer::start(2).await.expect("Failed to start server");

    let (main, _) = TestClient::connect_synced(&server, "alice").await.unwrap();
    let (mut other, _) = TestClient::connect_synced(&server, "alice").await.unwrap();

    main.close().await.unwrap();
    server.wait_for_connections("alice", 1).await.unwrap();

    // The remaining tab was promoted, so its reset goes through
    other.send_json(&new_session()).await.unwrap();
    assert_eq!(other.recv().await.unwrap(), ClientMessage::new_session());
}

// ============================================================================
// Protocol Errors
// ============================================================================

#[tokio::test]
async fn test_invalid_json_closes_connection() {
    let server = TestServer::start(1).await.expect("Failed to start server");

    let (mut client, _) = TestClient::connect_synced(&server, "alice").await.unwrap();
    client.send_text("not json".to_string()).await.unwrap();

    assert_eq!(client.recv_close().await.unwrap(), 4002);
    server.wait_for_connections("alice", 0).await.unwrap();
}

#[tokio::test]
async fn test_non_object_state_closes_connection() {
    let server = TestServer::start(1).await.expect("Failed to start server");

    let (mut client, _) = TestClient::connect_synced(&server, "alice").await.unwrap();
    client.send_json(&set_state(json!([1, 2, 3]))).await.unwrap();

    assert_eq!(client.recv_close().await.unwrap(), 4002);
}
