//! WebSocket gate end-to-end tests
//!
//! Runs the gateway router on a loopback port and connects real clients.
//! Every client shares the source address 127.0.0.1.

use std::net::SocketAddr;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use gatehouse::config::{GatewayConfig, Settings};
use gatehouse::server::{create_gateway_app, GatewayState};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

const LOOPBACK: &str = "127.0.0.1";

async fn start_gateway(gateway: GatewayConfig) -> (SocketAddr, GatewayState) {
    let settings = Settings {
        gateway,
        ..Default::default()
    };
    let state = GatewayState::new(&settings);
    let app = create_gateway_app(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
            .await
            .unwrap();
    });

    (addr, state)
}

async fn connect(addr: SocketAddr) -> Client {
    let (client, _) = connect_async(format!("ws://{}/", addr)).await.unwrap();
    client
}

async fn next_message(client: &mut Client) -> Message {
    tokio::time::timeout(Duration::from_secs(5), client.next())
        .await
        .expect("timed out waiting for a message")
        .expect("stream ended")
        .expect("websocket error")
}

/// Wait until the gate reports `expected` connections from loopback.
async fn wait_for_count(state: &GatewayState, expected: usize) {
    for _ in 0..100 {
        if state.gate.count(LOOPBACK) == expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!(
        "expected {} connections, gate reports {}",
        expected,
        state.gate.count(LOOPBACK)
    );
}

#[tokio::test]
async fn test_greeting_on_connect() {
    let (addr, state) = start_gateway(GatewayConfig::default()).await;

    let mut client = connect(addr).await;
    match next_message(&mut client).await {
        Message::Text(text) => assert_eq!(text.as_str(), "Hi there, you are connected to the server"),
        other => panic!("expected greeting, got {:?}", other),
    }
    assert_eq!(state.gate.count(LOOPBACK), 1);

    client.close(None).await.unwrap();
    wait_for_count(&state, 0).await;
    assert_eq!(state.gate.tracked_addresses(), 0);
}

#[tokio::test]
async fn test_cap_rejects_then_admits_after_closes() {
    let (addr, state) = start_gateway(GatewayConfig::default()).await;

    let mut clients = Vec::new();
    for _ in 0..10 {
        let mut client = connect(addr).await;
        assert!(matches!(next_message(&mut client).await, Message::Text(_)));
        clients.push(client);
    }
    assert_eq!(state.gate.count(LOOPBACK), 10);

    let mut rejected = connect(addr).await;
    match next_message(&mut rejected).await {
        Message::Close(Some(frame)) => {
            assert_eq!(u16::from(frame.code), 1008);
            assert_eq!(frame.reason.as_str(), "Too many connections from this IP");
        }
        other => panic!("expected close frame, got {:?}", other),
    }
    assert_eq!(state.gate.count(LOOPBACK), 10);

    for mut client in clients.drain(..3) {
        client.close(None).await.unwrap();
    }
    wait_for_count(&state, 7).await;

    let mut admitted = connect(addr).await;
    assert!(matches!(next_message(&mut admitted).await, Message::Text(_)));
    assert_eq!(state.gate.count(LOOPBACK), 8);
}

#[tokio::test]
async fn test_dropped_client_releases_slot() {
    let (addr, state) = start_gateway(GatewayConfig {
        max_connections_per_address: 1,
        ..Default::default()
    })
    .await;

    let mut client = connect(addr).await;
    next_message(&mut client).await;

    // No close handshake, just the socket going away
    drop(client);
    wait_for_count(&state, 0).await;

    let mut again = connect(addr).await;
    assert!(matches!(next_message(&mut again).await, Message::Text(_)));
}

#[tokio::test]
async fn test_oversized_message_ends_connection() {
    let (addr, state) = start_gateway(GatewayConfig {
        max_payload_bytes: 1024,
        ..Default::default()
    })
    .await;

    let mut client = connect(addr).await;
    next_message(&mut client).await;

    client.send(Message::text("x".repeat(4096))).await.unwrap();
    match next_message(&mut client).await {
        Message::Close(Some(frame)) => {
            assert_eq!(u16::from(frame.code), 1009);
            assert_eq!(frame.reason.as_str(), "Max payload size exceeded");
        }
        other => panic!("expected close frame, got {:?}", other),
    }
    wait_for_count(&state, 0).await;
}

#[tokio::test]
async fn test_gateway_health() {
    let (addr, _state) = start_gateway(GatewayConfig::default()).await;
    let mut client = connect(addr).await;
    next_message(&mut client).await;

    let mut stream = TcpStream::connect(addr).await.unwrap();
    tokio::io::AsyncWriteExt::write_all(
        &mut stream,
        b"GET /health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
    )
    .await
    .unwrap();

    let mut response = String::new();
    tokio::io::AsyncReadExt::read_to_string(&mut stream, &mut response)
        .await
        .unwrap();

    assert!(response.starts_with("HTTP/1.1 200"));
    assert!(response.contains("\"active_connections\":1"));
    assert!(response.contains("\"tracked_addresses\":1"));
}
