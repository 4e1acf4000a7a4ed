//! End-to-end tests for the push channel and server lifecycle.
//!
//! These bind a real listener on an ephemeral loopback port and talk to it
//! with a `WebSocket` client, since an upgrade cannot be exercised through
//! `tower::ServiceExt` alone.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use jsonds_api::server::ServerConfig;
use jsonds_api::startup::{RunningServer, spawn_server};
use jsonds_api::state::AppState;
use jsonds_core::EventStore;
use jsonds_types::SEARCH_TARGETS;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;

fn loopback() -> ServerConfig {
    ServerConfig {
        host: String::from("127.0.0.1"),
        port: 0,
    }
}

async fn start(push_interval: Duration) -> (RunningServer, CancellationToken) {
    let shutdown = CancellationToken::new();
    let state = AppState::new(Arc::new(EventStore::new()))
        .with_push_interval(push_interval)
        .with_shutdown(shutdown.clone());
    let running = spawn_server(&loopback(), Arc::new(state)).await.unwrap();
    (running, shutdown)
}

fn decode_targets(message: &Message) -> Vec<String> {
    serde_json::from_str(message.to_text().unwrap()).unwrap()
}

#[tokio::test]
async fn test_echo_pushes_fixed_targets_repeatedly() {
    let (running, shutdown) = start(Duration::from_millis(50)).await;
    let url = format!("ws://{}/echo", running.local_addr);

    let (mut client, _) = connect_async(url.as_str()).await.unwrap();

    for _ in 0..2 {
        let message = tokio::time::timeout(Duration::from_secs(5), client.next())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        assert!(message.is_text());
        assert_eq!(decode_targets(&message), SEARCH_TARGETS.to_vec());
    }

    drop(client);
    shutdown.cancel();
    let result = tokio::time::timeout(Duration::from_secs(5), running.handle)
        .await
        .unwrap()
        .unwrap();
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_push_loop_ends_when_client_goes_away() {
    let shutdown = CancellationToken::new();
    let state = Arc::new(
        AppState::new(Arc::new(EventStore::new()))
            .with_push_interval(Duration::from_millis(20))
            .with_shutdown(shutdown.clone()),
    );
    let running = spawn_server(&loopback(), Arc::clone(&state)).await.unwrap();
    let url = format!("ws://{}/echo", running.local_addr);

    let (mut client, _) = connect_async(url.as_str()).await.unwrap();
    let first = client.next().await.unwrap().unwrap();
    assert_eq!(decode_targets(&first), SEARCH_TARGETS.to_vec());
    assert_eq!(state.push_clients(), 1);

    drop(client);

    // The next failed send ends the loop while the server keeps running.
    let ended = tokio::time::timeout(Duration::from_secs(5), async {
        while state.push_clients() != 0 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;
    assert!(ended.is_ok());
    assert!(!shutdown.is_cancelled());
    assert!(!running.handle.is_finished());

    shutdown.cancel();
}

#[tokio::test]
async fn test_shutdown_closes_push_connection() {
    let (running, shutdown) = start(Duration::from_secs(60)).await;
    let url = format!("ws://{}/echo", running.local_addr);

    let (mut client, _) = connect_async(url.as_str()).await.unwrap();
    let first = client.next().await.unwrap().unwrap();
    assert_eq!(decode_targets(&first), SEARCH_TARGETS.to_vec());

    shutdown.cancel();

    // The server sends a close frame (or drops the stream) instead of
    // waiting out the long push interval.
    let next = tokio::time::timeout(Duration::from_secs(5), client.next())
        .await
        .unwrap();
    match next {
        Some(Ok(message)) => assert!(message.is_close()),
        Some(Err(_)) | None => {}
    }
}

#[tokio::test]
async fn test_health_check_over_tcp() {
    let (running, shutdown) = start(Duration::from_secs(3)).await;

    let mut stream = tokio::net::TcpStream::connect(running.local_addr)
        .await
        .unwrap();
    tokio::io::AsyncWriteExt::write_all(
        &mut stream,
        b"GET / HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
    )
    .await
    .unwrap();
    let mut response = String::new();
    tokio::io::AsyncReadExt::read_to_string(&mut stream, &mut response)
        .await
        .unwrap();

    assert!(response.starts_with("HTTP/1.1 200"));
    assert!(response.ends_with("ok\n"));

    shutdown.cancel();
}

#[tokio::test]
async fn test_port_in_use_is_reported() {
    let (running, shutdown) = start(Duration::from_secs(3)).await;
    let taken = ServerConfig {
        host: String::from("127.0.0.1"),
        port: running.local_addr.port(),
    };

    let state = Arc::new(AppState::new(Arc::new(EventStore::new())));
    assert!(spawn_server(&taken, state).await.is_err());

    shutdown.cancel();
}
