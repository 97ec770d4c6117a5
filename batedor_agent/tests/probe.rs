//! Probe against local responders.
use std::time::Duration;

use batedor_agent::probe::{lookup_public_ip, measure_latency, refresh, ProbeTargets};
use batedor_agent::state::{AppState, UNKNOWN_IP, UNREACHABLE_LATENCY};
use batedor_agent::types::{InterfaceInfo, NetCounters};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Answer one HTTP request with `response`, then close.
async fn one_shot_http(response: &'static str) -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        let (mut sock, _) = listener.accept().await.unwrap();
        let mut buf = Vec::new();
        let mut chunk = [0u8; 512];
        while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = sock.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
        }
        assert!(buf.starts_with(b"GET / HTTP/1.1\r\n"));
        sock.write_all(response.as_bytes()).await.unwrap();
        sock.shutdown().await.unwrap();
    });
    port
}

#[tokio::test]
async fn reads_public_ip_from_http_body() {
    let port = one_shot_http("HTTP/1.1 200 OK\r\nContent-Length: 13\r\n\r\n198.51.100.4\n").await;
    let ip = lookup_public_ip("127.0.0.1", port, Duration::from_secs(2))
        .await
        .unwrap();
    assert_eq!(ip, "198.51.100.4");
}

#[tokio::test]
async fn error_status_is_a_failure() {
    let port = one_shot_http("HTTP/1.1 500 Internal Server Error\r\nContent-Length: 0\r\n\r\n").await;
    assert!(lookup_public_ip("127.0.0.1", port, Duration::from_secs(2))
        .await
        .is_err());
}

#[tokio::test]
async fn latency_to_a_listening_port_is_measured() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    let ms = measure_latency(&addr, Duration::from_secs(2)).await;
    assert!(ms >= 0);
}

#[tokio::test]
async fn unreachable_target_gives_sentinel() {
    // port 1 on loopback: nothing listens, the connect is refused
    let ms = measure_latency("127.0.0.1:1", Duration::from_secs(2)).await;
    assert_eq!(ms, UNREACHABLE_LATENCY);
}

#[tokio::test]
async fn refresh_records_both_results() {
    let port = one_shot_http("HTTP/1.1 200 OK\r\n\r\n203.0.113.9").await;
    let state = AppState::new(InterfaceInfo::default(), NetCounters::default());
    assert_eq!(state.probe().public_ip, UNKNOWN_IP);

    let targets = ProbeTargets {
        latency_addr: "127.0.0.1:1".into(),
        latency_timeout: Duration::from_millis(500),
        ip_host: "127.0.0.1".into(),
        ip_port: port,
        ip_timeout: Duration::from_secs(2),
    };
    let status = refresh(&targets, &state).await;
    assert_eq!(status.public_ip, "203.0.113.9");
    assert_eq!(status.latency_ms, UNREACHABLE_LATENCY);
    assert_eq!(state.probe(), status);
    assert!(state.probe().refreshed_at.is_some());
}
