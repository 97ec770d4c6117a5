//! Slow, best-effort side inputs: public IP and network latency.

use std::net::IpAddr;
use std::time::{Duration, Instant};

use bytes::{BufMut, BytesMut};
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, trace};

use crate::state::{AppState, ProbeStatus, UNKNOWN_IP, UNREACHABLE_LATENCY};

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed response: {0}")]
    Parse(#[from] httparse::Error),
    #[error("response is incomplete")]
    Incomplete,
    #[error("unexpected status {0}")]
    Status(u16),
    #[error("body is not an ip address: {0:?}")]
    NotAnAddress(String),
}

#[derive(Debug, Clone)]
pub struct ProbeTargets {
    /// host:port reached with a plain TCP connect.
    pub latency_addr: String,
    pub latency_timeout: Duration,
    pub ip_host: String,
    pub ip_port: u16,
    pub ip_timeout: Duration,
}

impl Default for ProbeTargets {
    fn default() -> Self {
        Self {
            latency_addr: "8.8.8.8:53".into(),
            latency_timeout: Duration::from_secs(2),
            ip_host: "api.ipify.org".into(),
            ip_port: 80,
            ip_timeout: Duration::from_secs(5),
        }
    }
}

/// Round-trip of a TCP handshake in milliseconds, or -1 when it fails or times out.
pub async fn measure_latency(addr: &str, limit: Duration) -> i64 {
    let start = Instant::now();
    match timeout(limit, TcpStream::connect(addr)).await {
        Ok(Ok(_stream)) => start.elapsed().as_millis() as i64,
        Ok(Err(e)) => {
            debug!(addr, "latency probe failed: {e}");
            UNREACHABLE_LATENCY
        }
        Err(_) => {
            debug!(addr, "latency probe timed out");
            UNREACHABLE_LATENCY
        }
    }
}

pub async fn lookup_public_ip(host: &str, port: u16, limit: Duration) -> Result<String, ProbeError> {
    timeout(limit, fetch_ip(host, port))
        .await
        .map_err(|_| ProbeError::Timeout(limit))?
}

async fn fetch_ip(host: &str, port: u16) -> Result<String, ProbeError> {
    let mut stream = TcpStream::connect((host, port)).await?;

    let mut req = BytesMut::with_capacity(128);
    req.put_slice(b"GET / HTTP/1.1\r\n");
    req.put_slice(format!("Host: {host}\r\n").as_bytes());
    req.put_slice(b"Connection: close\r\nAccept-Encoding: identity\r\n\r\n");
    stream.write_all(&req).await?;
    stream.flush().await?;

    let mut buf = BytesMut::with_capacity(256);
    while stream.read_buf(&mut buf).await? != 0 {}
    trace!("ip lookup response: {:?}", String::from_utf8_lossy(&buf));

    parse_ip_response(&buf)
}

fn parse_ip_response(raw: &[u8]) -> Result<String, ProbeError> {
    let mut headers = [httparse::EMPTY_HEADER; 32];
    let mut resp = httparse::Response::new(&mut headers);
    let body_start = match resp.parse(raw)? {
        httparse::Status::Complete(n) => n,
        httparse::Status::Partial => return Err(ProbeError::Incomplete),
    };
    let code = resp.code.unwrap_or(0);
    if code != 200 {
        return Err(ProbeError::Status(code));
    }
    let body = String::from_utf8_lossy(&raw[body_start..]).trim().to_string();
    body.parse::<IpAddr>()
        .map(|ip| ip.to_string())
        .map_err(|_| ProbeError::NotAnAddress(body))
}

/// Run both probes concurrently and publish the outcome, sentinels included.
pub async fn refresh(targets: &ProbeTargets, state: &AppState) -> ProbeStatus {
    let (ip, latency_ms) = tokio::join!(
        lookup_public_ip(&targets.ip_host, targets.ip_port, targets.ip_timeout),
        measure_latency(&targets.latency_addr, targets.latency_timeout),
    );
    let public_ip = ip.unwrap_or_else(|e| {
        debug!(host = %targets.ip_host, "public ip lookup failed: {e}");
        UNKNOWN_IP.to_string()
    });
    let status = ProbeStatus {
        public_ip,
        latency_ms,
        refreshed_at: Some(Instant::now()),
    };
    state.record_probe(status.clone());
    status
}
