//! Shared utilities for integration testing.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use auth_relay::http::HttpServer;
use auth_relay::lifecycle::Shutdown;
use auth_relay::relay::{RelayEngine, ReqwestClient, UpstreamList, UpstreamSource};

/// Canned reply from a mock upstream.
pub struct MockReply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl MockReply {
    pub fn status(status: u16) -> Self {
        Self { status, content_type: "text/plain", body: String::new() }
    }

    pub fn json(body: &str) -> Self {
        Self { status: 200, content_type: "application/json", body: body.to_string() }
    }

    pub fn text(body: &str) -> Self {
        Self { status: 200, content_type: "text/plain", body: body.to_string() }
    }
}

/// Start a programmable mock upstream on an ephemeral port.
///
/// The closure receives the request line (e.g. `GET /x?y HTTP/1.1`).
pub async fn start_mock_upstream<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = MockReply> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let request_line = read_request(&mut socket).await;
                        let reply = f(request_line).await;
                        let status_text = match reply.status {
                            200 => "200 OK",
                            204 => "204 No Content",
                            403 => "403 Forbidden",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nX-Mock: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            reply.content_type,
                            reply.body.len(),
                            addr.port(),
                            reply.body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Read one request (head and `Content-Length` body); return its request line.
async fn read_request(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let head_end = loop {
        let n = socket.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            break buf.len();
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).to_string();
    let content_length = head
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < head_end + content_length {
        let n = socket.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    head.lines().next().unwrap_or_default().to_string()
}

/// An address nothing is listening on.
pub async fn unreachable_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Outbound client that ignores proxy environment variables.
pub fn direct_client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .pool_max_idle_per_host(0)
        .build()
        .unwrap()
}

/// Engine over the given upstream addresses, in order.
pub fn engine_for(upstreams: &[SocketAddr]) -> RelayEngine {
    let list = upstreams
        .iter()
        .map(|addr| format!("http://{}", addr))
        .collect::<Vec<_>>()
        .join("\n");
    RelayEngine::new(
        UpstreamSource::fixed(UpstreamList::parse(&list).unwrap()),
        Arc::new(ReqwestClient::from_client(direct_client())),
    )
}

/// Serve `engine` on an ephemeral port. Trigger the returned handle to stop.
pub async fn start_relay(engine: RelayEngine) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();

    let server = HttpServer::new(engine, false);
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}
