//! Shared harness: boots a full gateway on ephemeral ports.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;

use graphgate::dispatch::Dispatcher;
use graphgate::handlers;
use graphgate::registry::MethodRegistry;
use graphgate::sdk::{GraphClient, MemoryGraph};
use graphgate::transport;

pub struct Gateway {
    pub http_addr: SocketAddr,
    pub tcp_addr: SocketAddr,
    pub ws_addr: SocketAddr,
    shutdown: broadcast::Sender<()>,
}

impl Gateway {
    pub fn http_url(&self, path: &str) -> String {
        format!("http://{}{path}", self.http_addr)
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}", self.ws_addr)
    }
}

impl Drop for Gateway {
    fn drop(&mut self) {
        let _ = self.shutdown.send(());
    }
}

/// Start a gateway with the full method surface and no dispatch timeout.
pub async fn start() -> Gateway {
    boot(None, 1024 * 1024, 64, |_| {}).await
}

/// Start a gateway with a dispatch timeout and extra test-only methods.
pub async fn start_custom(
    default_timeout: Option<Duration>,
    customize: impl FnOnce(&mut MethodRegistry),
) -> Gateway {
    boot(default_timeout, 1024 * 1024, 64, customize).await
}

/// Start a gateway with a small frame cap on the persistent bindings.
pub async fn start_with_frame_cap(max_frame_bytes: usize) -> Gateway {
    boot(None, max_frame_bytes, 64, |_| {}).await
}

/// Start a gateway with a small HTTP concurrency limit.
pub async fn start_with_http_limit(
    max_concurrency: usize,
    customize: impl FnOnce(&mut MethodRegistry),
) -> Gateway {
    boot(None, 1024 * 1024, max_concurrency, customize).await
}

async fn boot(
    default_timeout: Option<Duration>,
    max_frame_bytes: usize,
    max_concurrency: usize,
    customize: impl FnOnce(&mut MethodRegistry),
) -> Gateway {
    let client: Arc<dyn GraphClient> = Arc::new(MemoryGraph::new());
    let mut registry = MethodRegistry::new();
    handlers::register_all(&mut registry, client).unwrap();
    customize(&mut registry);
    let dispatcher = Arc::new(Dispatcher::new(Arc::new(registry), default_timeout));

    let http_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let tcp_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let ws_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let http_addr = http_listener.local_addr().unwrap();
    let tcp_addr = tcp_listener.local_addr().unwrap();
    let ws_addr = ws_listener.local_addr().unwrap();

    let (shutdown, _) = broadcast::channel(1);

    let router = transport::http::router(Arc::clone(&dispatcher), 1024 * 1024, max_concurrency);
    tokio::spawn(transport::http::serve(
        http_listener,
        router,
        shutdown.clone(),
    ));
    tokio::spawn(transport::tcp::serve(
        tcp_listener,
        Arc::clone(&dispatcher),
        max_frame_bytes,
        shutdown.clone(),
    ));
    tokio::spawn(transport::ws::serve(
        ws_listener,
        Arc::clone(&dispatcher),
        max_frame_bytes,
        shutdown.clone(),
    ));

    Gateway {
        http_addr,
        tcp_addr,
        ws_addr,
        shutdown,
    }
}

/// A line-oriented TCP client for the persistent binding.
pub struct TcpClient {
    reader: BufReader<tokio::net::tcp::OwnedReadHalf>,
    writer: tokio::net::tcp::OwnedWriteHalf,
}

impl TcpClient {
    pub async fn connect(addr: SocketAddr) -> Self {
        let socket = TcpStream::connect(addr).await.unwrap();
        let (read_half, writer) = socket.into_split();
        Self {
            reader: BufReader::new(read_half),
            writer,
        }
    }

    pub async fn send(&mut self, request: &Value) {
        let mut line = request.to_string();
        line.push('\n');
        self.writer.write_all(line.as_bytes()).await.unwrap();
    }

    pub async fn write_raw(&mut self, bytes: &[u8]) {
        self.writer.write_all(bytes).await.unwrap();
        self.writer.flush().await.unwrap();
    }

    pub async fn recv(&mut self) -> Value {
        let mut line = String::new();
        self.reader.read_line(&mut line).await.unwrap();
        serde_json::from_str(&line).unwrap()
    }

    pub async fn call(&mut self, request: &Value) -> Value {
        self.send(request).await;
        self.recv().await
    }
}

/// POST one envelope to `/rpc/v1`, returning status and decoded body.
pub async fn http_call(gateway: &Gateway, body: &Value) -> (reqwest::StatusCode, Value) {
    let response = reqwest::Client::new()
        .post(gateway.http_url("/rpc/v1"))
        .json(body)
        .send()
        .await
        .unwrap();
    let status = response.status();
    (status, response.json().await.unwrap())
}
