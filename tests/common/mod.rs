//! Shared utilities for integration tests.

#![allow(dead_code)]

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
    Router,
};
use serde_json::Value;
use std::io::{self, Write};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

pub const COLLECTOR_PATH: &str = "/services/collector";
pub const FIXTURE_FINGERPRINT: &str =
    "DC:7A:88:49:B7:30:79:8F:CE:38:FC:66:38:EF:57:EC:9E:B5:F0:D3:2D:09:13:28:17:94:8C:00:2E:FC:0C:4C";

/// Writer that keeps everything written to it, for console sink assertions.
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl SharedBuffer {
    pub fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }

    pub fn lines(&self) -> Vec<String> {
        self.text().lines().map(str::to_string).collect()
    }

    /// Console lines written at Warning level.
    pub fn warnings(&self) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|line| line.contains(" WRN] "))
            .collect()
    }

    /// Poll until at least `count` warnings are present or `deadline` passes.
    pub async fn wait_for_warnings(&self, count: usize, deadline: Duration) -> Vec<String> {
        let started = tokio::time::Instant::now();
        loop {
            let warnings = self.warnings();
            if warnings.len() >= count || started.elapsed() >= deadline {
                return warnings;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}

/// One POST seen by a mock collector.
#[derive(Debug, Clone)]
pub struct ReceivedEvent {
    pub headers: HeaderMap,
    pub body: Value,
}

struct CollectorState {
    events: mpsc::UnboundedSender<ReceivedEvent>,
    calls: AtomicUsize,
    respond: Box<dyn Fn(usize) -> StatusCode + Send + Sync>,
}

/// A running mock collector.
pub struct MockCollector {
    pub endpoint: String,
    pub events: mpsc::UnboundedReceiver<ReceivedEvent>,
    state: Arc<CollectorState>,
}

impl MockCollector {
    /// POSTs received so far, including rejected ones.
    pub fn calls(&self) -> usize {
        self.state.calls.load(Ordering::SeqCst)
    }

    /// Next event, or panic after five seconds.
    pub async fn next_event(&mut self) -> ReceivedEvent {
        tokio::time::timeout(Duration::from_secs(5), self.events.recv())
            .await
            .expect("collector received nothing")
            .expect("collector channel closed")
    }
}

fn collector_router<F>(respond: F) -> (Router, Arc<CollectorState>, mpsc::UnboundedReceiver<ReceivedEvent>)
where
    F: Fn(usize) -> StatusCode + Send + Sync + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();
    let state = Arc::new(CollectorState {
        events: tx,
        calls: AtomicUsize::new(0),
        respond: Box::new(respond),
    });
    let router = Router::new()
        .route(COLLECTOR_PATH, post(collect))
        .with_state(Arc::clone(&state));
    (router, state, rx)
}

async fn collect(
    State(state): State<Arc<CollectorState>>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let call = state.calls.fetch_add(1, Ordering::SeqCst);
    let status = (state.respond)(call);
    if status.is_success() {
        let body = serde_json::from_slice(&body).unwrap_or(Value::Null);
        let _ = state.events.send(ReceivedEvent { headers, body });
    }
    status
}

/// Plain HTTP collector answering every POST with 200.
pub async fn start_mock_collector() -> MockCollector {
    start_programmable_collector(|_| StatusCode::OK).await
}

/// Plain HTTP collector whose status depends on the zero-based call number.
pub async fn start_programmable_collector<F>(respond: F) -> MockCollector
where
    F: Fn(usize) -> StatusCode + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (router, state, events) = collector_router(respond);

    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    MockCollector {
        endpoint: format!("http://{}{}", addr, COLLECTOR_PATH),
        events,
        state,
    }
}

pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// HTTPS collector presenting the self-signed fixture certificate.
pub async fn start_tls_collector() -> MockCollector {
    let _ = rustls::crypto::ring::default_provider().install_default();

    let config = axum_server::tls_rustls::RustlsConfig::from_pem_file(
        fixture("collector.crt"),
        fixture("collector.key"),
    )
    .await
    .unwrap();

    let (router, state, events) = collector_router(|_| StatusCode::OK);
    let handle = axum_server::Handle::new();
    let server_handle = handle.clone();
    let addr: SocketAddr = "127.0.0.1:0".parse().unwrap();

    tokio::spawn(async move {
        let _ = axum_server::bind_rustls(addr, config)
            .handle(server_handle)
            .serve(router.into_make_service())
            .await;
    });

    let addr = handle.listening().await.expect("TLS collector failed to bind");
    MockCollector {
        endpoint: format!("https://{}{}", addr, COLLECTOR_PATH),
        events,
        state,
    }
}

/// Endpoint on a port nothing listens on; connections are refused.
pub fn unreachable_endpoint() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}{}", addr, COLLECTOR_PATH)
}

/// Endpoint that accepts connections and never answers.
pub async fn blackhole_endpoint() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    format!("http://{}{}", addr, COLLECTOR_PATH)
}
