//! Shared fixtures: stub bus, in-memory metric sink, test state, log intake.

#![allow(dead_code)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

use busrelay_core::error::{RelayError, Result};
use busrelay_core::event::BusEntry;
use busrelay_gateway::app_state::AppState;
use busrelay_gateway::bus::{BusReceipt, EventBus};
use busrelay_gateway::config::RelayConfig;
use busrelay_gateway::obs::{MemorySink, TelemetryClient};

pub const PREFIX: &str = "eventbridge.api.";

#[derive(Default)]
pub struct StubBus {
    fail: Option<String>,
    entries: Mutex<Vec<BusEntry>>,
}

impl StubBus {
    pub fn healthy() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        Self::failing_with("AccessDeniedException: not authorized")
    }

    pub fn failing_with(message: &str) -> Arc<Self> {
        Arc::new(Self {
            fail: Some(message.to_string()),
            ..Self::default()
        })
    }

    pub fn entries(&self) -> Vec<BusEntry> {
        self.entries.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventBus for StubBus {
    async fn put_event(&self, entry: BusEntry) -> Result<BusReceipt> {
        self.entries.lock().unwrap().push(entry);
        if let Some(msg) = &self.fail {
            return Err(RelayError::Bus(msg.clone()));
        }
        Ok(BusReceipt {
            event_id: Some("11111111-2222-3333-4444-555555555555".into()),
            failed_entry_count: 0,
        })
    }
}

pub fn config_with(pairs: &[(&str, &str)]) -> RelayConfig {
    let env: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    RelayConfig::resolve(None, |k| env.get(k).cloned()).unwrap()
}

pub struct Harness {
    pub state: AppState,
    pub sink: Arc<MemorySink>,
    pub bus: Arc<StubBus>,
}

pub fn harness(bus: Arc<StubBus>) -> Harness {
    harness_with(config_with(&[("EVENT_BUS_NAME", "orders")]), bus)
}

pub fn harness_with(cfg: RelayConfig, bus: Arc<StubBus>) -> Harness {
    let sink = Arc::new(MemorySink::new());
    let telemetry = Arc::new(TelemetryClient::with_sink(&cfg.telemetry, sink.clone()));
    let state = AppState::new(cfg, telemetry, bus.clone());
    Harness { state, sink, bus }
}

/// Read one HTTP/1.1 request (headers + content-length body).
async fn read_request(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = stream.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        let text = String::from_utf8_lossy(&buf).to_string();
        if let Some(head_end) = text.find("\r\n\r\n") {
            let want = text[..head_end]
                .lines()
                .find_map(|l| {
                    let (k, v) = l.split_once(':')?;
                    k.eq_ignore_ascii_case("content-length")
                        .then(|| v.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if buf.len() >= head_end + 4 + want {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).to_string()
}

async fn answer(stream: &mut TcpStream, status_line: &str) {
    let resp = format!("{status_line}\r\nContent-Length: 0\r\n\r\n");
    let _ = stream.write_all(resp.as_bytes()).await;
    let _ = stream.shutdown().await;
}

/// Accept a single request, answer it, and return what was received.
pub async fn serve_once(listener: TcpListener, status_line: &'static str) -> String {
    let (mut stream, _) = listener.accept().await.unwrap();
    let captured = read_request(&mut stream).await;
    answer(&mut stream, status_line).await;
    captured
}

/// Log intake that accepts any number of requests. Each one is forwarded on
/// the channel before it is answered.
pub async fn spawn_intake() -> (String, mpsc::UnboundedReceiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/v1/input", listener.local_addr().unwrap());
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            let tx = tx.clone();
            tokio::spawn(async move {
                let captured = read_request(&mut stream).await;
                let _ = tx.send(captured);
                answer(&mut stream, "HTTP/1.1 202 Accepted").await;
            });
        }
    });
    (url, rx)
}

/// Wait for a captured request containing `needle`. Other records are skipped.
pub async fn expect_record(rx: &mut mpsc::UnboundedReceiver<String>, needle: &str) -> String {
    let wait = async {
        while let Some(captured) = rx.recv().await {
            if captured.contains(needle) {
                return captured;
            }
        }
        panic!("intake closed before a record containing {needle:?} arrived");
    };
    tokio::time::timeout(Duration::from_secs(5), wait)
        .await
        .unwrap_or_else(|_| panic!("no record containing {needle:?} reached the intake"))
}

/// Drain everything the intake has captured so far.
pub fn drain(rx: &mut mpsc::UnboundedReceiver<String>) -> Vec<String> {
    let mut out = Vec::new();
    while let Ok(captured) = rx.try_recv() {
        out.push(captured);
    }
    out
}
