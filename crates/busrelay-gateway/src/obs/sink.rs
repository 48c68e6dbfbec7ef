//! Metric sinks.
//!
//! A sink receives fully encoded DogStatsD lines. Sending is fire-and-forget:
//! sinks never report errors back to the emitter.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, RwLock};

use tokio::net::UdpSocket;

use busrelay_core::metric::{decode_line, Metric};

pub trait MetricSink: Send + Sync {
    /// Deliver one encoded line. Must not block and must not fail.
    fn send(&self, line: &str);
    /// Release the transport. Lines sent afterwards are dropped.
    fn close(&self);
}

/// One datagram per line to a DogStatsD agent.
pub struct UdpSink {
    socket: RwLock<Option<UdpSocket>>,
}

impl UdpSink {
    /// Connect to `host:port`. Resolution or bind failures yield a disabled
    /// sink (with a warning) rather than an error.
    pub async fn connect(host: &str, port: u16) -> Self {
        match Self::try_connect(host, port).await {
            Ok(socket) => Self {
                socket: RwLock::new(Some(socket)),
            },
            Err(e) => {
                tracing::warn!(%host, port, error = %e, "metrics agent unreachable, metrics disabled");
                Self::disabled()
            }
        }
    }

    async fn try_connect(host: &str, port: u16) -> std::io::Result<UdpSocket> {
        let target = tokio::net::lookup_host((host, port))
            .await?
            .next()
            .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::NotFound, "no address"))?;
        let local = if target.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };
        let socket = UdpSocket::bind(local).await?;
        socket.connect(target).await?;
        Ok(socket)
    }

    pub fn disabled() -> Self {
        Self {
            socket: RwLock::new(None),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.socket.read().map(|s| s.is_some()).unwrap_or(false)
    }
}

impl MetricSink for UdpSink {
    fn send(&self, line: &str) {
        let Ok(guard) = self.socket.read() else { return };
        if let Some(socket) = guard.as_ref() {
            if let Err(e) = socket.try_send(line.as_bytes()) {
                tracing::trace!(error = %e, "metric datagram dropped");
            }
        }
    }

    fn close(&self) {
        if let Ok(mut guard) = self.socket.write() {
            guard.take();
        }
    }
}

/// Keeps every line in memory. Used by tests and for local dry runs.
#[derive(Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
    closed: AtomicBool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }

    /// Lines decoded back into metrics (names include the prefix).
    pub fn metrics(&self) -> Vec<Metric> {
        self.lines().iter().filter_map(|l| decode_line(l)).collect()
    }

    /// Metrics whose name, minus `prefix`, equals `name`.
    pub fn named(&self, prefix: &str, name: &str) -> Vec<Metric> {
        self.metrics()
            .into_iter()
            .filter(|m| m.name.strip_prefix(prefix) == Some(name))
            .collect()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Relaxed)
    }
}

impl MetricSink for MemorySink {
    fn send(&self, line: &str) {
        if self.is_closed() {
            return;
        }
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(line.to_string());
        }
    }

    fn close(&self) {
        self.closed.store(true, Ordering::Relaxed);
    }
}
