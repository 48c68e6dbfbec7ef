//! Process-wide observability client.
//!
//! Wraps a [`MetricSink`] and a [`LogShipper`] behind metric primitives, leveled
//! logging, and the request/bus tracking helpers. Constructed once at startup
//! and shared through `AppState`.
//!
//! Nothing here returns an error to the caller. Metric sends are best-effort,
//! log shipping failures are reported to local tracing output only, and the
//! remote half of `info`/`warn`/`error` runs as a detached task.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde_json::Value;

use busrelay_core::metric::{encode_line, Metric, MetricKind};

use crate::config::TelemetryConfig;
use crate::context::RequestDescriptor;
use crate::obs::logs::{LogLevel, LogRecord, LogShipper};
use crate::obs::sink::{MetricSink, UdpSink};

/// Liveness gauge: 1 while listening, 0 otherwise.
pub const STATUS_GAUGE: &str = "server.status";

/// Bus operation reported by [`TelemetryClient::track_eventbridge_operation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusOperation {
    Send,
    Receive,
}

impl BusOperation {
    pub fn as_str(self) -> &'static str {
        match self {
            BusOperation::Send => "send",
            BusOperation::Receive => "receive",
        }
    }
}

/// Outcome bucket for a response status, if any.
pub fn status_bucket(status: u16) -> Option<&'static str> {
    match status {
        500.. => Some("request.error.5xx"),
        400..=499 => Some("request.error.4xx"),
        200..=299 => Some("request.success"),
        _ => None,
    }
}

pub struct TelemetryClient {
    prefix: String,
    global_tags: Vec<String>,
    sink: Arc<dyn MetricSink>,
    shipper: LogShipper,
    source: String,
    service: String,
    hostname: String,
    closed: AtomicBool,
}

impl TelemetryClient {
    /// Connect the UDP sink described by `cfg`.
    pub async fn connect(cfg: &TelemetryConfig) -> Self {
        let sink = UdpSink::connect(&cfg.agent_host, cfg.agent_port).await;
        Self::with_sink(cfg, Arc::new(sink))
    }

    pub fn with_sink(cfg: &TelemetryConfig, sink: Arc<dyn MetricSink>) -> Self {
        Self {
            prefix: cfg.prefix.clone(),
            global_tags: cfg.global_tags.clone(),
            sink,
            shipper: LogShipper::new(&cfg.logs_url, cfg.api_key.clone()),
            source: cfg.source.clone(),
            service: cfg.service.clone(),
            hostname: cfg.hostname.clone(),
            closed: AtomicBool::new(false),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    // --------------------
    // Metric primitives
    // --------------------

    fn emit(&self, kind: MetricKind, name: &str, value: f64, tags: &[String]) {
        if self.closed.load(Ordering::Relaxed) {
            return;
        }
        let metric = Metric::new(kind, name, value, tags);
        if let Some(line) = encode_line(&self.prefix, &metric, &self.global_tags) {
            self.sink.send(&line);
        }
    }

    pub fn increment(&self, name: &str, value: f64, tags: &[String]) {
        self.emit(MetricKind::Count, name, value, tags);
    }

    pub fn gauge(&self, name: &str, value: f64, tags: &[String]) {
        self.emit(MetricKind::Gauge, name, value, tags);
    }

    pub fn histogram(&self, name: &str, value: f64, tags: &[String]) {
        self.emit(MetricKind::Histogram, name, value, tags);
    }

    pub fn timing(&self, name: &str, value: f64, tags: &[String]) {
        self.emit(MetricKind::Timing, name, value, tags);
    }

    pub fn distribution(&self, name: &str, value: f64, tags: &[String]) {
        self.emit(MetricKind::Distribution, name, value, tags);
    }

    // --------------------
    // Logging
    // --------------------

    fn record(&self, level: LogLevel, message: &str, context: Option<Value>) -> LogRecord {
        LogRecord::new(&self.source, &self.service, &self.hostname, level, message, context)
    }

    /// Ship one record and wait for the attempt to finish.
    ///
    /// Skipped with a local warning when no API key is configured. Failures
    /// are written to local output and never returned.
    pub async fn log(&self, level: LogLevel, message: &str, context: Option<Value>) {
        if !self.shipper.is_enabled() {
            tracing::warn!("DD_API_KEY not set, skipping log shipping");
            return;
        }
        ship_or_report(&self.shipper, self.record(level, message, context)).await;
    }

    pub fn info(&self, message: &str, context: Option<Value>) {
        self.write_and_ship(LogLevel::Info, message, context);
    }

    pub fn warn(&self, message: &str, context: Option<Value>) {
        self.write_and_ship(LogLevel::Warn, message, context);
    }

    pub fn error(&self, message: &str, context: Option<Value>) {
        self.write_and_ship(LogLevel::Error, message, context);
    }

    /// Like [`Self::info`] but waits for the remote attempt. Used on paths
    /// where the runtime may be dropped right after.
    pub async fn info_and_flush(&self, message: &str, context: Option<Value>) {
        self.write_and_flush(LogLevel::Info, message, context).await;
    }

    /// Like [`Self::error`] but waits for the remote attempt.
    pub async fn error_and_flush(&self, message: &str, context: Option<Value>) {
        self.write_and_flush(LogLevel::Error, message, context).await;
    }

    async fn write_and_flush(&self, level: LogLevel, message: &str, context: Option<Value>) {
        write_local(level, message, context.as_ref());
        self.log(level, message, context).await;
    }

    fn write_and_ship(&self, level: LogLevel, message: &str, context: Option<Value>) {
        write_local(level, message, context.as_ref());

        if !self.shipper.is_enabled() {
            tracing::warn!("DD_API_KEY not set, skipping log shipping");
            return;
        }
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::debug!("no async runtime, remote log skipped");
            return;
        };

        let shipper = self.shipper.clone();
        let record = self.record(level, message, context);
        // Detached: the outcome never reaches the caller.
        handle.spawn(async move {
            ship_or_report(&shipper, record).await;
        });
    }

    // --------------------
    // Semantic helpers
    // --------------------

    /// Count, timing, and size histogram for a finished request, plus at most
    /// one outcome bucket chosen by status range.
    pub fn track_request(&self, req: &RequestDescriptor, duration_ms: f64, status: u16) {
        let tags = vec![
            format!("method:{}", req.method),
            format!("route:{}", req.route_or_unknown()),
            format!("status:{status}"),
        ];

        self.increment("request.count", 1.0, &tags);
        self.timing("request.duration", duration_ms, &tags);
        self.histogram("request.size", req.payload_size(), &tags);

        if let Some(bucket) = status_bucket(status) {
            self.increment(bucket, 1.0, &tags);
        }
    }

    /// A zero duration counts as "not supplied" and emits no timing.
    pub fn track_eventbridge_operation(
        &self,
        operation: BusOperation,
        success: bool,
        duration_ms: Option<f64>,
    ) {
        let op = operation.as_str();
        let tags = vec![format!("operation:{op}"), format!("success:{success}")];

        self.increment(&format!("eventbridge.{op}.count"), 1.0, &tags);

        if let Some(ms) = duration_ms.filter(|ms| *ms != 0.0 && !ms.is_nan()) {
            self.timing(&format!("eventbridge.{op}.duration"), ms, &tags);
        }

        if !success {
            self.increment(&format!("eventbridge.{op}.error"), 1.0, &tags);
        }
    }

    /// Release the metric sink. Later emissions are dropped.
    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::Relaxed) {
            self.sink.close();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Relaxed)
    }
}

fn write_local(level: LogLevel, message: &str, context: Option<&Value>) {
    let ctx = context.map(Value::to_string).unwrap_or_default();
    match level {
        LogLevel::Info => tracing::info!(context = %ctx, "{message}"),
        LogLevel::Warn => tracing::warn!(context = %ctx, "{message}"),
        LogLevel::Error => tracing::error!(context = %ctx, "{message}"),
    }
}

async fn ship_or_report(shipper: &LogShipper, record: LogRecord) {
    if let Err(e) = shipper.ship(&record).await {
        tracing::error!(error = %e, level = record.level.as_str(), "failed to ship log record");
    }
}
