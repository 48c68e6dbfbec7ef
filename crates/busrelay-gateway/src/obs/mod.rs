//! Observability: metrics to a DogStatsD agent, structured logs to an HTTPS
//! intake, both behind [`TelemetryClient`].

pub mod client;
pub mod logs;
pub mod sink;

pub use client::{status_bucket, BusOperation, TelemetryClient, STATUS_GAUGE};
pub use logs::{LogLevel, LogRecord, LogShipper};
pub use sink::{MemorySink, MetricSink, UdpSink};
