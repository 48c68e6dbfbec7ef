//! busrelay: HTTP to EventBridge relay.
//!
//! - `POST /receive-event` echoes inbound events
//! - `POST /send-event` forwards one event to the configured bus
//! - Metrics to a DogStatsD agent, structured logs to the log intake

use std::process::ExitCode;
use std::sync::Arc;

use tracing_subscriber::{fmt, EnvFilter};

use busrelay_gateway::{app_state, bus, config, obs, server};

#[tokio::main]
async fn main() -> ExitCode {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cfg = match config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!(error = %e, "config load failed");
            return ExitCode::FAILURE;
        }
    };

    let telemetry = Arc::new(obs::TelemetryClient::connect(&cfg.telemetry).await);
    let event_bus: Arc<dyn bus::EventBus> = Arc::new(bus::EventBridgeBus::from_config(&cfg.bus).await);

    tracing::info!(listen = %cfg.listen_addr(), bus = %cfg.bus.bus_name, "busrelay starting");
    let state = app_state::AppState::new(cfg, telemetry, event_bus);

    match server::run(state).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "busrelay terminated");
            ExitCode::FAILURE
        }
    }
}
