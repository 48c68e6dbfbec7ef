//! Shared application state for the relay.
//!
//! Everything here is built once at startup and handed to every handler and
//! hook by `axum`'s `State`. There is no module-level singleton.

use std::sync::{Arc, RwLock};

use crate::bus::EventBus;
use crate::config::RelayConfig;
use crate::obs::TelemetryClient;

/// Process lifecycle: Starting -> Listening -> ShuttingDown -> Terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Starting,
    Listening,
    ShuttingDown,
    Terminated,
}

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
    telemetry: Arc<TelemetryClient>,
    bus: Arc<dyn EventBus>,
}

struct AppStateInner {
    cfg: RelayConfig,
    phase: RwLock<Phase>,
}

impl AppState {
    pub fn new(cfg: RelayConfig, telemetry: Arc<TelemetryClient>, bus: Arc<dyn EventBus>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                cfg,
                phase: RwLock::new(Phase::Starting),
            }),
            telemetry,
            bus,
        }
    }

    pub fn cfg(&self) -> &RelayConfig {
        &self.inner.cfg
    }

    pub fn telemetry(&self) -> Arc<TelemetryClient> {
        Arc::clone(&self.telemetry)
    }

    pub fn bus(&self) -> Arc<dyn EventBus> {
        Arc::clone(&self.bus)
    }

    pub fn phase(&self) -> Phase {
        self.inner
            .phase
            .read()
            .map(|p| *p)
            .unwrap_or(Phase::Terminated)
    }

    pub fn set_phase(&self, phase: Phase) {
        if let Ok(mut p) = self.inner.phase.write() {
            tracing::debug!(from = ?*p, to = ?phase, "lifecycle transition");
            *p = phase;
        }
    }

    /// Readiness is lost as soon as shutdown starts.
    pub fn is_draining(&self) -> bool {
        matches!(self.phase(), Phase::ShuttingDown | Phase::Terminated)
    }
}
