//! Process lifecycle: bind, serve, and graceful shutdown.
//!
//! Starting -> Listening on a successful bind, Starting -> Terminated on a
//! failed one, Listening -> ShuttingDown -> Terminated on a termination signal.

use std::future::Future;

use serde_json::json;
use tokio::net::TcpListener;

use busrelay_core::error::{RelayError, Result};

use crate::app_state::{AppState, Phase};
use crate::obs::STATUS_GAUGE;
use crate::router;

/// Bind the configured address and serve until SIGTERM / Ctrl+C.
///
/// A bind failure is the one fatal path: it is logged (remote attempt
/// awaited), the status gauge drops to 0, and the error is returned so the
/// binary exits non-zero.
pub async fn run(state: AppState) -> Result<()> {
    let addr = state.cfg().listen_addr();
    let listener = match TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            let telemetry = state.telemetry();
            telemetry
                .error_and_flush(
                    "Failed to start server",
                    Some(json!({ "address": addr, "error": e.to_string() })),
                )
                .await;
            telemetry.gauge(STATUS_GAUGE, 0.0, &[]);
            state.set_phase(Phase::Terminated);
            return Err(RelayError::Internal(format!("bind {addr} failed: {e}")));
        }
    };

    serve(state, listener, shutdown_signal()).await
}

/// Serve on an already bound listener until `shutdown` resolves.
pub async fn serve<F>(state: AppState, listener: TcpListener, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let local = listener
        .local_addr()
        .map_err(|e| RelayError::Internal(format!("listener address: {e}")))?;

    let telemetry = state.telemetry();
    state.set_phase(Phase::Listening);
    telemetry.info(
        &format!("Server listening on {local}"),
        Some(json!({ "host": local.ip().to_string(), "port": local.port() })),
    );
    telemetry.gauge(STATUS_GAUGE, 1.0, &[]);

    let app = router::build_router(state.clone());
    let draining = state.clone();

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.await;
            begin_shutdown(&draining).await;
        })
        .await
        .map_err(|e| RelayError::Internal(format!("server failed: {e}")))?;

    state.set_phase(Phase::Terminated);
    tracing::info!("server stopped");
    Ok(())
}

/// Log intent, drop the status gauge, release the metric sink. The server
/// stops accepting once this returns.
///
/// The remote log is awaited: `main` drops the runtime right after `serve`
/// returns, which would cancel a detached send.
async fn begin_shutdown(state: &AppState) {
    state.set_phase(Phase::ShuttingDown);
    let telemetry = state.telemetry();
    telemetry.info_and_flush("Shutting down server", None).await;
    telemetry.gauge(STATUS_GAUGE, 0.0, &[]);
    telemetry.close();
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("signal received, starting graceful shutdown");
}
