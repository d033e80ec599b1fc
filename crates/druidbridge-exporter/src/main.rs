//! druidbridge exporter
//!
//! - Emitter endpoint: POST /druid (Druid HTTP emitter batches)
//! - Metrics endpoint: GET /metrics
//! - Liveness sweep evicts series not reported for the cleanup TTL

use std::process::ExitCode;

use clap::Parser;

use druidbridge_core::error::{BridgeError, Result};
use druidbridge_exporter::{app_state, config, router, telemetry};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = config::Cli::parse();
    let cfg = match config::load_optional(&cli.config).and_then(|cfg| cli.apply(cfg)) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("druidbridge: {e}");
            return ExitCode::FAILURE;
        }
    };
    telemetry::init(&cfg.log);

    match run(cfg).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, code = e.client_code().as_str(), "druidbridge exited with error");
            ExitCode::FAILURE
        }
    }
}

async fn run(cfg: config::ExporterConfig) -> Result<()> {
    let listen = cfg.exporter.listen_addr()?;
    let schema = app_state::load_schema(&cfg)?;
    let state = app_state::AppState::new(cfg, schema)?;
    let background = state.start_background();
    let app = router::build_router(state);

    tracing::info!(%listen, "druidbridge exporter starting");
    tracing::info!("metrics endpoint - http://{listen}/metrics");
    tracing::info!("druid emitter endpoint - http://{listen}/druid");
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| BridgeError::Internal(format!("failed to bind {listen}: {e}")))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| BridgeError::Internal(format!("server failed: {e}")))?;

    for task in background {
        task.shutdown().await;
    }
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to install SIGTERM handler");
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
