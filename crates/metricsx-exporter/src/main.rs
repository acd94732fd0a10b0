//! metricsx exporter
//!
//! Loads the `metrics` section of a YAML file, starts the configured
//! provider, and serves the exposition endpoint on its own listener when the
//! provider does not bind one (`port: 0`).

use std::time::Duration;

use axum::routing::get;
use metricsx_core::{Context, MetricOptions};
use tracing_subscriber::{fmt, EnvFilter};

use metricsx_exporter::{config, ops, MetricsModule};

const DEFAULT_LISTEN: &str = "0.0.0.0:8080";
const STOP_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "metricsx-exporter failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args().nth(1).unwrap_or_else(|| "metricsx.yaml".into());
    let cfg = config::load_from_file(&path)?;
    tracing::info!(config = ?cfg.summary(), "metrics config loaded");

    let module = MetricsModule::new(&cfg)?;
    module
        .metrics()
        .gauge("up", MetricOptions::new().help("Whether the exporter is running."))?
        .set(1.0, &[]);

    module.start(&Context::background()).await?;

    match module.exposition() {
        Some(exposition) if cfg.prometheus.port == 0 => {
            let listen = std::env::var("METRICSX_LISTEN").unwrap_or_else(|_| DEFAULT_LISTEN.into());
            let app = ops::exposition_router(&cfg.prometheus.path, exposition)
                .route("/healthz", get(ops::healthz));

            tracing::info!(%listen, "metricsx-exporter serving");
            let listener = tokio::net::TcpListener::bind(&listen).await?;
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await?;
        }
        _ => shutdown_signal().await,
    }

    module.stop(&Context::with_timeout(STOP_TIMEOUT)).await?;
    Ok(())
}

async fn shutdown_signal() {
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
