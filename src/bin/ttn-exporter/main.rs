mod args;

use std::process::ExitCode;

use anyhow::{Context as _, Result};
use args::{Args, Config};
use clap::Parser as _;
use tokio::{net::TcpListener, signal, sync::watch};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use ttn_exporter::{exporter, metrics::ExporterMetrics, server, ttn::MeasurementFetcher};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Nothing is bound or spawned without a project and token.
    let Some(config) = Args::parse().into_config() else {
        println!("missing project and/or token");
        return ExitCode::from(0);
    };

    if let Err(e) = run(config).await {
        eprintln!("{e:#}");
        return ExitCode::from(1);
    }

    ExitCode::from(0)
}

async fn run(config: Config) -> Result<()> {
    let metrics = ExporterMetrics::new().context("failed to register metrics")?;

    let fetcher = MeasurementFetcher::new(&config.project, &config.token, config.timeout)
        .context("failed to build HTTP client")?;

    let listener = TcpListener::bind(config.listen)
        .await
        .with_context(|| format!("failed to bind {}", config.listen))?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    info!(project = %config.project, "polling measurements");
    let exporter = tokio::spawn(exporter::run(
        fetcher,
        metrics.clone(),
        config.interval,
        shutdown_rx.clone(),
    ));

    tokio::spawn(async move {
        shutdown_signal().await;
        info!("shutting down");
        let _ = shutdown_tx.send(true);
    });

    server::serve(listener, metrics, shutdown_rx)
        .await
        .context("metrics server failed")?;

    exporter.await.context("exporter loop panicked")?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
