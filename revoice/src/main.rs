#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod args;

use std::{path::Path, process::ExitCode};

use anyhow::Context as _;
use args::Args;
use clap::Parser;
use revoice_config::Config;
use revoice_server::Server;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    // Load configuration
    let mut config = Config::load(&args.config)?;
    if let Some(listen) = args.listen {
        config.server.listen_address = listen;
    }

    // Initialize telemetry
    revoice_telemetry::init(&config.telemetry)?;

    tracing::info!(
        config_path = %args.config.display(),
        "starting revoice"
    );

    match args.event {
        Some(path) => run_event(&config, &path).await,
        None => serve(config).await.map(|()| ExitCode::SUCCESS),
    }
}

/// Process one event file and print the outcome to stdout
async fn run_event(config: &Config, path: &Path) -> anyhow::Result<ExitCode> {
    let raw = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read event file {}", path.display()))?;
    let event = serde_json::from_slice(&raw).with_context(|| format!("event file {} is not JSON", path.display()))?;

    let pipeline = revoice_pipeline::build_pipeline(config).await?;
    let outcome = pipeline.handle_event(event).await;

    println!("{}", serde_json::to_string(&outcome)?);

    Ok(if outcome.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let server = Box::pin(Server::new(config)).await?;

    // Set up graceful shutdown
    let shutdown = CancellationToken::new();
    let shutdown_clone = shutdown.clone();

    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown_clone.cancel();
    });

    server.serve(shutdown).await?;

    tracing::info!("revoice stopped");
    Ok(())
}

/// Wait for a shutdown signal (`SIGINT` or `SIGTERM`)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }

    tracing::info!("shutdown signal received");
}
