#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod handlers;

use std::{net::SocketAddr, sync::Arc};

use axum::{
    Router,
    routing::{get, post},
};
use revoice_config::{Config, ServerConfig};
use revoice_pipeline::Pipeline;
use tower_http::trace::TraceLayer;

/// Assembled HTTP server
pub struct Server {
    router: Router,
    listen_address: SocketAddr,
}

impl Server {
    /// Build the server and its pipeline from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the pipeline backends cannot be initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let pipeline = revoice_pipeline::build_pipeline(&config).await?;

        Ok(Self::with_pipeline(&config.server, Arc::new(pipeline)))
    }

    /// Build the server around an existing pipeline
    pub fn with_pipeline(config: &ServerConfig, pipeline: Arc<Pipeline>) -> Self {
        let mut app = Router::new()
            .route("/runsync", post(handlers::run_job))
            .route("/run", post(handlers::run_job))
            .with_state(pipeline);

        if config.health.enabled {
            app = app.route(&config.health.path, get(handlers::health));
        }

        app = app.layer(TraceLayer::new_for_http());

        Self {
            router: app,
            listen_address: config.listen_address,
        }
    }

    /// Get the configured listen address
    pub const fn listen_address(&self) -> SocketAddr {
        self.listen_address
    }

    /// Override the configured listen address
    #[must_use]
    pub const fn with_listen_address(mut self, listen_address: SocketAddr) -> Self {
        self.listen_address = listen_address;
        self
    }

    /// Consume the server and return the inner router
    ///
    /// Useful for testing when the caller manages the listener
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Start serving requests
    ///
    /// Blocks until the cancellation token is triggered. In-flight jobs are
    /// allowed to finish.
    pub async fn serve(self, shutdown: tokio_util::sync::CancellationToken) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.listen_address).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!(%local_addr, "server listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.cancelled().await;
                tracing::info!("graceful shutdown initiated");
            })
            .await?;

        Ok(())
    }
}
