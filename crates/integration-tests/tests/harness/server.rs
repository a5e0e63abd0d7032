//! Test server wrapper that starts the worker on a random port

use std::{net::SocketAddr, sync::Arc};

use revoice_config::Config;
use revoice_pipeline::PipelineBuilder;
use revoice_server::Server;
use revoice_storage::MemoryStore;
use tokio_util::sync::CancellationToken;

/// A running test server instance backed by an in-memory store
pub struct TestServer {
    addr: SocketAddr,
    shutdown: CancellationToken,
    client: reqwest::Client,
    store: MemoryStore,
}

impl TestServer {
    /// Start a test server with the given configuration
    ///
    /// Binds to port 0 for automatic port assignment
    pub async fn start(config: Config) -> anyhow::Result<Self> {
        let store = MemoryStore::new("https://cdn.example.com");

        let pipeline = PipelineBuilder::new(&config)
            .store(Arc::new(store.clone()))
            .build()
            .await?;
        let server = Server::with_pipeline(&config.server, Arc::new(pipeline));

        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        // Bind the listener here so we know the actual port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        tokio::spawn(async move {
            axum::serve(listener, server.into_router())
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self {
            addr,
            shutdown,
            client: reqwest::Client::new(),
            store,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    /// Submit an event to `path` and return the outcome body
    pub async fn submit(&self, path: &str, event: &serde_json::Value) -> serde_json::Value {
        let response = self
            .client
            .post(self.url(path))
            .json(event)
            .send()
            .await
            .expect("request failed");

        assert_eq!(response.status(), 200);
        response.json().await.expect("outcome is JSON")
    }

    pub async fn run_sync(&self, event: &serde_json::Value) -> serde_json::Value {
        self.submit("/runsync", event).await
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
