#![allow(clippy::must_use_candidate)]

mod duration;
mod env;
pub mod fetch;
pub mod jobs;
mod loader;
pub mod model;
pub mod notify;
pub mod server;
pub mod storage;
pub mod telemetry;

use serde::Deserialize;

pub use fetch::*;
pub use jobs::*;
pub use model::*;
pub use notify::*;
pub use server::*;
pub use storage::*;
pub use telemetry::*;

/// Top-level worker configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// HTTP shim configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Object storage target for generated audio
    #[serde(default)]
    pub storage: StorageConfig,
    /// Remote audio retrieval
    #[serde(default)]
    pub fetch: FetchConfig,
    /// Inference backend
    #[serde(default)]
    pub model: ModelConfig,
    /// Completion webhooks
    #[serde(default)]
    pub notify: NotifyConfig,
    /// Per-task defaults
    #[serde(default)]
    pub jobs: JobsConfig,
    /// Logging
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}
