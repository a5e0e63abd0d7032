//! Programmatic configuration builder for integration tests

use std::{net::SocketAddr, path::Path};

use revoice_config::Config;

/// Builder for constructing test configurations
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Minimal configuration: loopback listener and a fixed default bucket
    pub fn new() -> Self {
        let mut config = Config::default();
        config.server.listen_address = SocketAddr::from(([127, 0, 0, 1], 0));
        config.storage.default_bucket = "generated-audio".to_owned();

        Self { config }
    }

    /// Point the HTTP model backend at a mock inference server
    pub fn with_model(mut self, base_url: &str) -> Self {
        self.config.model.base_url = base_url.to_owned();
        self
    }

    /// Keep scoped temp files in `dir` so tests can check cleanup
    pub fn with_temp_dir(mut self, dir: &Path) -> Self {
        self.config.fetch.temp_dir = Some(dir.to_path_buf());
        self
    }

    /// Operator webhook for speech jobs that do not name one
    pub fn with_default_webhook(mut self, url: &str) -> Self {
        self.config.notify.default_webhook_url = Some(url.parse().expect("valid URL"));
        self
    }

    pub fn with_tts_prefix(mut self, prefix: &str) -> Self {
        self.config.jobs.tts_key_prefix = prefix.to_owned();
        self
    }

    /// Disable the health endpoint
    pub fn without_health(mut self) -> Self {
        self.config.server.health.enabled = false;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
