use std::path::PathBuf;

use reqwest::Client;
use revoice_config::FetchConfig;
use thiserror::Error;

use crate::temp::ScopedTempResource;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to download audio from {url}: HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("timed out downloading audio from {url}")]
    Timeout { url: String },

    #[error("failed to download audio from {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The download succeeded but could not be written locally
    #[error("failed to store audio downloaded from {url}: {source}")]
    Materialize {
        url: String,
        #[source]
        source: std::io::Error,
    },
}

/// Downloads source audio into scoped temp files
pub struct Fetcher {
    client: Client,
    temp_dir: Option<PathBuf>,
}

impl Fetcher {
    /// Build a fetcher with the configured deadline
    pub fn new(config: &FetchConfig) -> reqwest::Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            temp_dir: config.temp_dir.clone(),
        })
    }

    /// Download `url` once, without retries
    pub async fn fetch(&self, url: &str) -> Result<ScopedTempResource, FetchError> {
        tracing::info!(url, "downloading audio");

        let request_failed = |source: reqwest::Error| {
            if source.is_timeout() {
                FetchError::Timeout { url: url.to_owned() }
            } else {
                FetchError::Request {
                    url: url.to_owned(),
                    source,
                }
            }
        };

        let response = self.client.get(url).send().await.map_err(request_failed)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_owned(),
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await.map_err(request_failed)?;

        let resource =
            ScopedTempResource::materialize(&bytes, self.temp_dir.as_deref()).map_err(|source| {
                FetchError::Materialize {
                    url: url.to_owned(),
                    source,
                }
            })?;

        tracing::debug!(url, bytes = bytes.len(), path = %resource.path().display(), "audio downloaded");

        Ok(resource)
    }
}
