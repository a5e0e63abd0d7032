use reqwest::Client;
use revoice_config::NotifyConfig;
use serde::Serialize;
use thiserror::Error;
use url::Url;

/// Body posted to a completion webhook
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionEvent<'a> {
    pub userid: Option<&'a str>,
    pub audio_url: &'a str,
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("invalid webhook URL {url}: {source}")]
    InvalidUrl { url: String, source: url::ParseError },

    #[error("webhook {url} unreachable: {source}")]
    Request { url: String, source: reqwest::Error },

    #[error("webhook {url} answered {status}")]
    Status { url: String, status: u16 },
}

/// Best-effort completion callbacks
///
/// Each event is posted once; nothing is retried.
#[derive(Clone)]
pub struct Notifier {
    client: Client,
    default_url: Option<Url>,
}

impl Notifier {
    pub fn new(config: &NotifyConfig) -> reqwest::Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            default_url: config.default_webhook_url.clone(),
        })
    }

    /// The endpoint a job reports to: its own, else the operator default
    pub fn target(&self, requested: Option<&str>) -> Option<String> {
        requested
            .filter(|url| !url.is_empty())
            .map(str::to_owned)
            .or_else(|| self.default_url.as_ref().map(Url::to_string))
    }

    pub async fn notify(&self, url: &str, event: &CompletionEvent<'_>) -> Result<(), NotifyError> {
        let parsed = Url::parse(url).map_err(|source| NotifyError::InvalidUrl {
            url: url.to_owned(),
            source,
        })?;

        let response = self
            .client
            .post(parsed)
            .json(event)
            .send()
            .await
            .map_err(|source| NotifyError::Request {
                url: url.to_owned(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Status {
                url: url.to_owned(),
                status: status.as_u16(),
            });
        }

        tracing::debug!(url, "webhook delivered");
        Ok(())
    }
}
