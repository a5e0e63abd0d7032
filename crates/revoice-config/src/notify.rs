use std::time::Duration;

use serde::Deserialize;
use url::Url;

/// Completion webhook configuration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NotifyConfig {
    /// Operator endpoint used by speech jobs that do not supply `webhook_url`
    #[serde(default)]
    pub default_webhook_url: Option<Url>,
    #[serde(default = "default_timeout", with = "crate::duration")]
    pub timeout: Duration,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            default_webhook_url: None,
            timeout: default_timeout(),
        }
    }
}

const fn default_timeout() -> Duration {
    Duration::from_secs(10)
}
