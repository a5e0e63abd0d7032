use std::{path::PathBuf, time::Duration};

use serde::Deserialize;

/// Remote audio retrieval configuration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FetchConfig {
    /// Deadline for a single download
    #[serde(default = "default_timeout", with = "crate::duration")]
    pub timeout: Duration,
    /// Directory for downloaded files; the system temp dir when absent
    #[serde(default)]
    pub temp_dir: Option<PathBuf>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            temp_dir: None,
        }
    }
}

const fn default_timeout() -> Duration {
    Duration::from_secs(30)
}
