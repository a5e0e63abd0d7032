use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

/// Bucket used when a job does not name one
pub const DEFAULT_BUCKET: &str = "playdiffusion-inpainted-audio";

/// S3-compatible object storage configuration
///
/// Credentials are injected here and nowhere else; the publisher never
/// reads the environment on its own.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Service endpoint (e.g. `https://sfo3.digitaloceanspaces.com`);
    /// AWS S3 proper when absent
    #[serde(default)]
    pub endpoint: Option<Url>,
    #[serde(default = "default_region")]
    pub region: String,
    #[serde(default)]
    pub access_key_id: Option<SecretString>,
    #[serde(default)]
    pub secret_access_key: Option<SecretString>,
    /// How bucket names appear in request and public URLs
    #[serde(default)]
    pub url_style: UrlStyle,
    #[serde(default = "default_bucket")]
    pub default_bucket: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            region: default_region(),
            access_key_id: None,
            secret_access_key: None,
            url_style: UrlStyle::default(),
            default_bucket: default_bucket(),
        }
    }
}

/// Addressing style for bucket URLs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrlStyle {
    /// `https://<bucket>.<host>/<key>`
    #[default]
    VirtualHost,
    /// `https://<host>/<bucket>/<key>`
    Path,
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_bucket() -> String {
    DEFAULT_BUCKET.to_string()
}
