use secrecy::SecretString;
use serde::Deserialize;

/// Inference backend configuration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Bearer token sent to the backend
    #[serde(default)]
    pub api_key: Option<SecretString>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:9000".to_string()
}
