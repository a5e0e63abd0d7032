use serde::Deserialize;

/// Defaults applied per task when the request leaves them out
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobsConfig {
    #[serde(default)]
    pub inpaint_key_prefix: String,
    #[serde(default = "default_tts_key_prefix")]
    pub tts_key_prefix: String,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            inpaint_key_prefix: String::new(),
            tts_key_prefix: default_tts_key_prefix(),
        }
    }
}

fn default_tts_key_prefix() -> String {
    "tts/".to_string()
}
