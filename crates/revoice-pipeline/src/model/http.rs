//! Model backend reached over HTTP

use std::path::Path;

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};
use reqwest::Client;
use revoice_config::ModelConfig;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use super::{AudioModel, InpaintInput, ModelError, ModelParams, RawModelOutput, SynthesisInput};
use crate::types::WordTiming;

/// Inference server exposing `POST /inpaint` and `POST /synthesize`
///
/// Both endpoints answer with the raw `[sample_rate, samples]` result.
/// No request deadline is applied: generation time is unbounded.
pub struct HttpModel {
    client: Client,
    base_url: String,
    api_key: Option<SecretString>,
}

impl HttpModel {
    pub fn new(config: &ModelConfig) -> Result<Self, ModelError> {
        let client = Client::builder()
            .tcp_nodelay(true)
            .build()
            .map_err(|e| ModelError::Connection(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            api_key: config.api_key.clone(),
        })
    }

    async fn call<B: Serialize + Sync>(&self, endpoint: &str, body: &B) -> Result<RawModelOutput, ModelError> {
        let url = format!("{}/{endpoint}", self.base_url);

        let mut request = self.client.post(&url).json(body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key.expose_secret());
        }

        let response = request.send().await.map_err(|e| {
            tracing::debug!("model backend request failed: {e}");
            ModelError::Connection(format!("failed to reach model backend at {url}: {e}"))
        })?;

        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            tracing::debug!("model backend error ({status}): {message}");

            return Err(ModelError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let value = response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| ModelError::InvalidResponse(e.to_string()))?;

        Ok(RawModelOutput(value))
    }
}

#[derive(Serialize)]
struct InpaintBody<'a> {
    audio_base64: String,
    input_text: &'a str,
    output_text: &'a str,
    input_word_times: &'a [WordTiming],
    #[serde(flatten)]
    params: ModelParams,
}

#[derive(Serialize)]
struct SynthesisBody<'a> {
    reference_audio_base64: String,
    text: &'a str,
    #[serde(flatten)]
    params: ModelParams,
}

async fn read_base64(path: &Path) -> Result<String, ModelError> {
    let bytes = tokio::fs::read(path).await.map_err(|e| ModelError::Input {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    Ok(STANDARD.encode(bytes))
}

#[async_trait]
impl AudioModel for HttpModel {
    async fn inpaint(&self, input: &InpaintInput<'_>) -> Result<RawModelOutput, ModelError> {
        tracing::debug!(
            words = input.word_times.len(),
            num_steps = input.params.num_steps,
            "model inpaint request"
        );

        let body = InpaintBody {
            audio_base64: read_base64(input.audio).await?,
            input_text: input.input_text,
            output_text: input.output_text,
            input_word_times: input.word_times,
            params: input.params,
        };

        self.call("inpaint", &body).await
    }

    async fn synthesize(&self, input: &SynthesisInput<'_>) -> Result<RawModelOutput, ModelError> {
        tracing::debug!(text_len = input.text.len(), num_steps = input.params.num_steps, "model synthesis request");

        let body = SynthesisBody {
            reference_audio_base64: read_base64(input.reference_audio).await?,
            text: input.text,
            params: input.params,
        };

        self.call("synthesize", &body).await
    }

    fn name(&self) -> &str {
        "http"
    }
}
