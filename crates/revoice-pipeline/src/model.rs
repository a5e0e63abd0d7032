pub mod http;

use std::path::Path;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::types::{SamplingParams, WordTiming};

/// Errors raised by a model backend
#[derive(Debug, Error)]
pub enum ModelError {
    /// Backend could not be reached
    #[error("connection error: {0}")]
    Connection(String),

    /// Backend answered with a non-success status
    #[error("backend error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Backend answered with a body that is not JSON
    #[error("unreadable response: {0}")]
    InvalidResponse(String),

    /// Input audio could not be read
    #[error("failed to read input audio {path}: {message}")]
    Input { path: String, message: String },

    /// The model itself raised
    #[error("{0}")]
    Failed(String),
}

/// The loosely-typed value a model returns, nominally `[sample_rate, samples]`
///
/// Nothing about its shape is trusted until the invoker has checked it.
#[derive(Debug, Clone, PartialEq)]
pub struct RawModelOutput(pub serde_json::Value);

/// Generation knobs forwarded to the model
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ModelParams {
    pub num_steps: i64,
    pub init_temp: f64,
    pub init_diversity: f64,
    pub guidance: f64,
    pub rescale: f64,
    pub topk: i64,
    /// `None` unless the caller opted into manual ratio mode
    pub audio_token_syllable_ratio: Option<f64>,
}

impl From<&SamplingParams> for ModelParams {
    fn from(params: &SamplingParams) -> Self {
        Self {
            num_steps: params.num_steps,
            init_temp: params.init_temp,
            init_diversity: params.init_diversity,
            guidance: params.guidance,
            rescale: params.rescale,
            topk: params.topk,
            audio_token_syllable_ratio: params.effective_ratio(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct InpaintInput<'a> {
    /// Local copy of the source recording
    pub audio: &'a Path,
    pub input_text: &'a str,
    pub output_text: &'a str,
    pub word_times: &'a [WordTiming],
    pub params: ModelParams,
}

#[derive(Debug, Clone, Copy)]
pub struct SynthesisInput<'a> {
    /// Local copy of the voice reference
    pub reference_audio: &'a Path,
    pub text: &'a str,
    pub params: ModelParams,
}

/// Generative audio capability
///
/// Implementations return the model result untouched; validating it is the
/// invoker's job.
#[async_trait]
pub trait AudioModel: Send + Sync {
    /// Regenerate the edited span of a recording
    async fn inpaint(&self, input: &InpaintInput<'_>) -> Result<RawModelOutput, ModelError>;

    /// Speak text in the voice of a reference recording
    async fn synthesize(&self, input: &SynthesisInput<'_>) -> Result<RawModelOutput, ModelError>;

    /// Backend name for logs
    fn name(&self) -> &str;
}
