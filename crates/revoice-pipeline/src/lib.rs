#![allow(clippy::missing_errors_doc, clippy::must_use_candidate)]

mod encode;
mod envelope;
mod error;
mod fetch;
mod invoke;
pub mod model;
mod normalize;
mod notify;
mod outcome;
mod pipeline;
mod temp;
mod types;
mod validate;

pub use encode::{EncodingError, decode_wav, encode_wav};
pub use envelope::{Echo, Job, JobOptions};
pub use error::{ErrorKind, PipelineError, Result};
pub use fetch::{FetchError, Fetcher};
pub use invoke::{FALLBACK_SAMPLE_RATE, InvocationError, ModelInvoker, ModelOutput, SampleArray};
pub use model::{AudioModel, InpaintInput, ModelError, ModelParams, RawModelOutput, SynthesisInput};
pub use normalize::{CanonicalAudio, NormalizationError, normalize};
pub use notify::{CompletionEvent, NotifyError, Notifier};
pub use outcome::PipelineOutcome;
pub use pipeline::{Pipeline, PipelineBuilder};
pub use temp::ScopedTempResource;
pub use types::{GenerationRequest, InpaintRequest, SamplingParams, SpeechRequest, Task, WordTiming};
pub use validate::{ValidationError, validate, validate_sampling};

/// Build the pipeline with the configured model backend and S3 storage
pub async fn build_pipeline(config: &revoice_config::Config) -> anyhow::Result<Pipeline> {
    PipelineBuilder::new(config).build().await
}
