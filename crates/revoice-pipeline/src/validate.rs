//! Input checks that run before any network or filesystem access
//!
//! Every rule is fail-fast and reports the first violation in declaration
//! order. Nothing is clamped: a value outside its range ends the job.

use std::ops::RangeInclusive;

use revoice_storage::{PublishError, validate_bucket_name};
use thiserror::Error;
use url::Url;

use crate::{
    envelope::JobOptions,
    types::{GenerationRequest, SamplingParams, WordTiming},
};

const NUM_STEPS: RangeInclusive<f64> = 1.0..=100.0;
const INIT_TEMP: RangeInclusive<f64> = 0.5..=10.0;
const INIT_DIVERSITY: RangeInclusive<f64> = 0.0..=10.0;
const GUIDANCE: RangeInclusive<f64> = 0.0..=10.0;
const RESCALE: RangeInclusive<f64> = 0.0..=1.0;
const TOPK: RangeInclusive<f64> = 1.0..=10_000.0;
const SYLLABLE_RATIO: RangeInclusive<f64> = 5.0..=25.0;

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("missing required field `{0}`")]
    Missing(&'static str),

    #[error("malformed request: {0}")]
    Malformed(String),

    #[error("`{field}` must be within [{min}, {max}], got {value}")]
    OutOfRange {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },

    #[error("`audio_token_syllable_ratio` is required when `use_manual_ratio` is set")]
    MissingRatio,

    #[error("`{0}` must not be empty")]
    Empty(&'static str),

    #[error("word_times[{index}] ('{word}') must satisfy 0 <= start <= end, got start={start}, end={end}")]
    WordTiming {
        index: usize,
        word: String,
        start: f64,
        end: f64,
    },

    #[error("`{field}` is not a valid http(s) URL: {reason}")]
    Url { field: &'static str, reason: String },

    #[error("`bucket_name` {0}")]
    Bucket(String),
}

/// Check a request and its options
pub fn validate(request: &GenerationRequest, options: &JobOptions) -> Result<(), ValidationError> {
    validate_sampling(request.sampling())?;

    match request {
        GenerationRequest::Inpaint(inpaint) => {
            require_text("input_text", &inpaint.input_text)?;
            require_text("output_text", &inpaint.output_text)?;
            validate_word_times(&inpaint.word_times)?;
            require_url("audio_url", &inpaint.audio_url)?;
        }
        GenerationRequest::TextToSpeech(speech) => {
            require_text("transcript", &speech.transcript)?;
            require_url("reference_audio_url", &speech.reference_audio_url)?;
        }
    }

    validate_options(options)
}

pub fn validate_sampling(params: &SamplingParams) -> Result<(), ValidationError> {
    #[allow(clippy::cast_precision_loss)]
    let (num_steps, topk) = (params.num_steps as f64, params.topk as f64);

    in_range("num_steps", num_steps, &NUM_STEPS)?;
    in_range("init_temp", params.init_temp, &INIT_TEMP)?;
    in_range("init_diversity", params.init_diversity, &INIT_DIVERSITY)?;
    in_range("guidance", params.guidance, &GUIDANCE)?;
    in_range("rescale", params.rescale, &RESCALE)?;
    in_range("topk", topk, &TOPK)?;

    if params.use_manual_ratio {
        let ratio = params.audio_token_syllable_ratio.ok_or(ValidationError::MissingRatio)?;
        in_range("audio_token_syllable_ratio", ratio, &SYLLABLE_RATIO)?;
    }

    Ok(())
}

fn in_range(field: &'static str, value: f64, range: &RangeInclusive<f64>) -> Result<(), ValidationError> {
    // NaN fails `contains`
    if range.contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            field,
            min: *range.start(),
            max: *range.end(),
            value,
        })
    }
}

fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Empty(field));
    }
    Ok(())
}

fn validate_word_times(word_times: &[WordTiming]) -> Result<(), ValidationError> {
    if word_times.is_empty() {
        return Err(ValidationError::Empty("word_times"));
    }

    for (index, timing) in word_times.iter().enumerate() {
        if !(0.0 <= timing.start && timing.start <= timing.end) {
            return Err(ValidationError::WordTiming {
                index,
                word: timing.word.clone(),
                start: timing.start,
                end: timing.end,
            });
        }
    }

    Ok(())
}

fn require_url(field: &'static str, value: &str) -> Result<Url, ValidationError> {
    let url = Url::parse(value).map_err(|e| ValidationError::Url {
        field,
        reason: e.to_string(),
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ValidationError::Url {
            field,
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }

    Ok(url)
}

fn validate_options(options: &JobOptions) -> Result<(), ValidationError> {
    if let Some(bucket) = options.bucket_name.as_deref().filter(|b| !b.is_empty()) {
        validate_bucket_name(bucket).map_err(|err| match err {
            PublishError::InvalidBucket { name, reason } => ValidationError::Bucket(format!("'{name}' {reason}")),
            other => ValidationError::Bucket(other.to_string()),
        })?;
    }

    if let Some(webhook) = options.webhook_url.as_deref().filter(|w| !w.is_empty()) {
        require_url("webhook_url", webhook)?;
    }

    Ok(())
}
