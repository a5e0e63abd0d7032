//! Typed boundary around the generative model
//!
//! The model result is loosely typed JSON. Its shape is checked exactly once,
//! here, so everything downstream works with [`ModelOutput`].

use std::{path::Path, sync::Arc};

use serde_json::Value;
use thiserror::Error;

use crate::{
    model::{AudioModel, InpaintInput, ModelError, ModelParams, RawModelOutput, SynthesisInput},
    types::GenerationRequest,
};

/// Rate assumed when the model declares a non-integer sample rate
pub const FALLBACK_SAMPLE_RATE: i64 = 16_000;

#[derive(Debug, Error)]
pub enum InvocationError {
    #[error(transparent)]
    Model(#[from] ModelError),

    /// The result is not a `[sample_rate, samples]` pair
    #[error("expected a [sample_rate, samples] pair, got {0}")]
    Arity(String),

    /// The samples are not a numeric array
    #[error("invalid sample array: {0}")]
    Samples(String),
}

/// A dense numeric array in row-major order
#[derive(Debug, Clone, PartialEq)]
pub struct SampleArray {
    /// Length of each dimension; `[n]` for rank 1, `[frames, channels]` for rank 2
    pub shape: Vec<usize>,
    pub data: Vec<f64>,
}

impl SampleArray {
    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Model result with a checked shape but unchecked content
#[derive(Debug, Clone, PartialEq)]
pub struct ModelOutput {
    pub sample_rate: i64,
    pub samples: SampleArray,
}

/// Runs a request against the model and enforces the result contract
#[derive(Clone)]
pub struct ModelInvoker {
    model: Arc<dyn AudioModel>,
}

impl ModelInvoker {
    pub fn new(model: Arc<dyn AudioModel>) -> Self {
        Self { model }
    }

    /// Invoke the model with the materialized source audio
    pub async fn invoke(&self, request: &GenerationRequest, audio: &Path) -> Result<ModelOutput, InvocationError> {
        let params = ModelParams::from(request.sampling());

        tracing::debug!(model = self.model.name(), task = %request.task(), "invoking model");

        let raw = match request {
            GenerationRequest::Inpaint(request) => {
                self.model
                    .inpaint(&InpaintInput {
                        audio,
                        input_text: &request.input_text,
                        output_text: &request.output_text,
                        word_times: &request.word_times,
                        params,
                    })
                    .await?
            }
            GenerationRequest::TextToSpeech(request) => {
                self.model
                    .synthesize(&SynthesisInput {
                        reference_audio: audio,
                        text: &request.transcript,
                        params,
                    })
                    .await?
            }
        };

        parse_output(raw)
    }
}

/// Check a raw result against the `[sample_rate, samples]` contract
pub fn parse_output(raw: RawModelOutput) -> Result<ModelOutput, InvocationError> {
    let mut parts = match raw.0 {
        Value::Array(parts) => parts,
        other => return Err(InvocationError::Arity(describe(&other).to_owned())),
    };

    if parts.len() != 2 {
        return Err(InvocationError::Arity(format!("an array of {} elements", parts.len())));
    }

    let samples = parse_samples(parts.pop().unwrap_or_default())?;
    let sample_rate = parse_rate(&parts[0]);

    Ok(ModelOutput { sample_rate, samples })
}

fn parse_rate(value: &Value) -> i64 {
    let declared = match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_u64().map(|u| i64::try_from(u).unwrap_or(i64::MAX))),
        _ => None,
    };

    declared.unwrap_or_else(|| {
        tracing::warn!(
            declared = %value,
            fallback = FALLBACK_SAMPLE_RATE,
            "model declared a non-integer sample rate, using fallback"
        );
        FALLBACK_SAMPLE_RATE
    })
}

fn parse_samples(value: Value) -> Result<SampleArray, InvocationError> {
    if !value.is_array() {
        return Err(InvocationError::Samples(format!(
            "expected an array, got {}",
            describe(&value)
        )));
    }

    // Shape follows the first element at each depth; everything else must match it
    let mut shape = Vec::new();
    let mut cursor = &value;
    while let Value::Array(items) = cursor {
        shape.push(items.len());
        match items.first() {
            Some(first) => cursor = first,
            None => break,
        }
    }

    // The shape is not trusted until collect has walked every element
    if shape.iter().try_fold(1usize, |acc, &len| acc.checked_mul(len)).is_none() {
        return Err(InvocationError::Samples("array too large".to_owned()));
    }

    let mut data = Vec::new();
    collect(&value, &shape, &mut data)?;

    Ok(SampleArray { shape, data })
}

fn collect(value: &Value, shape: &[usize], data: &mut Vec<f64>) -> Result<(), InvocationError> {
    match (value, shape.split_first()) {
        (Value::Array(items), Some((&len, rest))) => {
            if items.len() != len {
                return Err(InvocationError::Samples(format!(
                    "ragged array: expected {len} elements, found {}",
                    items.len()
                )));
            }
            items.iter().try_for_each(|item| collect(item, rest, data))
        }
        (Value::Number(n), None) => {
            let sample = n
                .as_f64()
                .ok_or_else(|| InvocationError::Samples(format!("unrepresentable number {n}")))?;
            data.push(sample);
            Ok(())
        }
        (other, rest) => Err(InvocationError::Samples(format!(
            "expected {}, got {}",
            if rest.is_none() { "a number" } else { "an array" },
            describe(other)
        ))),
    }
}

const fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
