//! Parsing of the outer event envelope into a typed job

use serde::Deserialize;
use serde_json::Value;

use crate::{
    types::{GenerationRequest, InpaintRequest, SamplingParams, SpeechRequest, Task, WordTiming},
    validate::ValidationError,
};

/// Per-job storage and notification options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobOptions {
    pub bucket_name: Option<String>,
    pub object_key_prefix: Option<String>,
    /// Opaque caller identifier echoed to the webhook
    pub userid: Option<String>,
    pub webhook_url: Option<String>,
}

/// Input fields echoed back on success, exactly as received
#[derive(Debug, Clone, PartialEq)]
pub enum Echo {
    Inpaint { input_text: String, word_times: Value },
    Speech { transcript: String },
}

/// One unit of work
#[derive(Debug, Clone)]
pub struct Job {
    pub id: String,
    pub request: GenerationRequest,
    pub options: JobOptions,
    pub echo: Echo,
}

#[derive(Debug, Deserialize)]
struct RawInput {
    task: Option<Task>,
    audio_url: Option<String>,
    reference_audio_url: Option<String>,
    input_text: Option<String>,
    output_text: Option<String>,
    transcript: Option<String>,
    word_times: Option<Value>,
    bucket_name: Option<String>,
    object_key_prefix: Option<String>,
    userid: Option<String>,
    webhook_url: Option<String>,
    #[serde(flatten)]
    sampling: SamplingParams,
}

impl RawInput {
    /// An explicit `task` wins; otherwise speech-only fields select TTS
    fn task(&self) -> Task {
        self.task.unwrap_or(if self.reference_audio_url.is_some() || self.transcript.is_some() {
            Task::Tts
        } else {
            Task::Inpaint
        })
    }
}

impl Job {
    /// Build a job from `{"id": ..., "input": {...}}` or a bare input object
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when the envelope is malformed or a
    /// required field for the selected task is missing
    pub fn from_event(event: Value) -> Result<Self, ValidationError> {
        let (id, input) = match event {
            Value::Object(mut map) => match map.remove("input") {
                Some(input) => {
                    let id = match map.remove("id") {
                        None | Some(Value::Null) => None,
                        Some(Value::String(id)) => Some(id),
                        Some(other) => Some(other.to_string()),
                    };
                    (id, input)
                }
                None => (None, Value::Object(map)),
            },
            other => {
                return Err(ValidationError::Malformed(format!(
                    "expected a JSON object, got {}",
                    json_type(&other)
                )));
            }
        };

        let raw: RawInput = serde_json::from_value(input).map_err(|e| ValidationError::Malformed(e.to_string()))?;

        let id = id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        let (request, echo) = match raw.task() {
            Task::Inpaint => {
                let audio_url = raw.audio_url.ok_or(ValidationError::Missing("audio_url"))?;
                let input_text = raw.input_text.ok_or(ValidationError::Missing("input_text"))?;
                let output_text = raw.output_text.ok_or(ValidationError::Missing("output_text"))?;
                let word_times_raw = raw.word_times.ok_or(ValidationError::Missing("word_times"))?;
                let word_times: Vec<WordTiming> = serde_json::from_value(word_times_raw.clone())
                    .map_err(|e| ValidationError::Malformed(format!("word_times: {e}")))?;

                let echo = Echo::Inpaint {
                    input_text: input_text.clone(),
                    word_times: word_times_raw,
                };

                let request = GenerationRequest::Inpaint(InpaintRequest {
                    audio_url,
                    input_text,
                    output_text,
                    word_times,
                    sampling: raw.sampling,
                });

                (request, echo)
            }
            Task::Tts => {
                let reference_audio_url = raw
                    .reference_audio_url
                    .or(raw.audio_url)
                    .ok_or(ValidationError::Missing("reference_audio_url"))?;
                let transcript = raw
                    .transcript
                    .or(raw.output_text)
                    .ok_or(ValidationError::Missing("transcript"))?;

                let echo = Echo::Speech {
                    transcript: transcript.clone(),
                };

                let request = GenerationRequest::TextToSpeech(SpeechRequest {
                    reference_audio_url,
                    transcript,
                    sampling: raw.sampling,
                });

                (request, echo)
            }
        };

        Ok(Self {
            id,
            request,
            options: JobOptions {
                bucket_name: raw.bucket_name,
                object_key_prefix: raw.object_key_prefix,
                userid: raw.userid,
                webhook_url: raw.webhook_url,
            },
            echo,
        })
    }
}

const fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn inpaint_envelope() {
        let event = json!({
            "id": "job-1",
            "input": {
                "audio_url": "https://audio.example.com/a.wav",
                "input_text": "hello world",
                "output_text": "hello there",
                "word_times": [
                    {"word": "hello", "start": 0, "end": 0.4},
                    {"word": "world", "start": 0.4, "end": 0.9}
                ],
                "num_steps": 40,
                "bucket_name": "edits"
            }
        });

        let job = Job::from_event(event).unwrap();

        assert_eq!(job.id, "job-1");
        assert_eq!(job.options.bucket_name.as_deref(), Some("edits"));

        let GenerationRequest::Inpaint(request) = &job.request else {
            panic!("expected inpaint request");
        };
        assert_eq!(request.word_times.len(), 2);
        assert_eq!(request.sampling.num_steps, 40);
        assert!((request.sampling.init_temp - 1.0).abs() < f64::EPSILON);

        // Echo keeps the caller's exact JSON, including integer `0`
        let Echo::Inpaint { word_times, .. } = &job.echo else {
            panic!("expected inpaint echo");
        };
        assert_eq!(word_times[0]["start"], json!(0));
    }

    #[test]
    fn reference_audio_selects_tts() {
        let event = json!({
            "input": {
                "reference_audio_url": "https://audio.example.com/voice.wav",
                "transcript": "Good morning",
                "userid": "user-42",
                "webhook_url": "https://hooks.example.com/done"
            }
        });

        let job = Job::from_event(event).unwrap();

        assert!(!job.id.is_empty());
        assert_eq!(job.request.task(), Task::Tts);
        assert_eq!(job.options.userid.as_deref(), Some("user-42"));
        assert_eq!(
            job.echo,
            Echo::Speech {
                transcript: "Good morning".to_owned()
            }
        );
    }

    #[test]
    fn explicit_task_accepts_fallback_field_names() {
        let event = json!({
            "task": "tts",
            "audio_url": "https://audio.example.com/voice.wav",
            "output_text": "Good night"
        });

        let job = Job::from_event(event).unwrap();

        let GenerationRequest::TextToSpeech(request) = job.request else {
            panic!("expected speech request");
        };
        assert_eq!(request.reference_audio_url, "https://audio.example.com/voice.wav");
        assert_eq!(request.transcript, "Good night");
    }

    #[test]
    fn missing_fields_are_named() {
        let event = json!({
            "input": {
                "audio_url": "https://audio.example.com/a.wav",
                "input_text": "hello",
                "output_text": "bye"
            }
        });

        assert_eq!(
            Job::from_event(event).unwrap_err(),
            ValidationError::Missing("word_times")
        );
    }

    #[test]
    fn malformed_inputs_are_validation_errors() {
        assert!(matches!(
            Job::from_event(json!([1, 2, 3])),
            Err(ValidationError::Malformed(_))
        ));
        assert!(matches!(
            Job::from_event(json!({"input": {"num_steps": "many"}})),
            Err(ValidationError::Malformed(_))
        ));
        assert!(matches!(
            Job::from_event(json!({
                "audio_url": "https://audio.example.com/a.wav",
                "input_text": "a",
                "output_text": "b",
                "word_times": [{"word": "a"}]
            })),
            Err(ValidationError::Malformed(_))
        ));
    }
}
