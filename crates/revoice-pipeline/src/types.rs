use serde::{Deserialize, Serialize};

/// Alignment of one transcript word in the source audio, in seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordTiming {
    pub word: String,
    pub start: f64,
    pub end: f64,
}

/// Sampling parameters shared by both tasks
///
/// Integers are kept signed so out-of-range input reaches the validator
/// instead of failing deserialization.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SamplingParams {
    pub num_steps: i64,
    pub init_temp: f64,
    pub init_diversity: f64,
    pub guidance: f64,
    pub rescale: f64,
    pub topk: i64,
    pub use_manual_ratio: bool,
    pub audio_token_syllable_ratio: Option<f64>,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            num_steps: 30,
            init_temp: 1.0,
            init_diversity: 1.0,
            guidance: 0.5,
            rescale: 0.7,
            topk: 25,
            use_manual_ratio: false,
            audio_token_syllable_ratio: None,
        }
    }
}

impl SamplingParams {
    /// The ratio to forward to the model: only in manual mode
    pub fn effective_ratio(&self) -> Option<f64> {
        self.audio_token_syllable_ratio.filter(|_| self.use_manual_ratio)
    }
}

/// Regenerate part of a recording so it says `output_text`
#[derive(Debug, Clone, PartialEq)]
pub struct InpaintRequest {
    pub audio_url: String,
    pub input_text: String,
    pub output_text: String,
    pub word_times: Vec<WordTiming>,
    pub sampling: SamplingParams,
}

/// Speak `transcript` in the voice of the reference recording
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechRequest {
    pub reference_audio_url: String,
    pub transcript: String,
    pub sampling: SamplingParams,
}

/// Which generation task a job runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Task {
    Inpaint,
    Tts,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GenerationRequest {
    Inpaint(InpaintRequest),
    TextToSpeech(SpeechRequest),
}

impl GenerationRequest {
    pub const fn task(&self) -> Task {
        match self {
            Self::Inpaint(_) => Task::Inpaint,
            Self::TextToSpeech(_) => Task::Tts,
        }
    }

    pub const fn sampling(&self) -> &SamplingParams {
        match self {
            Self::Inpaint(request) => &request.sampling,
            Self::TextToSpeech(request) => &request.sampling,
        }
    }

    /// The single remote audio this request depends on
    pub fn source_url(&self) -> &str {
        match self {
            Self::Inpaint(request) => &request.audio_url,
            Self::TextToSpeech(request) => &request.reference_audio_url,
        }
    }
}
