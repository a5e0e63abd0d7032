use serde::{Serialize, Serializer, ser::SerializeMap};

use crate::{
    envelope::Echo,
    error::{ErrorKind, PipelineError},
};

/// The single result of one job
///
/// On the wire this is `{"status": "success", "audio_url": ..., <echoed inputs>}`
/// or `{"status": "error", "message": ...}`. The error kind stays internal.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOutcome {
    Success { audio_url: String, echo: Echo },
    Failure { kind: ErrorKind, message: String },
}

impl PipelineOutcome {
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub const fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { kind, .. } => Some(*kind),
        }
    }
}

impl From<PipelineError> for PipelineOutcome {
    fn from(err: PipelineError) -> Self {
        Self::Failure {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl Serialize for PipelineOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;

        match self {
            Self::Success { audio_url, echo } => {
                map.serialize_entry("status", "success")?;
                map.serialize_entry("audio_url", audio_url)?;

                match echo {
                    Echo::Inpaint { input_text, word_times } => {
                        map.serialize_entry("input_text", input_text)?;
                        map.serialize_entry("word_times", word_times)?;
                    }
                    Echo::Speech { transcript } => {
                        map.serialize_entry("transcript", transcript)?;
                    }
                }
            }
            Self::Failure { message, .. } => {
                map.serialize_entry("status", "error")?;
                map.serialize_entry("message", message)?;
            }
        }

        map.end()
    }
}
