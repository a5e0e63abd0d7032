use revoice_storage::PublishError;
use thiserror::Error;

use crate::{
    encode::EncodingError, fetch::FetchError, invoke::InvocationError, normalize::NormalizationError,
    validate::ValidationError,
};

pub type Result<T> = std::result::Result<T, PipelineError>;

/// Failure category reported with every failed job
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// Bad caller input; never retried
    ValidationError,
    /// Source audio could not be downloaded
    FetchError,
    /// The model failed or broke its result contract
    InvocationError,
    /// The model result has an unusable shape or content
    NormalizationError,
    EncodingError,
    PublishError,
    /// Transient network fault while publishing
    ConnectionError,
    InternalError,
}

/// Any failure that ends a job
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("model invocation failed: {0}")]
    Invocation(#[from] InvocationError),

    #[error("model output rejected: {0}")]
    Normalization(#[from] NormalizationError),

    #[error("audio encoding failed: {0}")]
    Encoding(#[from] EncodingError),

    #[error("publish failed: {0}")]
    Publish(#[from] PublishError),

    /// Faults outside the taxonomy above, rendered with their full context chain
    #[error("internal error: {0:#}")]
    Internal(#[from] anyhow::Error),
}

impl PipelineError {
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::ValidationError,
            Self::Fetch(FetchError::Materialize { .. }) | Self::Internal(_) => ErrorKind::InternalError,
            Self::Fetch(_) => ErrorKind::FetchError,
            Self::Invocation(_) => ErrorKind::InvocationError,
            Self::Normalization(_) => ErrorKind::NormalizationError,
            Self::Encoding(_) => ErrorKind::EncodingError,
            Self::Publish(err) if err.is_transient() => ErrorKind::ConnectionError,
            Self::Publish(_) => ErrorKind::PublishError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_render_in_snake_case() {
        assert_eq!(ErrorKind::ValidationError.to_string(), "validation_error");
        assert_eq!(ErrorKind::ConnectionError.to_string(), "connection_error");
    }

    #[test]
    fn transient_publish_failures_are_connection_errors() {
        let err = PipelineError::from(PublishError::Connection("reset by peer".to_owned()));
        assert_eq!(err.kind(), ErrorKind::ConnectionError);

        let err = PipelineError::from(PublishError::EmptyPayload);
        assert_eq!(err.kind(), ErrorKind::PublishError);
    }

    #[test]
    fn internal_errors_keep_their_context() {
        let err = PipelineError::from(anyhow::anyhow!("disk full").context("writing model output"));
        assert_eq!(err.kind(), ErrorKind::InternalError);
        assert_eq!(err.to_string(), "internal error: writing model output: disk full");
    }
}
