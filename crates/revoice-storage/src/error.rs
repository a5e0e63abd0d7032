use thiserror::Error;

/// Failures reported by an object store backend
#[derive(Debug, Error)]
pub enum StoreError {
    /// Bucket creation raced with another creator, or the bucket was already there
    #[error("bucket already exists")]
    AlreadyExists,

    /// The request never got a response (DNS, connect, timeout)
    #[error("connection error: {0}")]
    Connection(String),

    /// The service answered with an error
    #[error("storage service error: {0}")]
    Service(String),
}

/// Publishing errors
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("refusing to publish an empty payload")]
    EmptyPayload,

    #[error("invalid bucket name '{name}': {reason}")]
    InvalidBucket { name: String, reason: &'static str },

    #[error("failed to create bucket '{bucket}': {message}")]
    CreateBucket { bucket: String, message: String },

    #[error("failed to upload s3://{bucket}/{key}: {message}")]
    Upload {
        bucket: String,
        key: String,
        message: String,
    },

    /// Transient network fault; the same request may succeed on retry
    #[error("storage connection error: {0}")]
    Connection(String),
}

impl PublishError {
    /// Whether retrying the same publish could succeed
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Connection(_))
    }
}
