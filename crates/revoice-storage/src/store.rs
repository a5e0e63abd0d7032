pub mod memory;
pub mod s3;

use async_trait::async_trait;

use crate::error::StoreError;

/// A single object upload
#[derive(Debug)]
pub struct PutObject<'a> {
    pub bucket: &'a str,
    pub key: &'a str,
    pub body: Vec<u8>,
    pub content_type: &'a str,
    /// Grant anonymous read access to the object
    pub public_read: bool,
}

/// Trait for S3-compatible blob store backends
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Whether the bucket exists and is reachable with the configured credentials
    async fn bucket_exists(&self, bucket: &str) -> Result<bool, StoreError>;

    /// Create a bucket
    ///
    /// Returns [`StoreError::AlreadyExists`] when the bucket is already there,
    /// including when another creator won a race.
    async fn create_bucket(&self, bucket: &str) -> Result<(), StoreError>;

    /// Upload an object, replacing nothing: keys are always fresh
    async fn put_object(&self, object: PutObject<'_>) -> Result<(), StoreError>;

    /// Directly fetchable URL of an object
    fn public_url(&self, bucket: &str, key: &str) -> String;
}
