use std::sync::Arc;

use uuid::Uuid;

use crate::{
    bucket::validate_bucket_name,
    content_type::content_type_for,
    error::{PublishError, StoreError},
    store::{ObjectStore, PutObject},
};

/// Where and how to publish a payload
#[derive(Debug, Clone, Copy)]
pub struct PublishTarget<'a> {
    /// Bucket override; the publisher default when `None` or empty
    pub bucket: Option<&'a str>,
    /// Key prefix, e.g. `tts/`
    pub prefix: &'a str,
    /// Key extension including the dot, e.g. `.wav`
    pub extension: &'a str,
}

/// Location of a published object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishResult {
    pub bucket: String,
    pub key: String,
    pub url: String,
}

/// Uploads payloads under fresh keys and hands back their public URL
pub struct Publisher {
    store: Arc<dyn ObjectStore>,
    default_bucket: String,
}

impl Publisher {
    /// Create a publisher over a store
    ///
    /// Fails when the default bucket name is not a valid bucket name.
    pub fn new(store: Arc<dyn ObjectStore>, default_bucket: impl Into<String>) -> Result<Self, PublishError> {
        let default_bucket = default_bucket.into();
        validate_bucket_name(&default_bucket)?;

        Ok(Self { store, default_bucket })
    }

    pub fn default_bucket(&self) -> &str {
        &self.default_bucket
    }

    /// Publish a payload with public-read access
    ///
    /// The key is `prefix + uuid + extension`, so concurrent publishes never
    /// collide. The bucket is created first when missing.
    pub async fn publish(&self, data: Vec<u8>, target: PublishTarget<'_>) -> Result<PublishResult, PublishError> {
        if data.is_empty() {
            return Err(PublishError::EmptyPayload);
        }

        let bucket = target
            .bucket
            .filter(|b| !b.is_empty())
            .unwrap_or(self.default_bucket.as_str());
        validate_bucket_name(bucket)?;

        self.ensure_bucket(bucket).await?;

        let key = format!("{}{}{}", target.prefix, Uuid::new_v4(), target.extension);
        let content_type = content_type_for(target.extension);
        let size = data.len();

        self.store
            .put_object(PutObject {
                bucket,
                key: &key,
                body: data,
                content_type: &content_type,
                public_read: true,
            })
            .await
            .map_err(|err| match err {
                StoreError::Connection(message) => PublishError::Connection(message),
                other => PublishError::Upload {
                    bucket: bucket.to_owned(),
                    key: key.clone(),
                    message: other.to_string(),
                },
            })?;

        let url = self.store.public_url(bucket, &key);

        tracing::info!(bucket, key = %key, bytes = size, content_type = %content_type, "published object");

        Ok(PublishResult {
            bucket: bucket.to_owned(),
            key,
            url,
        })
    }

    /// Create the bucket unless it exists; losing a creation race is fine
    async fn ensure_bucket(&self, bucket: &str) -> Result<(), PublishError> {
        let create_failed = |message: String| PublishError::CreateBucket {
            bucket: bucket.to_owned(),
            message,
        };

        match self.store.bucket_exists(bucket).await {
            Ok(true) => return Ok(()),
            Ok(false) => {}
            Err(StoreError::Connection(message)) => return Err(PublishError::Connection(message)),
            Err(err) => return Err(create_failed(err.to_string())),
        }

        match self.store.create_bucket(bucket).await {
            Ok(()) => {
                tracing::info!(bucket, "created bucket");
                Ok(())
            }
            Err(StoreError::AlreadyExists) => {
                tracing::debug!(bucket, "bucket created concurrently");
                Ok(())
            }
            Err(StoreError::Connection(message)) => Err(PublishError::Connection(message)),
            Err(err @ StoreError::Service(_)) => Err(create_failed(err.to_string())),
        }
    }
}
