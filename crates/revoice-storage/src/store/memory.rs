use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use async_trait::async_trait;

use super::{ObjectStore, PutObject};
use crate::error::StoreError;

const DEFAULT_BASE_URL: &str = "https://storage.invalid";

/// Object stored by [`MemoryStore`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub body: Vec<u8>,
    pub content_type: String,
    pub public_read: bool,
}

#[derive(Default)]
struct State {
    buckets: HashMap<String, HashMap<String, StoredObject>>,
    bucket_creations: usize,
}

/// In-process object store
///
/// Behaves like a single-region S3 endpoint: creating an existing bucket
/// fails with [`StoreError::AlreadyExists`] and uploads to a missing bucket
/// fail with a service error.
#[derive(Clone)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
    base_url: String,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl MemoryStore {
    /// Create an empty store whose public URLs start with `base_url`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            state: Arc::default(),
            base_url: base_url.into().trim_end_matches('/').to_owned(),
        }
    }

    /// Pre-create a bucket without counting it as a creation
    #[must_use]
    pub fn with_bucket(self, bucket: &str) -> Self {
        self.lock().buckets.entry(bucket.to_owned()).or_default();
        self
    }

    /// Number of successful `create_bucket` calls
    pub fn bucket_creations(&self) -> usize {
        self.lock().bucket_creations
    }

    pub fn has_bucket(&self, bucket: &str) -> bool {
        self.lock().buckets.contains_key(bucket)
    }

    /// Total number of objects across all buckets
    pub fn object_count(&self) -> usize {
        self.lock().buckets.values().map(HashMap::len).sum()
    }

    pub fn object(&self, bucket: &str, key: &str) -> Option<StoredObject> {
        self.lock().buckets.get(bucket).and_then(|objects| objects.get(key)).cloned()
    }

    /// Keys stored in a bucket, sorted
    pub fn keys(&self, bucket: &str) -> Vec<String> {
        let mut keys: Vec<String> = self
            .lock()
            .buckets
            .get(bucket)
            .map(|objects| objects.keys().cloned().collect())
            .unwrap_or_default();
        keys.sort();
        keys
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // A panic while holding the lock leaves the maps consistent
        self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn bucket_exists(&self, bucket: &str) -> Result<bool, StoreError> {
        Ok(self.has_bucket(bucket))
    }

    async fn create_bucket(&self, bucket: &str) -> Result<(), StoreError> {
        let mut state = self.lock();

        if state.buckets.contains_key(bucket) {
            return Err(StoreError::AlreadyExists);
        }

        state.buckets.insert(bucket.to_owned(), HashMap::new());
        state.bucket_creations += 1;

        Ok(())
    }

    async fn put_object(&self, object: PutObject<'_>) -> Result<(), StoreError> {
        let mut state = self.lock();

        let objects = state
            .buckets
            .get_mut(object.bucket)
            .ok_or_else(|| StoreError::Service(format!("NoSuchBucket: {}", object.bucket)))?;

        objects.insert(
            object.key.to_owned(),
            StoredObject {
                body: object.body,
                content_type: object.content_type.to_owned(),
                public_read: object.public_read,
            },
        );

        Ok(())
    }

    fn public_url(&self, bucket: &str, key: &str) -> String {
        format!("{}/{bucket}/{key}", self.base_url)
    }
}
