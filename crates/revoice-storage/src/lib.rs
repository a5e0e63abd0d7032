#![allow(clippy::missing_errors_doc, clippy::must_use_candidate)]

mod bucket;
mod content_type;
mod error;
mod publisher;
pub mod store;

pub use bucket::validate_bucket_name;
pub use content_type::content_type_for;
pub use error::{PublishError, StoreError};
pub use publisher::{PublishResult, PublishTarget, Publisher};
pub use store::{ObjectStore, PutObject, memory::MemoryStore, s3::S3Store};

