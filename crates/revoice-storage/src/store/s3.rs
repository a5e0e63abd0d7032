//! S3-compatible backend (AWS S3, DigitalOcean Spaces, MinIO)

use std::fmt::Debug;

use async_trait::async_trait;
use aws_sdk_s3::{
    Client,
    error::{DisplayErrorContext, SdkError},
    operation::{create_bucket::CreateBucketError, head_bucket::HeadBucketError},
    primitives::ByteStream,
    types::{BucketLocationConstraint, CreateBucketConfiguration, ObjectCannedAcl},
};
use revoice_config::{StorageConfig, UrlStyle};
use secrecy::ExposeSecret;
use url::Url;

use super::{ObjectStore, PutObject};
use crate::error::StoreError;

/// Region AWS treats as the implicit bucket location
const AWS_DEFAULT_REGION: &str = "us-east-1";

/// Object store backed by the AWS S3 SDK
pub struct S3Store {
    client: Client,
    endpoint: Url,
    region: String,
    url_style: UrlStyle,
    custom_endpoint: bool,
}

impl S3Store {
    /// Build an S3 client from configuration
    ///
    /// Uses the explicit credential pair when configured, otherwise the
    /// default AWS credential chain. Fails when no endpoint is configured and
    /// the region does not form a valid AWS endpoint host.
    pub async fn from_config(config: &StorageConfig) -> Result<Self, url::ParseError> {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(config.region.clone()));

        if let (Some(access_key), Some(secret_key)) = (&config.access_key_id, &config.secret_access_key) {
            let credentials = aws_credential_types::Credentials::new(
                access_key.expose_secret(),
                secret_key.expose_secret(),
                None,
                None,
                "revoice-config",
            );
            loader = loader.credentials_provider(credentials);
        }

        let sdk_config = loader.load().await;

        let mut builder =
            aws_sdk_s3::config::Builder::from(&sdk_config).force_path_style(config.url_style == UrlStyle::Path);

        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint.as_str().trim_end_matches('/'));
        }

        let endpoint = match &config.endpoint {
            Some(endpoint) => endpoint.clone(),
            None => aws_endpoint(&config.region)?,
        };

        tracing::debug!(
            endpoint = %endpoint,
            region = %config.region,
            url_style = ?config.url_style,
            "S3 store initialized"
        );

        Ok(Self {
            client: Client::from_conf(builder.build()),
            endpoint,
            region: config.region.clone(),
            url_style: config.url_style,
            custom_endpoint: config.endpoint.is_some(),
        })
    }

    fn location_constraint(&self) -> Option<CreateBucketConfiguration> {
        // S3-compatible services derive the location from the endpoint
        if self.custom_endpoint || self.region == AWS_DEFAULT_REGION {
            return None;
        }

        Some(
            CreateBucketConfiguration::builder()
                .location_constraint(BucketLocationConstraint::from(self.region.as_str()))
                .build(),
        )
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn bucket_exists(&self, bucket: &str) -> Result<bool, StoreError> {
        match self.client.head_bucket().bucket(bucket).send().await {
            Ok(_) => Ok(true),
            Err(err) if is_not_found(&err) => Ok(false),
            Err(err) => Err(classify(&err)),
        }
    }

    async fn create_bucket(&self, bucket: &str) -> Result<(), StoreError> {
        let request = self
            .client
            .create_bucket()
            .bucket(bucket)
            .set_create_bucket_configuration(self.location_constraint());

        match request.send().await {
            Ok(_) => Ok(()),
            Err(err)
                if err.as_service_error().is_some_and(|e: &CreateBucketError| {
                    e.is_bucket_already_owned_by_you() || e.is_bucket_already_exists()
                }) =>
            {
                Err(StoreError::AlreadyExists)
            }
            Err(err) => Err(classify(&err)),
        }
    }

    async fn put_object(&self, object: PutObject<'_>) -> Result<(), StoreError> {
        let mut request = self
            .client
            .put_object()
            .bucket(object.bucket)
            .key(object.key)
            .content_type(object.content_type)
            .body(ByteStream::from(object.body));

        if object.public_read {
            request = request.acl(ObjectCannedAcl::PublicRead);
        }

        request.send().await.map(|_| ()).map_err(|err| classify(&err))
    }

    fn public_url(&self, bucket: &str, key: &str) -> String {
        object_url(&self.endpoint, self.url_style, bucket, key)
    }
}

fn aws_endpoint(region: &str) -> Result<Url, url::ParseError> {
    Url::parse(&format!("https://s3.{region}.amazonaws.com"))
}

/// Public URL of an object for the given addressing style
pub(crate) fn object_url(endpoint: &Url, style: UrlStyle, bucket: &str, key: &str) -> String {
    let host = endpoint.host_str().unwrap_or_default();
    let port = endpoint.port().map(|p| format!(":{p}")).unwrap_or_default();

    match style {
        UrlStyle::VirtualHost => format!("{}://{bucket}.{host}{port}/{key}", endpoint.scheme()),
        UrlStyle::Path => format!("{}://{host}{port}/{bucket}/{key}", endpoint.scheme()),
    }
}

fn is_not_found<R>(err: &SdkError<HeadBucketError, R>) -> bool {
    err.as_service_error().is_some_and(HeadBucketError::is_not_found)
}

/// Split SDK failures into transport faults and service answers
fn classify<E, R>(err: &SdkError<E, R>) -> StoreError
where
    E: std::error::Error + 'static,
    R: Debug,
{
    let message = DisplayErrorContext(err).to_string();

    match err {
        SdkError::DispatchFailure(_) | SdkError::TimeoutError(_) => {
            tracing::warn!(error = %message, "object storage unreachable");
            StoreError::Connection(message)
        }
        _ => {
            tracing::error!(error = %message, "object storage request failed");
            StoreError::Service(message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn virtual_host_url_prefixes_bucket() {
        let endpoint = Url::parse("https://sfo3.digitaloceanspaces.com").unwrap();
        assert_eq!(
            object_url(&endpoint, UrlStyle::VirtualHost, "clips", "tts/abc.wav"),
            "https://clips.sfo3.digitaloceanspaces.com/tts/abc.wav"
        );
    }

    #[test]
    fn path_url_keeps_port() {
        let endpoint = Url::parse("http://127.0.0.1:9000/").unwrap();
        assert_eq!(
            object_url(&endpoint, UrlStyle::Path, "clips", "abc.wav"),
            "http://127.0.0.1:9000/clips/abc.wav"
        );
    }

    #[test]
    fn default_endpoint_is_regional_aws() {
        assert_eq!(
            aws_endpoint("eu-west-1").unwrap().as_str(),
            "https://s3.eu-west-1.amazonaws.com/"
        );
    }

    #[test]
    fn malformed_region_is_an_error() {
        assert!(aws_endpoint("eu west/1").is_err());
    }
}
