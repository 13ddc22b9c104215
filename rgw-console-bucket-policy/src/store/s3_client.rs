//! S3 client wrapper for bucket policy operations against RGW

use async_trait::async_trait;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_s3::Client;
use log::debug;

use super::PolicyStore;
use crate::error::{PolicyError, PolicyResult};

const NO_SUCH_BUCKET: &str = "NoSuchBucket";
const NO_SUCH_BUCKET_POLICY: &str = "NoSuchBucketPolicy";

/// [`PolicyStore`] backed by the bucket policy API of an S3-compatible endpoint.
#[derive(Debug, Clone)]
pub struct S3PolicyStore {
    client: Client,
}

impl S3PolicyStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Connect to `endpoint` with a static access/secret key pair.
    ///
    /// RGW serves buckets path-style, so virtual-host addressing is disabled.
    pub fn with_static_credentials(
        endpoint: &str,
        region: &str,
        access_key: &str,
        secret_key: &str,
    ) -> Self {
        let credentials = Credentials::new(access_key, secret_key, None, None, "rgw-console");

        let config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .endpoint_url(endpoint)
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        Self::new(Client::from_conf(config))
    }

    /// Connect using the standard AWS credential provider chain, optionally
    /// overriding the endpoint.
    pub async fn from_env(endpoint: Option<&str>) -> Self {
        let shared_config = aws_config::defaults(BehaviorVersion::latest()).load().await;

        let mut builder = aws_sdk_s3::config::Builder::from(&shared_config);
        if let Some(endpoint) = endpoint {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        Self::new(Client::from_conf(builder.build()))
    }
}

fn store_unavailable<E>(operation: &str, bucket: &str, err: E) -> PolicyError
where
    E: std::error::Error,
{
    PolicyError::StoreUnavailable(format!(
        "Failed to {operation} for bucket '{bucket}': {}",
        DisplayErrorContext(err)
    ))
}

#[async_trait]
impl PolicyStore for S3PolicyStore {
    async fn bucket_exists(&self, bucket: &str) -> PolicyResult<bool> {
        debug!("HeadBucket {bucket}");
        match self.client.head_bucket().bucket(bucket).send().await {
            Ok(_) => Ok(true),
            Err(err) if err.as_service_error().is_some_and(|e| e.is_not_found()) => Ok(false),
            Err(err) => Err(store_unavailable("check existence", bucket, err)),
        }
    }

    async fn read_policy_text(&self, bucket: &str) -> PolicyResult<Option<String>> {
        debug!("GetBucketPolicy {bucket}");
        match self.client.get_bucket_policy().bucket(bucket).send().await {
            Ok(output) => Ok(output
                .policy()
                .filter(|text| !text.trim().is_empty())
                .map(str::to_string)),
            Err(err) => match err.code() {
                Some(NO_SUCH_BUCKET_POLICY) => Ok(None),
                Some(NO_SUCH_BUCKET) => Err(PolicyError::bucket_not_found(bucket)),
                _ => Err(store_unavailable("get bucket policy", bucket, err)),
            },
        }
    }

    async fn write_policy_text(&self, bucket: &str, text: &str) -> PolicyResult<()> {
        debug!("PutBucketPolicy {bucket} ({} bytes)", text.len());
        match self
            .client
            .put_bucket_policy()
            .bucket(bucket)
            .policy(text)
            .send()
            .await
        {
            Ok(_) => Ok(()),
            Err(err) if err.code() == Some(NO_SUCH_BUCKET) => {
                Err(PolicyError::bucket_not_found(bucket))
            }
            Err(err) => Err(store_unavailable("put bucket policy", bucket, err)),
        }
    }

    async fn delete_policy_text(&self, bucket: &str) -> PolicyResult<()> {
        debug!("DeleteBucketPolicy {bucket}");
        match self.client.delete_bucket_policy().bucket(bucket).send().await {
            Ok(_) => Ok(()),
            Err(err) if err.code() == Some(NO_SUCH_BUCKET) => {
                Err(PolicyError::bucket_not_found(bucket))
            }
            Err(err) => Err(store_unavailable("delete bucket policy", bucket, err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_unavailable_message() {
        let err = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused");
        match store_unavailable("get bucket policy", "photos", err) {
            PolicyError::StoreUnavailable(message) => {
                assert!(message.contains("get bucket policy"));
                assert!(message.contains("photos"));
                assert!(message.contains("connection refused"));
            }
            other => panic!("Expected StoreUnavailable, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_store_unavailable() {
        let store = S3PolicyStore::with_static_credentials(
            "http://127.0.0.1:1",
            "us-east-1",
            "access",
            "secret",
        );
        let err = store.read_policy_text("photos").await.unwrap_err();
        assert!(
            matches!(err, PolicyError::StoreUnavailable(_)),
            "Expected StoreUnavailable, got {err:?}"
        );
    }
}
