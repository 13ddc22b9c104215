//! Error types for bucket policy operations

use thiserror::Error;

/// Failures surfaced by the policy manager and its storage collaborators.
///
/// A duplicate statement is not an error: insert operations report it as `Ok(false)`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PolicyError {
    #[error("Bucket not found: {0}")]
    BucketNotFound(String),
    #[error("Malformed bucket policy: {0}")]
    MalformedPolicy(String),
    #[error("Policy store unavailable: {0}")]
    StoreUnavailable(String),
}

impl PolicyError {
    pub(crate) fn bucket_not_found(bucket: &str) -> Self {
        Self::BucketNotFound(format!(
            "Unable to retrieve policy, bucket \"{bucket}\" doesn't exist"
        ))
    }
}

pub type PolicyResult<T> = Result<T, PolicyError>;
