//! Storage collaborators: where bucket policy text is read from and written to.

mod memory;
mod s3_client;

pub use memory::MemoryPolicyStore;
pub use s3_client::S3PolicyStore;

use async_trait::async_trait;

use crate::error::PolicyResult;

/// Raw policy text storage keyed by bucket name.
///
/// Implementations report transport failures as
/// [`PolicyError::StoreUnavailable`](crate::PolicyError::StoreUnavailable) and
/// perform any retries themselves.
#[async_trait]
pub trait PolicyStore: Send + Sync {
    async fn bucket_exists(&self, bucket: &str) -> PolicyResult<bool>;

    /// Stored policy text, or `None` when the bucket has no policy.
    async fn read_policy_text(&self, bucket: &str) -> PolicyResult<Option<String>>;

    /// Replace the stored policy with `text`.
    async fn write_policy_text(&self, bucket: &str, text: &str) -> PolicyResult<()>;

    async fn delete_policy_text(&self, bucket: &str) -> PolicyResult<()>;
}
