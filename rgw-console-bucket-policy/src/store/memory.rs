//! In-memory policy store for tests and dry runs.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::PolicyStore;
use crate::error::{PolicyError, PolicyResult};

/// [`PolicyStore`] keeping bucket policies in a map.
///
/// A bucket exists once it has been created with [`create_bucket`](Self::create_bucket)
/// or [`with_bucket`](Self::with_bucket); its policy text starts out absent.
#[derive(Debug, Default)]
pub struct MemoryPolicyStore {
    buckets: Mutex<HashMap<String, Option<String>>>,
    writes: AtomicUsize,
    unavailable: AtomicBool,
}

impl MemoryPolicyStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_bucket(mut self, bucket: &str) -> Self {
        self.buckets.get_mut().insert(bucket.to_string(), None);
        self
    }

    /// Seed `bucket` with raw policy text, valid or not.
    #[must_use]
    pub fn with_policy_text(mut self, bucket: &str, text: &str) -> Self {
        self.buckets
            .get_mut()
            .insert(bucket.to_string(), Some(text.to_string()));
        self
    }

    pub async fn create_bucket(&self, bucket: &str) {
        self.buckets
            .lock()
            .await
            .entry(bucket.to_string())
            .or_insert(None);
    }

    /// Number of successful policy writes since creation.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Make every subsequent call fail with `StoreUnavailable` until reset.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> PolicyResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(PolicyError::StoreUnavailable(
                "in-memory store marked unavailable".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl PolicyStore for MemoryPolicyStore {
    async fn bucket_exists(&self, bucket: &str) -> PolicyResult<bool> {
        self.check_available()?;
        Ok(self.buckets.lock().await.contains_key(bucket))
    }

    async fn read_policy_text(&self, bucket: &str) -> PolicyResult<Option<String>> {
        self.check_available()?;
        self.buckets
            .lock()
            .await
            .get(bucket)
            .cloned()
            .ok_or_else(|| PolicyError::bucket_not_found(bucket))
    }

    async fn write_policy_text(&self, bucket: &str, text: &str) -> PolicyResult<()> {
        self.check_available()?;
        let mut buckets = self.buckets.lock().await;
        let slot = buckets
            .get_mut(bucket)
            .ok_or_else(|| PolicyError::bucket_not_found(bucket))?;
        *slot = Some(text.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn delete_policy_text(&self, bucket: &str) -> PolicyResult<()> {
        self.check_available()?;
        let mut buckets = self.buckets.lock().await;
        let slot = buckets
            .get_mut(bucket)
            .ok_or_else(|| PolicyError::bucket_not_found(bucket))?;
        *slot = None;
        Ok(())
    }
}
