//! Read-only policy operations for the bucket policy service

use log::debug;

use crate::error::{PolicyError, PolicyResult};
use crate::store::PolicyStore;
use crate::types::{Policy, Statement};

impl<S: PolicyStore> super::service::BucketPolicyService<S> {
    /// Load the current policy of `bucket`.
    ///
    /// A bucket without a stored policy yields an empty policy with id
    /// `<bucket>%%%policy`. Stored text that does not parse fails with
    /// [`PolicyError::MalformedPolicy`].
    pub async fn get_policy(&self, bucket: &str) -> PolicyResult<Policy> {
        match self.policy_text(bucket).await? {
            Some(text) => Policy::from_json(&text),
            None => {
                debug!("Bucket {bucket} has no policy, starting from an empty one");
                Ok(Policy::empty_for_bucket(bucket))
            }
        }
    }

    /// Statements of the current policy of `bucket`, in stored order.
    pub async fn list_statements(&self, bucket: &str) -> PolicyResult<Vec<Statement>> {
        Ok(self.get_policy(bucket).await?.statements)
    }

    /// Raw stored policy text of `bucket`, `None` when it has no policy.
    pub async fn policy_text(&self, bucket: &str) -> PolicyResult<Option<String>> {
        self.ensure_bucket(bucket).await?;
        self.store.read_policy_text(bucket).await
    }

    pub(crate) async fn ensure_bucket(&self, bucket: &str) -> PolicyResult<()> {
        if self.store.bucket_exists(bucket).await? {
            Ok(())
        } else {
            Err(PolicyError::bucket_not_found(bucket))
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::commands::BucketPolicyService;
    use crate::error::PolicyError;
    use crate::store::MemoryPolicyStore;

    #[tokio::test]
    async fn test_get_policy_without_stored_policy() {
        let service = BucketPolicyService::new(MemoryPolicyStore::new().with_bucket("photos"));

        let policy = service.get_policy("photos").await.unwrap();
        assert_eq!(policy.id.as_deref(), Some("photos%%%policy"));
        assert!(policy.statements.is_empty());
        assert_eq!(service.store().write_count(), 0);
    }

    #[tokio::test]
    async fn test_get_policy_missing_bucket() {
        let service = BucketPolicyService::new(MemoryPolicyStore::new());

        match service.get_policy("ghost").await {
            Err(PolicyError::BucketNotFound(message)) => assert!(message.contains("ghost")),
            other => panic!("Expected BucketNotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_get_policy_malformed() {
        let service = BucketPolicyService::new(
            MemoryPolicyStore::new().with_policy_text("photos", r#"{"Statement": [{"Effect": "#),
        );

        assert!(matches!(
            service.get_policy("photos").await,
            Err(PolicyError::MalformedPolicy(_))
        ));
    }

    #[tokio::test]
    async fn test_list_statements_preserves_order() {
        let text = r#"{"Version":"2012-10-17","Id":"photos%%%policy","Statement":[
            {"Sid":"b","Effect":"Allow","Action":"s3:GetObject","Resource":"arn:aws:s3:::photos/*"},
            {"Sid":"a","Effect":"Deny","Action":"s3:PutObject","Resource":"arn:aws:s3:::photos/*"}
        ]}"#;
        let service =
            BucketPolicyService::new(MemoryPolicyStore::new().with_policy_text("photos", text));

        let sids: Vec<_> = service
            .list_statements("photos")
            .await
            .unwrap()
            .into_iter()
            .map(|statement| statement.sid)
            .collect();
        assert_eq!(sids, vec![Some("b".to_string()), Some("a".to_string())]);
    }

    #[tokio::test]
    async fn test_store_unavailable_propagates() {
        let store = MemoryPolicyStore::new().with_bucket("photos");
        store.set_unavailable(true);
        let service = BucketPolicyService::new(store);

        assert!(matches!(
            service.policy_text("photos").await,
            Err(PolicyError::StoreUnavailable(_))
        ));
    }
}
