//! Mutating policy operations for the bucket policy service

use log::{debug, info, warn};

use crate::error::PolicyResult;
use crate::store::PolicyStore;
use crate::synthesis::{build_access_statement, build_acl_deny_statement};
use crate::types::{Policy, S3Action, Statement, StatementType};

impl<S: PolicyStore> super::service::BucketPolicyService<S> {
    /// Grant `actions` on `bucket` to `user_id` from `allowed_ips` (comma separated).
    ///
    /// The statement id is `<user_id>%%%<statement_type>`. If the policy already
    /// holds a statement with that id, nothing is written and `Ok(false)` is
    /// returned, even when the existing statement grants different actions or
    /// IPs: identity is the statement id, not its content. An `allowed_ips`
    /// without any address is rejected before the store is touched.
    pub async fn add_statement(
        &self,
        bucket: &str,
        user_id: &str,
        allowed_ips: &str,
        actions: &[S3Action],
        statement_type: StatementType,
    ) -> PolicyResult<bool> {
        let statement = build_access_statement(
            bucket,
            user_id,
            allowed_ips,
            actions.iter().copied(),
            statement_type,
        )?;
        self.insert_statement(bucket, statement).await
    }

    /// Deny `user_id` the ACL and bucket policy management actions on `bucket`.
    ///
    /// Uses the fixed statement id `ACLs disabled`, so at most one such statement
    /// exists per bucket; later calls return `Ok(false)` whichever user they name.
    pub async fn add_acl_deny_statement(&self, bucket: &str, user_id: &str) -> PolicyResult<bool> {
        let statement = build_acl_deny_statement(bucket, user_id);
        self.insert_statement(bucket, statement).await
    }

    /// Grant the default read actions (list buckets, list objects and versions,
    /// get objects and versions).
    pub async fn grant_read(
        &self,
        bucket: &str,
        user_id: &str,
        allowed_ips: &str,
    ) -> PolicyResult<bool> {
        self.grant(bucket, user_id, allowed_ips, StatementType::Read)
            .await
    }

    /// Grant the default write actions (create/delete bucket, put/delete objects
    /// and object versions).
    pub async fn grant_write(
        &self,
        bucket: &str,
        user_id: &str,
        allowed_ips: &str,
    ) -> PolicyResult<bool> {
        self.grant(bucket, user_id, allowed_ips, StatementType::Write)
            .await
    }

    /// Replace the policy of `bucket` with the document in `policy_json`.
    ///
    /// The text is parsed first; a malformed document is rejected without
    /// touching the stored policy. The canonical serialization is written.
    pub async fn put_policy(&self, bucket: &str, policy_json: &str) -> PolicyResult<Policy> {
        self.ensure_bucket(bucket).await?;
        let policy = Policy::from_json(policy_json)?;
        self.persist(bucket, &policy).await?;
        info!(
            "Replaced policy of bucket {bucket} ({} statements)",
            policy.statements.len()
        );
        Ok(policy)
    }

    /// Delete the stored policy of `bucket` entirely.
    pub async fn remove_policy(&self, bucket: &str) -> PolicyResult<()> {
        self.ensure_bucket(bucket).await?;
        self.store.delete_policy_text(bucket).await?;
        info!("Removed policy of bucket {bucket}");
        Ok(())
    }

    async fn grant(
        &self,
        bucket: &str,
        user_id: &str,
        allowed_ips: &str,
        statement_type: StatementType,
    ) -> PolicyResult<bool> {
        let actions = statement_type.default_actions();
        self.add_statement(bucket, user_id, allowed_ips, &actions, statement_type)
            .await
    }

    /// Append `statement` unless a statement with the same id exists, then
    /// write the whole policy back.
    async fn insert_statement(&self, bucket: &str, statement: Statement) -> PolicyResult<bool> {
        let sid = statement.sid.clone().unwrap_or_default();

        let policy = self.get_policy(bucket).await?;
        if policy.contains_statement(&sid) {
            warn!("Statement {sid} already present in policy of bucket {bucket}, skipping");
            return Ok(false);
        }

        let policy = policy.with_statement(statement);
        self.persist(bucket, &policy).await?;
        info!(
            "Added statement {sid} to policy of bucket {bucket} ({} statements)",
            policy.statements.len()
        );
        Ok(true)
    }

    async fn persist(&self, bucket: &str, policy: &Policy) -> PolicyResult<()> {
        let text = policy.to_json()?;
        debug!("Writing policy of bucket {bucket}: {text}");
        self.store.write_policy_text(bucket, &text).await
    }
}
