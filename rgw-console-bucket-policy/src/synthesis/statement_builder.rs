//! Builders for the statements this console writes into bucket policies.

use crate::error::{PolicyError, PolicyResult};
use crate::naming::{bucket_resources, statement_id, ACL_DISABLED_SID};
use crate::types::{Condition, Effect, Principal, S3Action, Statement, StatementType};

/// Actions a user loses once ACL self-service is disabled on a bucket.
pub const ACL_MANAGEMENT_ACTIONS: [S3Action; 7] = [
    S3Action::PutObjectAcl,
    S3Action::GetObjectAcl,
    S3Action::PutBucketAcl,
    S3Action::GetBucketAcl,
    S3Action::GetBucketPolicy,
    S3Action::DeleteBucketPolicy,
    S3Action::PutBucketPolicy,
];

/// Build an Allow statement granting `actions` on `bucket` to `user_id`,
/// restricted to the comma separated `allowed_ips`.
///
/// Fails with [`PolicyError::MalformedPolicy`] when `allowed_ips` holds no address.
pub fn build_access_statement(
    bucket: &str,
    user_id: &str,
    allowed_ips: &str,
    actions: impl IntoIterator<Item = S3Action>,
    statement_type: StatementType,
) -> PolicyResult<Statement> {
    let source_ip = Condition::source_ip(allowed_ips);
    if source_ip.values.is_empty() {
        return Err(PolicyError::MalformedPolicy(format!(
            "Allowed IPs \"{allowed_ips}\" contain no address"
        )));
    }

    Ok(Statement::new(Effect::Allow)
        .with_sid(statement_id(user_id, statement_type))
        .with_principals([Principal::user(user_id)])
        .with_actions(actions)
        .with_resources(bucket_resources(bucket))
        .with_conditions([source_ip]))
}

/// Build the Deny statement that removes `user_id`'s ability to manage ACLs
/// and the bucket policy of `bucket`.
pub fn build_acl_deny_statement(bucket: &str, user_id: &str) -> Statement {
    Statement::new(Effect::Deny)
        .with_sid(ACL_DISABLED_SID)
        .with_principals([Principal::user(user_id)])
        .with_actions(ACL_MANAGEMENT_ACTIONS)
        .with_resources(bucket_resources(bucket))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_access_statement() {
        let statement = build_access_statement(
            "photos",
            "alice",
            "10.0.0.1,10.0.0.2",
            [S3Action::ListObjects, S3Action::GetObject],
            StatementType::Read,
        )
        .unwrap();

        assert_eq!(statement.sid.as_deref(), Some("alice%%%read"));
        assert_eq!(statement.effect, Effect::Allow);
        assert_eq!(statement.principals, vec![Principal::user("alice")]);
        assert_eq!(
            statement.actions,
            vec![S3Action::ListObjects, S3Action::GetObject]
        );
        assert_eq!(
            statement.resources,
            vec!["arn:aws:s3:::photos", "arn:aws:s3:::photos/*"]
        );
        assert_eq!(statement.conditions.len(), 1);
        assert_eq!(statement.conditions[0].values, vec!["10.0.0.1", "10.0.0.2"]);
    }

    #[test]
    fn test_build_access_statement_requires_an_address() {
        for allowed_ips in ["", " ", ",, ,"] {
            let err = build_access_statement(
                "photos",
                "alice",
                allowed_ips,
                [S3Action::GetObject],
                StatementType::Read,
            )
            .unwrap_err();
            assert!(
                matches!(err, PolicyError::MalformedPolicy(ref message) if message.contains("no address")),
                "should reject {allowed_ips:?}: {err:?}"
            );
        }
    }

    #[test]
    fn test_build_acl_deny_statement() {
        let statement = build_acl_deny_statement("photos", "bob");

        assert_eq!(statement.sid.as_deref(), Some(ACL_DISABLED_SID));
        assert_eq!(statement.effect, Effect::Deny);
        assert_eq!(statement.principals, vec![Principal::user("bob")]);
        assert_eq!(statement.actions, ACL_MANAGEMENT_ACTIONS.to_vec());
        assert!(statement.conditions.is_empty());
    }
}
