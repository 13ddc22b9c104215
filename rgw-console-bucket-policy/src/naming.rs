//! Identifier and ARN construction for bucket policies and their statements.
//!
//! Statement ids double as the deduplication key, so every id produced here
//! must be deterministic for a given (principal, statement type) pair.

use crate::types::StatementType;

/// Policy language version written into freshly created policies.
pub const POLICY_VERSION: &str = "2012-10-17";

/// Principal provider used for every statement this crate generates.
pub const PRINCIPAL_PROVIDER: &str = "AWS";

/// Fixed statement id of the ACL self-service lockout statement.
pub const ACL_DISABLED_SID: &str = "ACLs disabled";

const ID_SEPARATOR: &str = "%%%";

/// Id of a freshly created policy for `bucket`.
pub fn policy_id(bucket: &str) -> String {
    format!("{bucket}{ID_SEPARATOR}policy")
}

/// Statement id for a grant of `statement_type` to `user_id`.
pub fn statement_id(user_id: &str, statement_type: StatementType) -> String {
    format!("{user_id}{ID_SEPARATOR}{}", statement_type.as_str())
}

pub fn principal_arn(user_id: &str) -> String {
    format!("arn:aws:iam:::user/{user_id}")
}

pub fn bucket_arn(bucket: &str) -> String {
    format!("arn:aws:s3:::{bucket}")
}

/// Both resources a bucket-level statement applies to: the bucket and every object in it.
pub fn bucket_resources(bucket: &str) -> Vec<String> {
    let arn = bucket_arn(bucket);
    let objects = format!("{arn}/*");
    vec![arn, objects]
}
