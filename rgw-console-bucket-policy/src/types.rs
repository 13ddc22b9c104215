//! Bucket policy model.
//!
//! The types serialize to the S3 bucket policy document schema
//! (`Version`, `Id`, `Statement[]` with `Sid`, `Effect`, `Principal`, `Action`,
//! `Resource`, `Condition`). Anything outside the subset modelled here is
//! rejected while parsing instead of being dropped on the next write.

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{PolicyError, PolicyResult};
use crate::naming::{policy_id, principal_arn, POLICY_VERSION, PRINCIPAL_PROVIDER};
use crate::wire::{condition_format, one_or_many, principal_format};

/// A bucket access policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct Policy {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Statements in stored order.
    #[serde(rename = "Statement", default, deserialize_with = "one_or_many")]
    pub statements: Vec<Statement>,
}

fn default_version() -> String {
    POLICY_VERSION.to_string()
}

impl Policy {
    /// Create an empty policy with the given id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            version: default_version(),
            id: Some(id.into()),
            statements: Vec::new(),
        }
    }

    /// The policy a bucket without a stored policy starts from.
    pub fn empty_for_bucket(bucket: &str) -> Self {
        Self::new(policy_id(bucket))
    }

    /// Parse a stored policy document.
    ///
    /// Fails with [`PolicyError::MalformedPolicy`] on invalid JSON, unknown
    /// fields, unknown effects or action names.
    pub fn from_json(text: &str) -> PolicyResult<Self> {
        serde_json::from_str(text).map_err(|e| {
            PolicyError::MalformedPolicy(format!("Failed to parse policy document JSON: {e}"))
        })
    }

    pub fn to_json(&self) -> PolicyResult<String> {
        serde_json::to_string(self)
            .map_err(|e| PolicyError::MalformedPolicy(format!("Failed to serialize policy: {e}")))
    }

    pub fn find_statement(&self, sid: &str) -> Option<&Statement> {
        self.statements
            .iter()
            .find(|statement| statement.sid.as_deref() == Some(sid))
    }

    pub fn contains_statement(&self, sid: &str) -> bool {
        self.find_statement(sid).is_some()
    }

    /// Produce the next snapshot of this policy with `statement` appended.
    #[must_use]
    pub fn with_statement(mut self, statement: Statement) -> Self {
        self.statements.push(statement);
        self
    }
}

/// A single allow/deny rule of a policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct Statement {
    /// Statement id; the deduplication key within a policy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
    pub effect: Effect,
    /// Grouped by provider, ids in insertion order within a provider.
    #[serde(
        rename = "Principal",
        default,
        skip_serializing_if = "Vec::is_empty",
        with = "principal_format"
    )]
    pub principals: Vec<Principal>,
    #[serde(rename = "Action", deserialize_with = "one_or_many")]
    pub actions: Vec<S3Action>,
    #[serde(
        rename = "Resource",
        default,
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "one_or_many"
    )]
    pub resources: Vec<String>,
    /// Sorted by type then key; a type and key pair appears at most once.
    #[serde(
        rename = "Condition",
        default,
        skip_serializing_if = "Vec::is_empty",
        with = "condition_format"
    )]
    pub conditions: Vec<Condition>,
}

impl Statement {
    pub fn new(effect: Effect) -> Self {
        Self {
            sid: None,
            effect,
            principals: Vec::new(),
            actions: Vec::new(),
            resources: Vec::new(),
            conditions: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_sid(mut self, sid: impl Into<String>) -> Self {
        self.sid = Some(sid.into());
        self
    }

    #[must_use]
    pub fn with_principals(mut self, principals: impl IntoIterator<Item = Principal>) -> Self {
        self.principals = sort_principals(principals.into_iter().collect());
        self
    }

    #[must_use]
    pub fn with_actions(mut self, actions: impl IntoIterator<Item = S3Action>) -> Self {
        self.actions = actions.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_resources(mut self, resources: impl IntoIterator<Item = String>) -> Self {
        self.resources = resources.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_conditions(mut self, conditions: impl IntoIterator<Item = Condition>) -> Self {
        self.conditions = sort_conditions(conditions.into_iter().collect());
        self
    }
}

/// Order in which a policy document groups principals. The sort is stable.
pub(crate) fn sort_principals(mut principals: Vec<Principal>) -> Vec<Principal> {
    principals.sort_by(|a, b| a.provider.cmp(&b.provider));
    principals
}

pub(crate) fn sort_conditions(mut conditions: Vec<Condition>) -> Vec<Condition> {
    conditions.sort_by(|a, b| {
        (&a.condition_type, &a.condition_key).cmp(&(&b.condition_type, &b.condition_key))
    });
    conditions
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Effect {
    Allow,
    Deny,
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allow => f.write_str("Allow"),
            Self::Deny => f.write_str("Deny"),
        }
    }
}

/// One identity a statement applies to, e.g. `AWS` / `arn:aws:iam:::user/alice`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Principal {
    pub provider: String,
    pub id: String,
}

impl Principal {
    pub const WILDCARD: &'static str = "*";

    pub fn new(provider: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            id: id.into(),
        }
    }

    /// The principal for an RGW user id.
    pub fn user(user_id: &str) -> Self {
        Self::new(PRINCIPAL_PROVIDER, principal_arn(user_id))
    }

    /// The anonymous/everyone principal (`"Principal": "*"`).
    pub fn everyone() -> Self {
        Self::new(Self::WILDCARD, Self::WILDCARD)
    }

    pub fn is_everyone(&self) -> bool {
        self.provider == Self::WILDCARD && self.id == Self::WILDCARD
    }
}

/// A constraint that must hold for a statement to apply.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Condition {
    /// Condition operator, e.g. `IpAddress`.
    pub condition_type: String,
    /// Context key, e.g. `aws:SourceIp`.
    pub condition_key: String,
    pub values: Vec<String>,
}

impl Condition {
    pub fn new(
        condition_type: impl Into<String>,
        condition_key: impl Into<String>,
        values: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            condition_type: condition_type.into(),
            condition_key: condition_key.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Restrict access to a comma separated list of IPs or CIDR ranges.
    ///
    /// Fragments are trimmed and empty fragments dropped, so `"10.0.0.1, ,10.0.0.2"`
    /// yields two values. An input without any address yields a condition with no
    /// values; [`build_access_statement`](crate::build_access_statement) refuses it.
    pub fn source_ip(allowed_ips: &str) -> Self {
        Self::new(
            "IpAddress",
            "aws:SourceIp",
            allowed_ips
                .split(',')
                .map(str::trim)
                .filter(|ip| !ip.is_empty()),
        )
    }

    /// Reject uploads that do not use the `BucketOwnerEnforced` object ownership.
    pub fn bucket_owner_enforced() -> Self {
        Self::new(
            "StringNotEquals",
            "s3:x-amz-object-ownership",
            ["BucketOwnerEnforced"],
        )
    }
}

/// Closed vocabulary of the S3 permissions this console grants or denies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum S3Action {
    All,
    ListBuckets,
    ListObjects,
    ListObjectVersions,
    GetObject,
    GetObjectVersion,
    CreateBucket,
    DeleteBucket,
    PutObject,
    DeleteObject,
    DeleteObjectVersion,
    PutObjectAcl,
    GetObjectAcl,
    PutBucketAcl,
    GetBucketAcl,
    GetBucketPolicy,
    PutBucketPolicy,
    DeleteBucketPolicy,
}

impl S3Action {
    pub const ALL: [Self; 18] = [
        Self::All,
        Self::ListBuckets,
        Self::ListObjects,
        Self::ListObjectVersions,
        Self::GetObject,
        Self::GetObjectVersion,
        Self::CreateBucket,
        Self::DeleteBucket,
        Self::PutObject,
        Self::DeleteObject,
        Self::DeleteObjectVersion,
        Self::PutObjectAcl,
        Self::GetObjectAcl,
        Self::PutBucketAcl,
        Self::GetBucketAcl,
        Self::GetBucketPolicy,
        Self::PutBucketPolicy,
        Self::DeleteBucketPolicy,
    ];

    /// Wire name of the action as it appears in policy documents.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "s3:*",
            Self::ListBuckets => "s3:ListAllMyBuckets",
            Self::ListObjects => "s3:ListBucket",
            Self::ListObjectVersions => "s3:ListBucketVersions",
            Self::GetObject => "s3:GetObject",
            Self::GetObjectVersion => "s3:GetObjectVersion",
            Self::CreateBucket => "s3:CreateBucket",
            Self::DeleteBucket => "s3:DeleteBucket",
            Self::PutObject => "s3:PutObject",
            Self::DeleteObject => "s3:DeleteObject",
            Self::DeleteObjectVersion => "s3:DeleteObjectVersion",
            Self::PutObjectAcl => "s3:PutObjectAcl",
            Self::GetObjectAcl => "s3:GetObjectAcl",
            Self::PutBucketAcl => "s3:PutBucketAcl",
            Self::GetBucketAcl => "s3:GetBucketAcl",
            Self::GetBucketPolicy => "s3:GetBucketPolicy",
            Self::PutBucketPolicy => "s3:PutBucketPolicy",
            Self::DeleteBucketPolicy => "s3:DeleteBucketPolicy",
        }
    }
}

impl fmt::Display for S3Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for S3Action {
    type Err = PolicyError;

    // Action names are case-insensitive in policy documents.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|action| action.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| PolicyError::MalformedPolicy(format!("Unknown action name `{s}`")))
    }
}

impl Serialize for S3Action {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for S3Action {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(de::Error::custom)
    }
}

/// Kind of grant a user receives on a bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementType {
    Read,
    Write,
}

impl StatementType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
        }
    }

    /// Actions granted by `grant_read` / `grant_write`.
    pub fn default_actions(self) -> Vec<S3Action> {
        match self {
            Self::Read => vec![
                S3Action::ListBuckets,
                S3Action::ListObjects,
                S3Action::ListObjectVersions,
                S3Action::GetObject,
                S3Action::GetObjectVersion,
            ],
            Self::Write => vec![
                S3Action::CreateBucket,
                S3Action::DeleteBucket,
                S3Action::PutObject,
                S3Action::DeleteObject,
                S3Action::DeleteObjectVersion,
            ],
        }
    }
}

impl fmt::Display for StatementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatementType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "read" => Ok(Self::Read),
            "write" => Ok(Self::Write),
            other => Err(format!("Unknown statement type `{other}`, expected `read` or `write`")),
        }
    }
}
