//! This crate provides the core business logic of the RGW debug console:
//! - Bucket policy model and its S3 policy JSON codec
//! - Statement synthesis for per-user read/write grants and ACL lockout
//! - The bucket policy service: idempotent statement insertion keyed by statement id
//! - Policy stores over the S3 bucket policy API and in memory
//!

mod commands;
mod error;
pub mod naming;
pub mod store;
mod synthesis;
mod types;
mod wire;

// Re-exports for a small, focused public API
pub use commands::BucketPolicyService;
pub use error::{PolicyError, PolicyResult};
pub use store::{MemoryPolicyStore, PolicyStore, S3PolicyStore};
pub use synthesis::statement_builder::ACL_MANAGEMENT_ACTIONS;
pub use synthesis::{build_access_statement, build_acl_deny_statement};
pub use types::{Condition, Effect, Policy, Principal, S3Action, Statement, StatementType};
