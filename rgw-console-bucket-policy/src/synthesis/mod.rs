//! Statement synthesis (deterministic statement generation)

pub mod statement_builder;

pub use statement_builder::{build_access_statement, build_acl_deny_statement};
