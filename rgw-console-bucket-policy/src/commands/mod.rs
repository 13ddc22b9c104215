//! Commands module - the policy manager operations over a policy store

mod apply;
mod inspect;
pub(crate) mod service;

pub use service::BucketPolicyService;
