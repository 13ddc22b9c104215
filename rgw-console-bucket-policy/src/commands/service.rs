//! Bucket Policy Service Layer
//!
//! This module provides the policy manager: the service interface that owns all
//! bucket policy business logic. The service holds a [`PolicyStore`] and exposes
//! high-level operations (inspect, add statements, replace, remove) that can be
//! used by different adapters (CLI, tests).

use crate::store::PolicyStore;

/// Main service struct that holds the policy store and provides policy operations.
///
/// Every operation round-trips through the store: mutations load the current
/// policy, build the next snapshot, and write the whole document back. Nothing
/// is cached between calls.
///
/// The read-modify-write cycle is not atomic. Two callers mutating the same
/// bucket's policy concurrently can lose an update (last writer wins); the
/// store offers no conditional write to guard against it.
#[derive(Debug)]
pub struct BucketPolicyService<S> {
    pub(crate) store: S,
}

impl<S: PolicyStore> BucketPolicyService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // read-only operations are in inspect.rs
    // mutating operations are in apply.rs
}
